use crate::config::RulesConfig;
use crate::model::character::Character;
use crate::model::mission::Mission;

/// Builds the prompts sent to the LLM.
/// Only formats text: no parsing, no networking, no game rules.
pub struct PromptBuilder<'a> {
    rules: &'a RulesConfig,
}

const MISSION_SCHEMA: &str = r#"{
  "id": string,
  "title": string,
  "description": string,
  "difficulty": "Easy" | "Medium" | "Hard" | "Extreme",
  "reward": number (reputation gained, 5-60),
  "risk": number (0-100),
  "type": "PRANK" | "STEALTH" | "SABOTAGE"
}"#;

const SCENARIO_SCHEMA: &str = r#"{
  "scenario": string (what Pak Yono says or does),
  "options": [
    {
      "text": string (what the player does),
      "risk": number (0-100, suspicion raised if it goes wrong),
      "successChance": number (0-100),
      "outcome": string (what happens next),
      "aggressive": boolean (true if the player picks a fight)
    }
  ]
}"#;

impl<'a> PromptBuilder<'a> {
    pub fn new(rules: &'a RulesConfig) -> Self {
        Self { rules }
    }

    pub fn system_prompt(&self) -> String {
        let mut prompt = String::new();
        prompt.push_str(
            "You are the game master of \"Murid Bandel 2\", a comedic prank game set in an \
Indonesian high school.\n\
The antagonist is Pak Yono, the strictest and most feared teacher in the school.\n\n\
Rules:\n\
- Keep everything playful and school-appropriate: pranks, sneaking, sabotage of lessons.\n\
- Write the story text in casual Indonesian.\n\
- Respond with ONE JSON object only. No markdown, no commentary.\n\
- Use exactly the keys of the schema you are given.\n",
        );
        prompt
    }

    pub fn mission_prompt(&self, character: &Character, player_name: &str, turn_count: u32) -> String {
        let mut prompt = String::new();

        if turn_count >= self.rules.climax_threshold {
            prompt.push_str(&format!(
                "Create the FINAL mission for {} ({}), who wants to cause the biggest chaos the \
school has ever seen. The main target is trapping Pak Yono himself. The title must be dramatic.\n",
                character.name, player_name
            ));
        } else {
            prompt.push_str(&format!(
                "Create a school prank mission for {} ({}). {}\n\
This is mission number {}. It should be fun and involve other teachers before the player \
eventually faces Pak Yono.\n",
                character.name,
                player_name,
                character.description,
                turn_count + 1
            ));
        }

        push_schema(&mut prompt, MISSION_SCHEMA);
        prompt
    }

    pub fn scenario_prompt(
        &self,
        character: &Character,
        player_name: &str,
        mission: &Mission,
        suspicion: f64,
        turn_count: u32,
    ) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "{} (real name: {}) is carrying out the mission \"{}\": {}\n",
            character.name, player_name, mission.title, mission.description
        ));

        if suspicion > self.rules.high_suspicion_threshold {
            prompt.push_str("Suddenly Pak Yono catches them red-handed, face red with anger, shouting!\n");
        } else {
            prompt.push_str("Pak Yono is patrolling the hallway with his wooden ruler.\n");
        }

        prompt.push_str(
            "Write a scenario in which Pak Yono questions or accuses the player in a fierce tone.\n\
Give exactly 3 answer options.\n",
        );

        if turn_count >= self.rules.climax_threshold {
            prompt.push_str(
                "This is the final mission: one option MUST start a fight with Pak Yono that \
risks getting the player expelled. Mark it with \"aggressive\": true.\n",
            );
        } else {
            prompt.push_str("Set \"aggressive\": true on any option where the player picks a fight.\n");
        }

        push_schema(&mut prompt, SCENARIO_SCHEMA);
        prompt
    }
}

fn push_schema(prompt: &mut String, schema: &str) {
    prompt.push_str("\nRespond with JSON matching this schema:\n");
    prompt.push_str(schema);
    prompt.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mission::{Category, Difficulty};

    fn mission() -> Mission {
        Mission {
            id: "m".into(),
            title: "Frog in the Drawer".into(),
            description: "Hide a frog in the science lab.".into(),
            difficulty: Difficulty::Easy,
            reward: 10.0,
            risk: 20.0,
            category: Category::Prank,
        }
    }

    #[test]
    fn mission_prompt_switches_at_climax() {
        let rules = RulesConfig::default();
        let builder = PromptBuilder::new(&rules);
        let character = Character::find("ojan").unwrap();

        let early = builder.mission_prompt(character, "Dodi", 2);
        assert!(early.contains("mission number 3"));
        assert!(!early.contains("FINAL"));

        let late = builder.mission_prompt(character, "Dodi", 5);
        assert!(late.contains("FINAL"));
        assert!(late.contains("\"type\""));
    }

    #[test]
    fn scenario_prompt_reacts_to_suspicion() {
        let rules = RulesConfig::default();
        let builder = PromptBuilder::new(&rules);
        let character = Character::find("imam").unwrap();

        let calm = builder.scenario_prompt(character, "Dodi", &mission(), 70.0, 0);
        assert!(calm.contains("patrolling"));
        assert!(calm.contains("Frog in the Drawer"));

        let caught = builder.scenario_prompt(character, "Dodi", &mission(), 71.0, 0);
        assert!(caught.contains("red-handed"));
    }

    #[test]
    fn climax_scenario_demands_a_fight_option() {
        let rules = RulesConfig::default();
        let builder = PromptBuilder::new(&rules);
        let character = Character::find("budi").unwrap();

        let prompt = builder.scenario_prompt(character, "Dodi", &mission(), 10.0, 6);
        assert!(prompt.contains("MUST start a fight"));
        assert!(prompt.contains("successChance"));
    }
}
