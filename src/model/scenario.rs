use serde::{Deserialize, Serialize};

/// One answer the player can give when confronted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOption {
    pub text: String,

    /// Suspicion added on failure (divided down on success). In [0, 100].
    pub risk: f64,

    /// Chance of success in percent, [0, 100].
    pub success_chance: f64,

    /// Narration shown after the roll.
    pub outcome: String,

    /// Set by the generator when the option starts a fight.
    #[serde(default)]
    pub aggressive: bool,
}

impl ScenarioOption {
    /// True when the structured flag is set or the text contains one of the
    /// fallback keywords (case-insensitive).
    pub fn is_aggressive(&self, keywords: &[String]) -> bool {
        if self.aggressive {
            return true;
        }
        let text = self.text.to_lowercase();
        keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .any(|k| text.contains(&k.to_lowercase()))
    }
}

/// The teacher's confrontation for the active mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub narrative: String,
    pub options: Vec<ScenarioOption>,
}

impl Scenario {
    pub const MIN_OPTIONS: usize = 2;
    pub const MAX_OPTIONS: usize = 4;

    pub fn option(&self, index: usize) -> Option<&ScenarioOption> {
        self.options.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(text: &str, aggressive: bool) -> ScenarioOption {
        ScenarioOption {
            text: text.into(),
            risk: 10.0,
            success_chance: 50.0,
            outcome: String::new(),
            aggressive,
        }
    }

    fn keywords() -> Vec<String> {
        vec!["lawan".into(), "berantem".into(), "hajar".into()]
    }

    #[test]
    fn keyword_match_ignores_case() {
        assert!(option("Aku LAWAN Pak Yono", false).is_aggressive(&keywords()));
        assert!(option("ayo berantem!", false).is_aggressive(&keywords()));
        assert!(!option("Minta maaf dengan sopan", false).is_aggressive(&keywords()));
    }

    #[test]
    fn structured_flag_wins_without_keywords() {
        assert!(option("Push him into the pond", true).is_aggressive(&[]));
        assert!(!option("Push him into the pond", false).is_aggressive(&[]));
    }

    #[test]
    fn blank_keywords_never_match() {
        let keywords = vec!["".to_string(), "  ".to_string()];
        assert!(!option("anything", false).is_aggressive(&keywords));
    }
}
