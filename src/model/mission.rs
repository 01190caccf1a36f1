use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Extreme,
}

impl FromStr for Difficulty {
    type Err = String;

    /// Accepts both the English labels and the Indonesian ones the model
    /// tends to answer with.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "mudah" => Ok(Difficulty::Easy),
            "medium" | "sedang" => Ok(Difficulty::Medium),
            "hard" | "sulit" => Ok(Difficulty::Hard),
            "extreme" | "ekstrem" => Ok(Difficulty::Extreme),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Extreme => "Extreme",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Prank,
    Stealth,
    Sabotage,
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prank" => Ok(Category::Prank),
            "stealth" => Ok(Category::Stealth),
            "sabotage" => Ok(Category::Sabotage),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Prank => "PRANK",
            Category::Stealth => "STEALTH",
            Category::Sabotage => "SABOTAGE",
        };
        f.write_str(label)
    }
}

/// An objective proposed by the content generator. Lives on the game state
/// until its scenario is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,

    /// Reputation granted on success. Never negative.
    pub reward: f64,

    /// Advertised risk in [0, 100]. Informational only; the chosen option's
    /// risk is what moves suspicion.
    pub risk: f64,

    pub category: Category,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_accepts_both_languages() {
        assert_eq!("Mudah".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("SEDANG".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(" Ekstrem ".parse::<Difficulty>().unwrap(), Difficulty::Extreme);
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn category_is_case_insensitive() {
        assert_eq!("PRANK".parse::<Category>().unwrap(), Category::Prank);
        assert_eq!("Stealth".parse::<Category>().unwrap(), Category::Stealth);
        assert!("heist".parse::<Category>().is_err());
        assert_eq!(Category::Sabotage.to_string(), "SABOTAGE");
    }
}
