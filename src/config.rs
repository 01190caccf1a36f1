use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

pub const API_KEY_ENV: &str = "MURID_BANDEL_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible chat completions endpoint.
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,

    /// Total tries per request, first one included.
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,

    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:1234/v1/chat/completions".into(),
            model: "local-model".into(),
            temperature: 0.8,
            timeout_secs: 60,
            max_attempts: 2,
            retry_backoff_ms: 750,
            api_key: None,
        }
    }
}

/// Product tuning for turn resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Option risk is divided by this on success.
    pub success_risk_divisor: f64,

    /// Reputation lost on a failed roll.
    pub failure_penalty: f64,

    pub win_threshold: f64,

    /// Turn count at which the climax phase starts.
    pub climax_threshold: u32,

    /// Suspicion above which the scenario opens with Pak Yono catching you.
    pub high_suspicion_threshold: f64,

    /// Suspicion above which the UI warns the player.
    pub danger_warning_threshold: f64,

    /// Fallback for options the generator did not flag as aggressive.
    pub aggression_keywords: Vec<String>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            success_risk_divisor: 3.0,
            failure_penalty: 15.0,
            win_threshold: 300.0,
            climax_threshold: 5,
            high_suspicion_threshold: 70.0,
            danger_warning_threshold: 80.0,
            aggression_keywords: vec!["lawan".into(), "berantem".into(), "hajar".into()],
        }
    }
}

impl RulesConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.success_risk_divisor > 0.0) {
            bail!("success_risk_divisor must be positive");
        }
        if !(self.failure_penalty >= 0.0) {
            bail!("failure_penalty must not be negative");
        }
        if !(self.win_threshold > 0.0) {
            bail!("win_threshold must be positive");
        }
        for (name, value) in [
            ("high_suspicion_threshold", self.high_suspicion_threshold),
            ("danger_warning_threshold", self.danger_warning_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                bail!("{} must be within 0..=100", name);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub scale: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub rules: RulesConfig,
    pub ui: UiConfig,
}

pub fn config_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("murid_bandel");
    path.push("config.json");
    path
}

impl AppConfig {
    /// Loads the user config, falling back to defaults on any problem.
    pub fn load() -> Self {
        let path = config_path();
        let mut config = if path.exists() {
            match Self::load_from(&path) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("ignoring config at {}: {:#}", path.display(), e);
                    Self::default()
                }
            }
        } else {
            log::info!("no config at {}, writing defaults", path.display());
            let config = Self::default();
            if let Err(e) = config.save() {
                log::warn!("could not write default config: {:#}", e);
            }
            config
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.llm.api_key = Some(key);
            }
        }
        config
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let mut config: AppConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;

        if let Err(e) = config.rules.validate() {
            log::warn!("invalid rules ({:#}), using default rules", e);
            config.rules = RulesConfig::default();
        }
        Ok(config)
    }

    /// Writes to the user config file, creating its directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.rules.success_risk_divisor = 4.0;
        config.rules.win_threshold = 400.0;
        config.llm.model = "qwen".into();
        config.save_to(&path).unwrap();

        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "rules": { "failure_penalty": 20 } }"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.rules.failure_penalty, 20.0);
        assert_eq!(config.rules.win_threshold, 300.0);
        assert_eq!(config.llm, LlmConfig::default());
    }

    #[test]
    fn invalid_rules_fall_back() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "rules": { "success_risk_divisor": 0 }, "ui": { "scale": 1.5 } }"#)
            .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.rules, RulesConfig::default());
        assert_eq!(config.ui.scale, 1.5);
    }

    #[test]
    fn garbage_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
        assert!(AppConfig::load_from(&dir.path().join("missing.json")).is_err());
    }

    // dirs::config_dir follows XDG_CONFIG_HOME only on Linux.
    #[cfg(target_os = "linux")]
    #[test]
    fn load_writes_defaults_and_save_persists() {
        let dir = TempDir::new().expect("tempdir");
        std::env::set_var("XDG_CONFIG_HOME", dir.path());
        std::env::remove_var(API_KEY_ENV);

        let path = config_path();
        assert!(path.starts_with(dir.path()));
        assert!(path.ends_with("murid_bandel/config.json"));

        assert_eq!(AppConfig::load(), AppConfig::default());
        assert!(path.exists());

        let mut config = AppConfig::default();
        config.ui.scale = 1.25;
        config.rules.failure_penalty = 20.0;
        config.save().unwrap();
        assert_eq!(AppConfig::load(), config);
    }

    #[test]
    fn validate_thresholds() {
        assert!(RulesConfig::default().validate().is_ok());
        let rules = RulesConfig {
            danger_warning_threshold: 120.0,
            ..RulesConfig::default()
        };
        assert!(rules.validate().is_err());
        let rules = RulesConfig {
            failure_penalty: -1.0,
            ..RulesConfig::default()
        };
        assert!(rules.validate().is_err());
    }
}
