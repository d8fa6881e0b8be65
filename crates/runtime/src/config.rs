//! Session configuration.
//!
//! Hosts either build a [`SessionConfig`] in code or load it from a TOML
//! file. Missing keys fall back to their defaults.

use std::path::Path;

use battle_core::BattleConfig;
use serde::{Deserialize, Serialize};

use crate::api::{Result, RuntimeError};

/// Configuration shared by the session and every combatant in it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Whether `flee` actions are possible in this battle.
    pub allow_flee: bool,
    /// Resolve rounds without presentation cues.
    pub instantaneous: bool,
    /// Capacity of the session event broadcast channel.
    pub event_buffer_size: usize,
    /// `start_round` gives up after this many rounds (0 disables the cap).
    pub max_rounds: u32,
    pub battle: BattleConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            allow_flee: true,
            instantaneous: false,
            event_buffer_size: 100,
            max_rounds: 0,
            battle: BattleConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| RuntimeError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        self.battle.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = SessionConfig::from_toml_str(
            r#"
            allow_flee = false
            max_rounds = 30

            [battle]
            damage_constant = 20.0
            "#,
        )
        .unwrap();

        assert!(!config.allow_flee);
        assert_eq!(config.max_rounds, 30);
        assert_eq!(config.battle.damage_constant, 20.0);
        assert_eq!(config.battle.inventory_capacity, BattleConfig::DEFAULT_INVENTORY_CAPACITY);
        assert_eq!(config.event_buffer_size, 100);
    }

    #[test]
    fn invalid_tunables_are_rejected() {
        let err = SessionConfig::from_toml_str("[battle]\ndefault_flee_chance = 1.5\n").unwrap_err();
        assert!(matches!(err, RuntimeError::Core(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = SessionConfig::load("/nonexistent/battle.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/battle.toml"));
    }
}
