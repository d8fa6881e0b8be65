//! Environment-driven configuration for the demo battle.

use std::env;
use std::path::PathBuf;

/// What to fight and how.
#[derive(Clone, Debug)]
pub struct CliConfig {
    /// Seed for the random action providers. Random when unset.
    pub seed: Option<u64>,
    /// Optional TOML file with session tunables.
    pub session_config: Option<PathBuf>,
    pub allies: usize,
    pub foes: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            seed: None,
            session_config: None,
            allies: 2,
            foes: 3,
        }
    }
}

impl CliConfig {
    /// Reads `BATTLE_SEED`, `BATTLE_CONFIG`, `BATTLE_ALLIES`, and
    /// `BATTLE_FOES`. Unparsable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(seed) = read_env::<u64>("BATTLE_SEED") {
            config.seed = Some(seed);
        }
        if let Ok(path) = env::var("BATTLE_CONFIG") {
            config.session_config = Some(PathBuf::from(path));
        }
        if let Some(allies) = read_env::<usize>("BATTLE_ALLIES") {
            config.allies = allies.clamp(1, 4);
        }
        if let Some(foes) = read_env::<usize>("BATTLE_FOES") {
            config.foes = foes.clamp(1, 6);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
