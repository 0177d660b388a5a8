use serde::{Deserialize, Serialize};

use crate::constants::env::STARTING_CAPITAL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvMode {
    /// Random sessions, fresh portfolio on every reset
    #[default]
    Train,
    /// Sessions in stored order, portfolio carried across sessions
    Playback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    pub starting_capital: f64,
    pub mode: EnvMode,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            starting_capital: STARTING_CAPITAL,
            mode: EnvMode::Train,
        }
    }
}

impl EnvConfig {
    pub fn new(starting_capital: f64, mode: EnvMode) -> Self {
        Self {
            starting_capital: starting_capital.max(0.),
            mode,
        }
    }

    pub fn playback(starting_capital: f64) -> Self {
        Self::new(starting_capital, EnvMode::Playback)
    }
}
