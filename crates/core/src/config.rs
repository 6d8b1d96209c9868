// Controller configuration

use crate::error::{MediaError, Result};
use serde::Deserialize;

/// Default skip distance for forward/backward skips
pub const THIRTY_SECONDS_IN_MILLISECONDS: i64 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Distance of a skip in milliseconds
    pub skip_interval_ms: i64,

    /// Route the external FORWARD command to a backward skip and REWIND to a
    /// forward skip, matching the shipped Android binding.
    pub swap_skip_commands: bool,

    /// Clamp forward skips at the duration when the duration is known
    pub clamp_skip_to_duration: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            skip_interval_ms: THIRTY_SECONDS_IN_MILLISECONDS,
            swap_skip_commands: true,
            clamp_skip_to_duration: true,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.skip_interval_ms <= 0 {
            return Err(MediaError::Config(format!(
                "skip_interval_ms must be > 0, got {}",
                self.skip_interval_ms
            )));
        }
        Ok(())
    }
}
