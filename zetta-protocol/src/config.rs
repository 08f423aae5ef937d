//! Link configuration

use crate::frame::MAX_PAYLOAD_SIZE;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tunables for one protocol handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkConfig {
    /// Largest payload accepted or sent (clamped to [`MAX_PAYLOAD_SIZE`])
    pub max_payload: u8,
    /// Idle time after which a partial frame is abandoned; `None` or 0 disables it
    pub inactivity_timeout_ms: Option<u32>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            max_payload: MAX_PAYLOAD_SIZE as u8,
            inactivity_timeout_ms: None,
        }
    }
}

impl LinkConfig {
    /// Set the payload bound
    pub fn with_max_payload(mut self, max_payload: u8) -> Self {
        self.max_payload = max_payload;
        self
    }

    /// Enable the per-byte inactivity deadline
    pub fn with_inactivity_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.inactivity_timeout_ms = Some(timeout_ms);
        self
    }

    /// Inactivity timeout in effect; a zero timeout counts as disabled
    pub fn effective_inactivity_timeout_ms(&self) -> Option<u32> {
        self.inactivity_timeout_ms.filter(|&ms| ms > 0)
    }

    /// Payload bound after clamping
    pub fn effective_max_payload(&self) -> u8 {
        self.max_payload.min(MAX_PAYLOAD_SIZE as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LinkConfig::default();
        assert_eq!(config.effective_max_payload(), 25);
        assert_eq!(config.inactivity_timeout_ms, None);
    }

    #[test]
    fn test_max_payload_clamped() {
        let config = LinkConfig::default().with_max_payload(255);
        assert_eq!(config.effective_max_payload(), MAX_PAYLOAD_SIZE as u8);
        assert_eq!(LinkConfig::default().with_max_payload(8).effective_max_payload(), 8);
    }

    #[test]
    fn test_zero_timeout_disabled() {
        let config = LinkConfig::default().with_inactivity_timeout_ms(0);
        assert_eq!(config.effective_inactivity_timeout_ms(), None);
        let config = config.with_inactivity_timeout_ms(15);
        assert_eq!(config.effective_inactivity_timeout_ms(), Some(15));
    }
}
