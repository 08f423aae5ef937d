//! Host configuration
//!
//! Loaded from TOML. Every section is optional:
//!
//! ```toml
//! strict_kinds = true
//! auto_timeout = true
//!
//! [link]
//! max_payload = 25
//!
//! [uart]
//! baudrate = 115200
//! parity = "none"
//!
//! [checksum]
//! type = "crc8"
//! poly = 0x07
//! init = 0xFF
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use zetta_hal::UartConfig;
use zetta_protocol::{Checksum, Crc8, LinkConfig, Xor, MAX_FRAME_SIZE};

use crate::error::Result;

/// Integrity function shared by both ends of the link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChecksumKind {
    /// XOR of all bytes
    Xor,
    /// MSB-first CRC-8
    Crc8 { poly: u8, init: u8 },
}

impl Default for ChecksumKind {
    fn default() -> Self {
        let Crc8 { poly, init } = Crc8::ZETTA;
        ChecksumKind::Crc8 { poly, init }
    }
}

impl Checksum for ChecksumKind {
    fn checksum(&self, data: &[u8]) -> u32 {
        match *self {
            ChecksumKind::Xor => Xor.checksum(data),
            ChecksumKind::Crc8 { poly, init } => Crc8::new(poly, init).checksum(data),
        }
    }
}

/// Host binding configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Protocol handle settings
    pub link: LinkConfig,
    /// Serial line settings
    pub uart: UartConfig,
    /// Checksum used on this link
    pub checksum: ChecksumKind,
    /// Drop frames whose kind is not a known message kind
    pub strict_kinds: bool,
    /// Derive the inactivity timeout from the line speed when none is set
    pub auto_timeout: bool,
    /// Bytes read from the UART per poll
    pub poll_chunk: usize,
    /// Received packets kept before the oldest is dropped
    pub queue_capacity: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            link: LinkConfig::default(),
            uart: UartConfig::default(),
            checksum: ChecksumKind::default(),
            strict_kinds: false,
            auto_timeout: false,
            poll_chunk: 64,
            queue_capacity: 64,
        }
    }
}

impl HostConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Link settings with the automatic timeout applied
    ///
    /// The derived timeout is four maximum-size frame times on the wire,
    /// and never less than 10 ms.
    pub fn effective_link(&self) -> LinkConfig {
        match self.link.effective_inactivity_timeout_ms() {
            None if self.auto_timeout => {
                let frame_ms = self.uart.transfer_time_ms(MAX_FRAME_SIZE);
                self.link
                    .with_inactivity_timeout_ms(frame_ms.saturating_mul(4).max(10))
            }
            _ => self.link,
        }
    }
}
