//! Serial line traits
//!
//! Implemented by chip UART drivers on firmware and by `std::io` stream
//! adapters on hosts.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Transmit half of a serial line
pub trait UartTx {
    /// Write or flush failure
    type Error;

    /// Write all of `data`, returning once it has been accepted by the line
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Wait until buffered bytes have left the transmitter
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Receive half of a serial line
pub trait UartRx {
    /// Read failure (overrun, framing, I/O)
    type Error;

    /// Read whatever bytes are available into `buf`
    ///
    /// Returns `Ok(0)` when nothing is pending; never waits for a full buffer.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Read a single byte if one is available
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        let mut buf = [0u8; 1];
        match self.read(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }
}

/// Both halves of a serial line in one value
pub trait Uart: UartTx + UartRx {}

impl<T: UartTx + UartRx> Uart for T {}

/// Line settings for one serial port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UartConfig {
    /// Line rate in bits per second
    pub baudrate: u32,
    /// Character width
    pub data_bits: DataBits,
    /// Parity bit, if any
    pub parity: Parity,
    /// Stop bits after each character
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

/// Character width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Stop bits per character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StopBits {
    One,
    Two,
}

impl UartConfig {
    /// Bits on the line per transmitted byte, including start and stop bits
    pub fn bits_per_byte(&self) -> u32 {
        let data = match self.data_bits {
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        };
        let parity = match self.parity {
            Parity::None => 0,
            Parity::Even | Parity::Odd => 1,
        };
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        1 + data + parity + stop
    }

    /// Time on the wire for `bytes` bytes, rounded up to whole milliseconds
    ///
    /// Useful for sizing the inactivity timeout of a link.
    pub fn transfer_time_ms(&self, bytes: usize) -> u32 {
        let bits = self.bits_per_byte() as u64 * bytes as u64;
        let baud = self.baudrate.max(1) as u64;
        (bits * 1000).div_ceil(baud) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_8n1() {
        let config = UartConfig::default();
        assert_eq!(config.baudrate, 115200);
        assert_eq!(config.bits_per_byte(), 10);
    }

    #[test]
    fn test_transfer_time() {
        let config = UartConfig {
            baudrate: 9600,
            ..UartConfig::default()
        };
        // 30 bytes * 10 bits = 300 bits at 9600 baud = 31.25 ms
        assert_eq!(config.transfer_time_ms(30), 32);
        assert_eq!(UartConfig::default().transfer_time_ms(0), 0);
    }

    #[test]
    fn test_parity_adds_bit() {
        let config = UartConfig {
            parity: Parity::Even,
            stop_bits: StopBits::Two,
            ..UartConfig::default()
        };
        assert_eq!(config.bits_per_byte(), 12);
    }
}
