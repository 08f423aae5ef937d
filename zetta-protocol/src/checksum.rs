//! Checksum port
//!
//! The integrity function is injected by the host and treated as opaque. The
//! same function must be used on both ends of a link. Only the low byte of the
//! result is transmitted and compared.

/// Integrity function over `kind ++ length ++ payload`
pub trait Checksum {
    /// Compute the checksum of `data`
    fn checksum(&self, data: &[u8]) -> u32;
}

impl<C: Checksum + ?Sized> Checksum for &C {
    fn checksum(&self, data: &[u8]) -> u32 {
        (**self).checksum(data)
    }
}

/// XOR of all input bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Xor;

impl Checksum for Xor {
    fn checksum(&self, data: &[u8]) -> u32 {
        data.iter().fold(0u8, |acc, &byte| acc ^ byte) as u32
    }
}

/// Bitwise CRC-8, MSB first, no reflection, no final XOR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Crc8 {
    /// Generator polynomial (implicit x^8 term)
    pub poly: u8,
    /// Initial register value
    pub init: u8,
}

impl Crc8 {
    /// CRC-8/SMBUS: poly 0x07, init 0x00
    pub const SMBUS: Crc8 = Crc8::new(0x07, 0x00);

    /// Poly 0x07 with the register preset to 0xFF, as used by the desktop tooling
    pub const ZETTA: Crc8 = Crc8::new(0x07, 0xFF);

    /// Create a CRC-8 with the given polynomial and initial value
    pub const fn new(poly: u8, init: u8) -> Self {
        Self { poly, init }
    }

    /// Compute the CRC as a byte
    pub fn compute(&self, data: &[u8]) -> u8 {
        let mut crc = self.init;
        for &byte in data {
            crc ^= byte;
            for _ in 0..8 {
                crc = if crc & 0x80 != 0 {
                    (crc << 1) ^ self.poly
                } else {
                    crc << 1
                };
            }
        }
        crc
    }
}

impl Default for Crc8 {
    fn default() -> Self {
        Self::ZETTA
    }
}

impl Checksum for Crc8 {
    fn checksum(&self, data: &[u8]) -> u32 {
        self.compute(data) as u32
    }
}

/// Adapter for a plain function or closure
///
/// Hardware CRC units are usually exposed as a free function; wrap it here.
#[derive(Clone, Copy)]
pub struct FnChecksum<F>(F);

impl<F> FnChecksum<F>
where
    F: Fn(&[u8]) -> u32,
{
    /// Wrap a checksum function
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Checksum for FnChecksum<F>
where
    F: Fn(&[u8]) -> u32,
{
    fn checksum(&self, data: &[u8]) -> u32 {
        (self.0)(data)
    }
}

impl<F> core::fmt::Debug for FnChecksum<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("FnChecksum")
    }
}
