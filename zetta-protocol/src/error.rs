//! Protocol fault taxonomy

use core::fmt;

/// Faults detected by the receive or transmit path
///
/// Every fault is recoverable: the link resynchronizes on the next start
/// sentinel, and retry policy belongs to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Byte other than the start sentinel while waiting for a frame
    InvalidStart,
    /// Kind byte rejected by the configured kind filter
    UnrecognizedKind,
    /// Length exceeds the configured maximum payload
    PayloadTooLarge,
    /// Received checksum does not match the recomputed one
    ChecksumMismatch,
    /// Byte other than the stop sentinel where the frame must end
    InvalidStop,
    /// Internal bookkeeping reached an impossible state
    MalformedState,
    /// Transmit requested while a previous transmit is in flight
    TransmitBusy,
    /// Receive requested while a previous receive is outstanding
    ReceiveBusy,
    /// Transport could not put the frame on the line
    TransmitFailed,
    /// Partial frame stalled longer than the inactivity timeout
    Timeout,
}

impl Fault {
    /// Returns true for faults counted as framing errors in [`LinkStats`](crate::LinkStats)
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            Fault::InvalidStart
                | Fault::UnrecognizedKind
                | Fault::PayloadTooLarge
                | Fault::InvalidStop
                | Fault::MalformedState
        )
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Fault::InvalidStart => "invalid start byte",
            Fault::UnrecognizedKind => "unrecognized message kind",
            Fault::PayloadTooLarge => "payload too large",
            Fault::ChecksumMismatch => "checksum mismatch",
            Fault::InvalidStop => "invalid stop byte",
            Fault::MalformedState => "malformed receiver state",
            Fault::TransmitBusy => "transmitter busy",
            Fault::ReceiveBusy => "receiver busy",
            Fault::TransmitFailed => "transmit failed",
            Fault::Timeout => "receive timeout",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for Fault {}
