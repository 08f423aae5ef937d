//! Link statistics

use crate::error::Fault;

/// Counters kept by each protocol handle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Frames the transport accepted
    pub frames_sent: u32,
    /// Frames the transport failed to send
    pub transmit_errors: u32,
    /// Frames that passed validation
    pub frames_received: u32,
    /// Bytes fed into the receiver
    pub bytes_received: u32,
    /// Frames dropped on checksum mismatch
    pub checksum_errors: u32,
    /// Start, kind, length, stop and state faults
    pub framing_errors: u32,
    /// Partial frames abandoned by the inactivity timer
    pub timeouts: u32,
}

impl LinkStats {
    pub(crate) fn record_fault(&mut self, fault: Fault) {
        match fault {
            Fault::ChecksumMismatch => {
                self.checksum_errors = self.checksum_errors.wrapping_add(1)
            }
            Fault::Timeout => self.timeouts = self.timeouts.wrapping_add(1),
            f if f.is_framing() => self.framing_errors = self.framing_errors.wrapping_add(1),
            _ => {}
        }
    }
}
