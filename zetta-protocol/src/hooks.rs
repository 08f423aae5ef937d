//! Capability hooks injected into the protocol handle
//!
//! The handle never touches hardware. It pushes finished frames through a
//! [`Transport`], reports faults to a [`FaultHook`], and asks a [`KindFilter`]
//! whether a received kind byte is acceptable.

use core::fmt;

use crate::error::Fault;
use crate::messages::MessageKind;
use crate::parser::RxState;

/// The transport refused or failed to send a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransmitError;

impl fmt::Display for TransmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("transport failed to send frame")
    }
}

impl core::error::Error for TransmitError {}

/// Physical transport for one link
///
/// Both calls only *start* an operation. Completion is reported back through
/// [`LinkFlags`](crate::LinkFlags) by whatever context finishes the transfer.
pub trait Transport {
    /// Hand a complete frame to the transport
    ///
    /// The slice is only valid for the duration of the call. Return an error
    /// if the transfer could not be started (or, for a blocking transport,
    /// did not complete); the handle then releases the transmit side and
    /// reports [`Fault::TransmitFailed`].
    fn send(&mut self, frame: &[u8]) -> Result<(), TransmitError>;

    /// Ask the transport to deliver the next `len` incoming bytes
    fn begin_receive(&mut self, len: usize);

    /// One cooperative idle step while waiting for a busy transmit to finish
    fn wait(&mut self) {
        core::hint::spin_loop();
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, frame: &[u8]) -> Result<(), TransmitError> {
        (**self).send(frame)
    }

    fn begin_receive(&mut self, len: usize) {
        (**self).begin_receive(len)
    }

    fn wait(&mut self) {
        (**self).wait()
    }
}

/// Error manager hook
///
/// Called exactly once per fault, synchronously, from the call that detected
/// it. By the time it runs the handle has already recorded the fault as
/// `last_error` and, for receive-path faults, returned the parser to
/// `WaitStart`; the hook adds host-specific reactions on top.
///
/// The hook receives the receive state in which the fault was detected
/// rather than the handle. The hook is owned by the handle and runs inside a
/// `&mut` call on it, so handing it the handle would alias that borrow. The
/// reset itself is done by the handle, so the hook cannot skip it. Anything
/// else a hook needs from the handle (`last_error`, `stats`) can be read by
/// the caller after the call returns.
pub trait FaultHook {
    /// React to `fault`; `state` is the receive state in which it was detected
    fn on_fault(&mut self, fault: Fault, state: RxState);
}

/// Fault hook that does nothing beyond the handle's built-in reset policy
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFaultHook;

impl FaultHook for NoopFaultHook {
    fn on_fault(&mut self, _fault: Fault, _state: RxState) {}
}

/// Predicate deciding whether a received kind byte is acceptable
pub trait KindFilter {
    /// Returns true if frames of this kind should be parsed
    fn accepts(&self, kind: u8) -> bool;
}

/// Accept every kind byte
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl KindFilter for AcceptAll {
    fn accepts(&self, _kind: u8) -> bool {
        true
    }
}

/// Accept only the built-in [`MessageKind`] values
#[derive(Debug, Clone, Copy, Default)]
pub struct KnownKinds;

impl KindFilter for KnownKinds {
    fn accepts(&self, kind: u8) -> bool {
        MessageKind::from_byte(kind).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_kinds() {
        assert!(KnownKinds.accepts(0));
        assert!(KnownKinds.accepts(2));
        assert!(!KnownKinds.accepts(3));
        assert!(AcceptAll.accepts(3));
    }
}
