//! Diagnostic indicator fault hook

use zetta_protocol::{Fault, FaultHook, RxState};

use crate::gpio::OutputPin;

/// [`FaultHook`] that toggles an output pin on every fault
///
/// Wire it to a status LED to see link errors without a debugger.
/// `InvalidStart` faults can be ignored, since line noise between frames
/// would otherwise keep the LED flickering.
pub struct FaultIndicator<P> {
    pin: P,
    count: u32,
    ignore_invalid_start: bool,
}

impl<P: OutputPin> FaultIndicator<P> {
    /// Create an indicator; the pin is driven low
    pub fn new(mut pin: P) -> Self {
        pin.set_low();
        Self {
            pin,
            count: 0,
            ignore_invalid_start: false,
        }
    }

    /// Do not react to bytes outside frames
    pub fn ignore_invalid_start(mut self) -> Self {
        self.ignore_invalid_start = true;
        self
    }

    /// Faults signalled so far
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Indicator pin
    pub fn pin(&self) -> &P {
        &self.pin
    }
}

impl<P: OutputPin> FaultHook for FaultIndicator<P> {
    fn on_fault(&mut self, fault: Fault, _state: RxState) {
        if self.ignore_invalid_start && fault == Fault::InvalidStart {
            return;
        }
        self.count = self.count.wrapping_add(1);
        self.pin.toggle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zetta_protocol::{LinkFlags, Outcome, TransmitError, Transport, Xor, Zetta};

    struct Led(bool);

    impl OutputPin for Led {
        fn set_high(&mut self) {
            self.0 = true;
        }
        fn set_low(&mut self) {
            self.0 = false;
        }
        fn is_set_high(&self) -> bool {
            self.0
        }
    }

    struct NullTransport;

    impl Transport for NullTransport {
        fn send(&mut self, _frame: &[u8]) -> Result<(), TransmitError> {
            Ok(())
        }
        fn begin_receive(&mut self, _len: usize) {}
    }

    #[test]
    fn test_toggles_on_fault() {
        let flags = LinkFlags::new();
        let mut link = Zetta::new(&flags, NullTransport, Xor)
            .with_fault_hook(FaultIndicator::new(Led(true)));
        assert!(!link.fault_hook().pin().is_set_high());

        // Bad checksum
        let feed = link.feed_bytes(&[0xAA, 0x01, 0x01, 0x05, 0x00, 0xBC]);
        assert_eq!(feed.outcome, Outcome::Fault(Fault::ChecksumMismatch));
        assert!(link.fault_hook().pin().is_set_high());
        assert_eq!(link.fault_hook().count(), 1);
    }

    #[test]
    fn test_ignores_line_noise() {
        let flags = LinkFlags::new();
        let mut link = Zetta::new(&flags, NullTransport, Xor)
            .with_fault_hook(FaultIndicator::new(Led(false)).ignore_invalid_start());

        let _ = link.feed_bytes(&[0x00, 0x01, 0x02]);
        assert_eq!(link.fault_hook().count(), 0);

        let _ = link.feed_bytes(&[0xAA, 0x01, 0x00, 0x01, 0x00]);
        assert_eq!(link.fault_hook().count(), 1);
    }
}
