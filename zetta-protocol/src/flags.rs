//! Per-direction busy flags
//!
//! The flags are shared between the protocol handle and the context that
//! finishes a transfer (a DMA/UART interrupt on firmware, the transport adapter
//! on a host). On firmware place them in a `static`; on a host share them
//! through an `Arc`.

use portable_atomic::{AtomicBool, Ordering};

/// Independent transmit and receive busy flags for one link
#[derive(Debug, Default)]
pub struct LinkFlags {
    tx_busy: AtomicBool,
    rx_busy: AtomicBool,
}

impl LinkFlags {
    /// Create flags with both directions ready
    pub const fn new() -> Self {
        Self {
            tx_busy: AtomicBool::new(false),
            rx_busy: AtomicBool::new(false),
        }
    }

    /// Check if a transmit is in flight
    pub fn is_transmit_busy(&self) -> bool {
        self.tx_busy.load(Ordering::Acquire)
    }

    /// Check if a receive request is outstanding
    pub fn is_receive_busy(&self) -> bool {
        self.rx_busy.load(Ordering::Acquire)
    }

    /// Signal that the physical transmission has finished
    pub fn transmit_complete(&self) {
        self.tx_busy.store(false, Ordering::Release);
    }

    /// Signal that the requested bytes have been received
    pub fn receive_complete(&self) {
        self.rx_busy.store(false, Ordering::Release);
    }

    pub(crate) fn begin_transmit(&self) {
        self.tx_busy.store(true, Ordering::Release);
    }

    pub(crate) fn begin_receive(&self) {
        self.rx_busy.store(true, Ordering::Release);
    }

    /// Mark both directions ready
    pub(crate) fn clear(&self) {
        self.transmit_complete();
        self.receive_complete();
    }
}
