//! UART-backed transport hook
//!
//! Adapts a blocking [`UartTx`]/[`UartRx`] pair to [`Transport`]. Because the
//! write blocks until the bytes are out, the adapter signals transmit
//! completion on the shared [`LinkFlags`] itself, right after the write. A
//! failed write is returned to the handle as a [`TransmitError`] and the
//! UART's own error is kept for [`UartTransport::take_write_error`].

use core::ops::Deref;

use zetta_protocol::{LinkFlags, TransmitError, Transport};

use crate::uart::{UartRx, UartTx};

/// [`Transport`] over a blocking UART
pub struct UartTransport<U: UartTx, S> {
    uart: U,
    flags: S,
    pending_rx: usize,
    write_errors: u32,
    last_write_error: Option<<U as UartTx>::Error>,
}

impl<U, S> UartTransport<U, S>
where
    U: UartTx,
    S: Deref<Target = LinkFlags>,
{
    /// Wrap a UART; `flags` must be the same flags given to the handle
    pub fn new(uart: U, flags: S) -> Self {
        Self {
            uart,
            flags,
            pending_rx: 0,
            write_errors: 0,
            last_write_error: None,
        }
    }

    /// Underlying UART
    pub fn uart(&self) -> &U {
        &self.uart
    }

    /// Underlying UART, mutably
    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    /// Number of frames whose write or flush failed
    pub fn write_errors(&self) -> u32 {
        self.write_errors
    }

    /// Take the error of the most recent failed write, if not yet taken
    pub fn take_write_error(&mut self) -> Option<<U as UartTx>::Error> {
        self.last_write_error.take()
    }

    /// Bytes requested by the last `begin_receive` and not yet delivered
    pub fn pending_receive(&self) -> usize {
        self.pending_rx
    }

    /// Release the UART
    pub fn into_inner(self) -> U {
        self.uart
    }
}

impl<U, S> UartTransport<U, S>
where
    U: UartTx + UartRx,
    S: Deref<Target = LinkFlags>,
{
    /// Read available bytes for an outstanding receive request
    ///
    /// Reads at most `buf.len()` bytes. Once any byte arrives the request is
    /// marked complete on the flags. Returns `Ok(0)` if nothing is pending or
    /// no receive was requested.
    pub fn poll_receive(&mut self, buf: &mut [u8]) -> Result<usize, <U as UartRx>::Error> {
        if self.pending_rx == 0 {
            return Ok(0);
        }
        let n = self.uart.read(buf)?;
        if n > 0 {
            self.pending_rx = 0;
            self.flags.receive_complete();
        }
        Ok(n)
    }
}

impl<U, S> Transport for UartTransport<U, S>
where
    U: UartTx,
    S: Deref<Target = LinkFlags>,
{
    fn send(&mut self, frame: &[u8]) -> Result<(), TransmitError> {
        let result = self
            .uart
            .write_blocking(frame)
            .and_then(|()| self.uart.flush());
        self.flags.transmit_complete();

        match result {
            Ok(()) => Ok(()),
            Err(err) => {
                self.write_errors = self.write_errors.wrapping_add(1);
                self.last_write_error = Some(err);

                #[cfg(feature = "defmt")]
                defmt::warn!("zetta: UART write failed ({} bytes)", frame.len());

                Err(TransmitError)
            }
        }
    }

    fn begin_receive(&mut self, len: usize) {
        self.pending_rx = len.max(1);
    }
}
