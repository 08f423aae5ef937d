//! `std::io` serial port adapter

use std::io::{ErrorKind, Read, Write};

use zetta_hal::{UartRx, UartTx};

/// UART over any `Read + Write` stream
///
/// Intended for serial port handles opened with a short read timeout:
/// `WouldBlock`, `TimedOut` and `Interrupted` reads count as "nothing yet".
pub struct IoUart<T> {
    inner: T,
}

impl<T> IoUart<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the adapter and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Write> UartTx for IoUart<T> {
    type Error = std::io::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.inner.flush()
    }
}

impl<T: Read> UartRx for IoUart<T> {
    type Error = std::io::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match self.inner.read(buf) {
            Ok(n) => Ok(n),
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                Ok(0)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct Flaky {
        kind: ErrorKind,
    }

    impl Read for Flaky {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::from(self.kind))
        }
    }

    #[test]
    fn test_timeouts_read_as_empty() {
        for kind in [ErrorKind::WouldBlock, ErrorKind::TimedOut, ErrorKind::Interrupted] {
            let mut uart = IoUart::new(Flaky { kind });
            let mut buf = [0u8; 8];
            assert_eq!(uart.read(&mut buf).unwrap(), 0);
            assert_eq!(uart.read_byte().unwrap(), None);
        }
    }

    #[test]
    fn test_hard_errors_propagate() {
        let mut uart = IoUart::new(Flaky {
            kind: ErrorKind::BrokenPipe,
        });
        let mut buf = [0u8; 8];
        assert_eq!(
            uart.read(&mut buf).unwrap_err().kind(),
            ErrorKind::BrokenPipe
        );
    }

    #[test]
    fn test_write_goes_to_stream() {
        let mut uart = IoUart::new(Vec::new());
        uart.write_blocking(&[0xAA, 0xBC]).unwrap();
        UartTx::flush(&mut uart).unwrap();
        assert_eq!(uart.into_inner(), vec![0xAA, 0xBC]);
    }
}
