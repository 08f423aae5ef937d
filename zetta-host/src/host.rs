//! Host-side link driver

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, trace, warn};
use zetta_hal::{UartRx, UartTransport, UartTx};
use zetta_protocol::{
    Fault, FaultHook, Frame, KindFilter, LinkFlags, LinkStats, MessageKind, Outcome, RxState,
    Zetta, MAX_PAYLOAD_SIZE,
};

use crate::config::{ChecksumKind, HostConfig};
use crate::error::{HostError, Result};
use crate::packet::Packet;

type PacketCallback = Box<dyn FnMut(&Packet) + Send>;
type FaultCallback = Box<dyn FnMut(Fault) + Send>;

/// Fault hook that logs through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TraceFaults;

impl FaultHook for TraceFaults {
    fn on_fault(&mut self, fault: Fault, state: RxState) {
        match fault {
            Fault::InvalidStart => trace!(?state, "zetta: byte outside frame"),
            Fault::TransmitBusy | Fault::ReceiveBusy | Fault::TransmitFailed => {
                debug!(%fault, "zetta: request rejected")
            }
            _ => warn!(%fault, ?state, "zetta: link fault"),
        }
    }
}

/// Kind filter selected at runtime
#[derive(Debug, Clone, Copy)]
pub struct HostKinds {
    strict: bool,
}

impl KindFilter for HostKinds {
    fn accepts(&self, kind: u8) -> bool {
        !self.strict || MessageKind::from_byte(kind).is_some()
    }
}

/// Protocol handle type used by [`ZettaHost`]
pub type HostLink<U> = Zetta<
    Arc<LinkFlags>,
    UartTransport<U, Arc<LinkFlags>>,
    ChecksumKind,
    TraceFaults,
    HostKinds,
>;

/// Snapshot of host counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostStats {
    /// Protocol handle counters
    pub link: LinkStats,
    /// Frames whose UART write failed
    pub write_errors: u32,
    /// Packets discarded because the queue was full
    pub dropped_packets: u64,
    /// Packets waiting in the queue
    pub queued: usize,
}

/// Zetta link over a host serial port
///
/// Owns the UART and a protocol handle. [`poll`](Self::poll) pumps received
/// bytes through the handle and queues every validated frame as a
/// [`Packet`]; registered callbacks see packets and receive faults as they
/// happen.
pub struct ZettaHost<U: UartTx> {
    link: HostLink<U>,
    queue: VecDeque<Packet>,
    queue_capacity: usize,
    rx_buf: Vec<u8>,
    dropped: u64,
    last_poll: Instant,
    on_packet: Option<PacketCallback>,
    on_fault: Option<FaultCallback>,
}

impl<U> ZettaHost<U>
where
    U: UartTx + UartRx,
    <U as UartTx>::Error: std::error::Error + Send + Sync + 'static,
    <U as UartRx>::Error: std::error::Error + Send + Sync + 'static,
{
    /// Bind a link to `uart`
    pub fn new(uart: U, config: &HostConfig) -> Self {
        let flags = Arc::new(LinkFlags::new());
        let transport = UartTransport::new(uart, Arc::clone(&flags));
        let link = Zetta::new(flags, transport, config.checksum)
            .with_fault_hook(TraceFaults)
            .with_kind_filter(HostKinds {
                strict: config.strict_kinds,
            })
            .with_config(config.effective_link());

        debug!(
            checksum = ?config.checksum,
            baudrate = config.uart.baudrate,
            "zetta: host link ready"
        );

        Self {
            link,
            queue: VecDeque::new(),
            queue_capacity: config.queue_capacity.max(1),
            rx_buf: vec![0; config.poll_chunk.max(1)],
            dropped: 0,
            last_poll: Instant::now(),
            on_packet: None,
            on_fault: None,
        }
    }

    /// Call `callback` for every received packet, before it is queued
    pub fn on_packet(&mut self, callback: impl FnMut(&Packet) + Send + 'static) {
        self.on_packet = Some(Box::new(callback));
    }

    /// Call `callback` for every receive fault except bytes outside a frame
    pub fn on_fault(&mut self, callback: impl FnMut(Fault) + Send + 'static) {
        self.on_fault = Some(Box::new(callback));
    }

    /// Send a raw payload
    ///
    /// A failed UART write is returned as [`HostError::Uart`].
    pub fn send_raw(&mut self, kind: impl Into<u8>, payload: &[u8]) -> Result<()> {
        let kind = kind.into();
        match self.link.send(kind, payload) {
            Ok(()) => {
                trace!(kind, len = payload.len(), "zetta: sent");
                Ok(())
            }
            Err(Fault::TransmitFailed) => match self.link.transport_mut().take_write_error() {
                Some(err) => {
                    warn!(kind, error = %err, "zetta: UART write failed");
                    Err(HostError::uart(err))
                }
                None => Err(Fault::TransmitFailed.into()),
            },
            Err(fault) => Err(fault.into()),
        }
    }

    /// Send a postcard-encoded value
    pub fn send<T: Serialize>(&mut self, kind: impl Into<u8>, value: &T) -> Result<()> {
        let mut buf = [0u8; MAX_PAYLOAD_SIZE];
        let used = postcard::to_slice(value, &mut buf).map_err(HostError::Codec)?;
        let len = used.len();
        self.send_raw(kind, &buf[..len])
    }

    /// Send UTF-8 text
    pub fn send_str(&mut self, kind: impl Into<u8>, text: &str) -> Result<()> {
        self.send_raw(kind, text.as_bytes())
    }

    /// Read whatever the UART has and process it
    ///
    /// A poll that reads nothing advances the inactivity timer by the time
    /// since the previous poll; bytes still waiting in the UART never count
    /// as idle time. Returns the number of packets queued by this call.
    pub fn poll(&mut self) -> Result<usize> {
        if !self.link.is_receive_busy() {
            self.link.start_receive()?;
        }

        let mut buf = std::mem::take(&mut self.rx_buf);
        let read = self.link.transport_mut().poll_receive(&mut buf);

        let now = Instant::now();
        let idle = now.duration_since(self.last_poll).as_millis();
        self.last_poll = now;

        let result = match read {
            Ok(0) => {
                let idle = u32::try_from(idle).unwrap_or(u32::MAX);
                if let Some(fault) = self.link.update_time(idle) {
                    self.notify_fault(fault);
                }
                Ok(0)
            }
            Ok(n) => Ok(self.ingest(&buf[..n])),
            Err(err) => Err(HostError::uart(err)),
        };
        self.rx_buf = buf;
        result
    }

    /// Poll until a packet is available or `attempts` polls found nothing
    pub fn poll_for_packet(&mut self, attempts: usize) -> Result<Option<Packet>> {
        for _ in 0..attempts {
            if !self.queue.is_empty() {
                break;
            }
            self.poll()?;
        }
        Ok(self.queue.pop_front())
    }

    fn ingest(&mut self, bytes: &[u8]) -> usize {
        let mut queued = 0;
        for &byte in bytes {
            match self.link.feed(byte) {
                Outcome::FrameReady => {
                    if let Some(frame) = self.link.take_frame() {
                        self.deliver(&frame);
                        queued += 1;
                    }
                }
                Outcome::Fault(fault) => self.notify_fault(fault),
                Outcome::Incomplete => {}
            }
        }
        queued
    }

    fn deliver(&mut self, frame: &Frame) {
        let packet = Packet::from_frame(frame, self.link.checksum());
        debug!(kind = packet.kind, len = packet.data.len(), "zetta: packet");

        if let Some(callback) = self.on_packet.as_mut() {
            callback(&packet);
        }
        if self.queue.len() >= self.queue_capacity {
            self.queue.pop_front();
            self.dropped += 1;
            warn!(dropped = self.dropped, "zetta: packet queue full, dropped oldest");
        }
        self.queue.push_back(packet);
    }

    fn notify_fault(&mut self, fault: Fault) {
        if fault == Fault::InvalidStart {
            return;
        }
        if let Some(callback) = self.on_fault.as_mut() {
            callback(fault);
        }
    }

    /// Take the oldest queued packet
    pub fn next_packet(&mut self) -> Option<Packet> {
        self.queue.pop_front()
    }

    /// Packets waiting in the queue
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Discard queued packets and any partial frame; returns the packets dropped
    pub fn flush(&mut self) -> usize {
        let n = self.queue.len();
        self.queue.clear();
        self.link.reset();
        n
    }

    /// Current counters
    pub fn stats(&self) -> HostStats {
        HostStats {
            link: *self.link.stats(),
            write_errors: self.link.transport().write_errors(),
            dropped_packets: self.dropped,
            queued: self.queue.len(),
        }
    }

    /// Most recent fault seen by the handle
    pub fn last_error(&self) -> Option<Fault> {
        self.link.last_error()
    }

    /// Underlying protocol handle
    pub fn link(&self) -> &HostLink<U> {
        &self.link
    }

    /// Underlying UART
    pub fn uart(&self) -> &U {
        self.link.transport().uart()
    }

    /// Underlying UART, mutably
    pub fn uart_mut(&mut self) -> &mut U {
        self.link.transport_mut().uart_mut()
    }
}
