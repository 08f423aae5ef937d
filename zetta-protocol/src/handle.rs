//! Protocol handle
//!
//! A [`Zetta`] handle owns the injected hooks and all mutable session state
//! for one link: the receive parser, the last delivered frame, the transmit
//! buffer, the last fault and the statistics. The busy flags live in a
//! [`LinkFlags`] that the handle shares with the completion context.
//!
//! # Example
//!
//! ```
//! use zetta_protocol::{LinkFlags, MessageKind, Outcome, TransmitError, Transport, Xor, Zetta};
//!
//! struct Loopback(heapless::Vec<u8, 64>);
//!
//! impl Transport for Loopback {
//!     fn send(&mut self, frame: &[u8]) -> Result<(), TransmitError> {
//!         self.0.extend_from_slice(frame).map_err(|_| TransmitError)
//!     }
//!     fn begin_receive(&mut self, _len: usize) {}
//! }
//!
//! let flags = LinkFlags::new();
//! let mut link = Zetta::new(&flags, Loopback(heapless::Vec::new()), Xor);
//!
//! link.send(MessageKind::Publish, &[0x10, 0x20, 0x30]).unwrap();
//! link.transmit_complete();
//!
//! let wire = link.transport().0.clone();
//! assert_eq!(wire.as_slice(), &[0xAA, 0x01, 0x03, 0x10, 0x20, 0x30, 0x02, 0xBC]);
//!
//! assert_eq!(link.feed_bytes(&wire).outcome, Outcome::FrameReady);
//! assert_eq!(link.payload(), Some(&[0x10, 0x20, 0x30][..]));
//! ```

use core::ops::Deref;

use crate::checksum::Checksum;
use crate::config::LinkConfig;
use crate::error::Fault;
use crate::flags::LinkFlags;
use crate::frame::{Frame, FrameError, MAX_FRAME_SIZE};
use crate::hooks::{AcceptAll, FaultHook, KindFilter, NoopFaultHook, TransmitError, Transport};
use crate::messages::MessageKind;
use crate::parser::{Feed, FrameParser, Outcome, RxState};
use crate::stats::LinkStats;

/// Protocol handle for one link
///
/// - `S`: shared [`LinkFlags`] (`&'static LinkFlags`, `Arc<LinkFlags>`, ...)
/// - `T`: [`Transport`] hook
/// - `C`: [`Checksum`] port
/// - `H`: [`FaultHook`], defaults to [`NoopFaultHook`]
/// - `K`: [`KindFilter`], defaults to [`AcceptAll`]
pub struct Zetta<S, T, C, H = NoopFaultHook, K = AcceptAll> {
    flags: S,
    transport: T,
    checksum: C,
    fault_hook: H,
    kinds: K,
    config: LinkConfig,
    parser: FrameParser,
    /// Last validated frame; `Some` means payload-ready
    ready: Option<Frame>,
    last_error: Option<Fault>,
    idle_ms: u32,
    tx_buffer: [u8; MAX_FRAME_SIZE],
    tx_len: usize,
    stats: LinkStats,
}

impl<S, T, C> Zetta<S, T, C>
where
    S: Deref<Target = LinkFlags>,
    T: Transport,
    C: Checksum,
{
    /// Create a handle with the default fault hook, kind filter and config
    ///
    /// Both directions of `flags` are marked ready.
    pub fn new(flags: S, transport: T, checksum: C) -> Self {
        flags.clear();
        let config = LinkConfig::default();
        Self {
            flags,
            transport,
            checksum,
            fault_hook: NoopFaultHook,
            kinds: AcceptAll,
            config,
            parser: FrameParser::with_max_payload(config.effective_max_payload()),
            ready: None,
            last_error: None,
            idle_ms: 0,
            tx_buffer: [0; MAX_FRAME_SIZE],
            tx_len: 0,
            stats: LinkStats::default(),
        }
    }
}

impl<S, T, C, H, K> Zetta<S, T, C, H, K>
where
    S: Deref<Target = LinkFlags>,
    T: Transport,
    C: Checksum,
    H: FaultHook,
    K: KindFilter,
{
    /// Replace the fault hook
    pub fn with_fault_hook<H2: FaultHook>(self, fault_hook: H2) -> Zetta<S, T, C, H2, K> {
        Zetta {
            flags: self.flags,
            transport: self.transport,
            checksum: self.checksum,
            fault_hook,
            kinds: self.kinds,
            config: self.config,
            parser: self.parser,
            ready: self.ready,
            last_error: self.last_error,
            idle_ms: self.idle_ms,
            tx_buffer: self.tx_buffer,
            tx_len: self.tx_len,
            stats: self.stats,
        }
    }

    /// Replace the kind filter
    pub fn with_kind_filter<K2: KindFilter>(self, kinds: K2) -> Zetta<S, T, C, H, K2> {
        Zetta {
            flags: self.flags,
            transport: self.transport,
            checksum: self.checksum,
            fault_hook: self.fault_hook,
            kinds,
            config: self.config,
            parser: self.parser,
            ready: self.ready,
            last_error: self.last_error,
            idle_ms: self.idle_ms,
            tx_buffer: self.tx_buffer,
            tx_len: self.tx_len,
            stats: self.stats,
        }
    }

    /// Apply a link configuration
    pub fn with_config(mut self, config: LinkConfig) -> Self {
        self.config = config;
        self.parser = FrameParser::with_max_payload(config.effective_max_payload());
        self
    }

    // ---- Transmit path ----

    /// Encode a frame and hand it to the transport
    ///
    /// If a previous transmit is still in flight this spins, calling
    /// [`Transport::wait`], until its completion is signalled.
    pub fn send(&mut self, kind: impl Into<u8>, payload: &[u8]) -> Result<(), Fault> {
        while self.flags.is_transmit_busy() {
            self.transport.wait();
        }
        self.transmit(kind.into(), payload)
    }

    /// Like [`send`](Self::send), but fails with [`Fault::TransmitBusy`] instead of waiting
    pub fn try_send(&mut self, kind: impl Into<u8>, payload: &[u8]) -> Result<(), Fault> {
        if self.flags.is_transmit_busy() {
            return Err(self.request_fault(Fault::TransmitBusy));
        }
        self.transmit(kind.into(), payload)
    }

    fn transmit(&mut self, kind: u8, payload: &[u8]) -> Result<(), Fault> {
        if payload.len() > self.config.effective_max_payload() as usize {
            return Err(self.request_fault(Fault::PayloadTooLarge));
        }

        let frame = match Frame::new(kind, payload) {
            Ok(frame) => frame,
            Err(_) => return Err(self.request_fault(Fault::PayloadTooLarge)),
        };
        let len = match frame.encode(&self.checksum, &mut self.tx_buffer) {
            Ok(len) => len,
            Err(FrameError::PayloadTooLarge) => {
                return Err(self.request_fault(Fault::PayloadTooLarge))
            }
            Err(FrameError::BufferTooSmall) => {
                return Err(self.request_fault(Fault::MalformedState))
            }
        };
        self.tx_len = len;

        // Busy before the hand-off: a synchronous transport may complete inside `send`.
        self.flags.begin_transmit();
        if self.transport.send(&self.tx_buffer[..len]).is_err() {
            self.flags.transmit_complete();
            self.stats.transmit_errors = self.stats.transmit_errors.wrapping_add(1);
            return Err(self.request_fault(Fault::TransmitFailed));
        }
        self.stats.frames_sent = self.stats.frames_sent.wrapping_add(1);

        #[cfg(feature = "defmt")]
        defmt::trace!("zetta: sent kind {} len {}", kind, payload.len());

        Ok(())
    }

    /// Signal that the transport finished sending the last frame
    pub fn transmit_complete(&self) {
        self.flags.transmit_complete();
    }

    /// Check if a transmit is in flight
    pub fn is_transmit_busy(&self) -> bool {
        self.flags.is_transmit_busy()
    }

    /// Wire bytes of the most recently transmitted frame
    pub fn last_transmitted(&self) -> &[u8] {
        &self.tx_buffer[..self.tx_len]
    }

    // ---- Receive path ----

    /// Ask the transport for the next incoming byte
    pub fn start_receive(&mut self) -> Result<(), Fault> {
        if self.flags.is_receive_busy() {
            return Err(self.request_fault(Fault::ReceiveBusy));
        }
        self.flags.begin_receive();
        self.transport.begin_receive(1);
        Ok(())
    }

    /// Signal that the requested receive has completed
    pub fn receive_complete(&self) {
        self.flags.receive_complete();
    }

    /// Check if a receive request is outstanding
    pub fn is_receive_busy(&self) -> bool {
        self.flags.is_receive_busy()
    }

    /// Feed one received byte through the state machine
    ///
    /// On [`Outcome::Fault`] the fault hook has already run.
    pub fn feed(&mut self, byte: u8) -> Outcome {
        self.idle_ms = 0;
        self.stats.bytes_received = self.stats.bytes_received.wrapping_add(1);

        let state = self.parser.state();
        match self.parser.feed(byte, &self.checksum, &self.kinds) {
            Outcome::FrameReady => match self.parser.take_frame() {
                Some(frame) => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("zetta: frame kind {} len {}", frame.kind, frame.len());

                    self.ready = Some(frame);
                    self.stats.frames_received = self.stats.frames_received.wrapping_add(1);
                    Outcome::FrameReady
                }
                None => Outcome::Fault(self.receive_fault(Fault::MalformedState, state)),
            },
            Outcome::Fault(fault) => Outcome::Fault(self.receive_fault(fault, state)),
            Outcome::Incomplete => Outcome::Incomplete,
        }
    }

    /// Feed a buffer, stopping after the first complete frame
    ///
    /// Bytes after that frame are not consumed; call again with the rest.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Feed {
        let mut outcome = Outcome::Incomplete;
        for (i, &byte) in bytes.iter().enumerate() {
            outcome = self.feed(byte);
            if outcome.is_ready() {
                return Feed {
                    outcome,
                    consumed: i + 1,
                };
            }
        }
        Feed {
            outcome,
            consumed: bytes.len(),
        }
    }

    /// Advance the inactivity timer
    ///
    /// When a partial frame has seen no byte for the configured timeout it is
    /// abandoned with [`Fault::Timeout`]. Does nothing if no timeout is set.
    pub fn update_time(&mut self, delta_ms: u32) -> Option<Fault> {
        let limit = self.config.effective_inactivity_timeout_ms()?;
        if !self.parser.in_frame() {
            self.idle_ms = 0;
            return None;
        }

        self.idle_ms = self.idle_ms.saturating_add(delta_ms);
        if self.idle_ms < limit {
            return None;
        }

        let state = self.parser.state();
        Some(self.receive_fault(Fault::Timeout, state))
    }

    // ---- Payload access ----

    /// Returns true if a validated frame is waiting to be read
    pub fn payload_ready(&self) -> bool {
        self.ready.is_some()
    }

    /// The last validated frame, if payload-ready
    pub fn frame(&self) -> Option<&Frame> {
        self.ready.as_ref()
    }

    /// Raw kind byte of the last validated frame, if payload-ready
    pub fn kind(&self) -> Option<u8> {
        self.ready.as_ref().map(|frame| frame.kind)
    }

    /// Built-in kind of the last validated frame, if payload-ready and known
    pub fn message_kind(&self) -> Option<MessageKind> {
        self.ready.as_ref().and_then(Frame::message_kind)
    }

    /// Payload of the last validated frame, if payload-ready
    pub fn payload(&self) -> Option<&[u8]> {
        self.ready.as_ref().map(|frame| frame.payload.as_slice())
    }

    /// Consume the last validated frame, clearing payload-ready
    pub fn take_frame(&mut self) -> Option<Frame> {
        self.ready.take()
    }

    // ---- Diagnostics and lifecycle ----

    /// Current receive state
    pub fn rx_state(&self) -> RxState {
        self.parser.state()
    }

    /// Most recent fault
    pub fn last_error(&self) -> Option<Fault> {
        self.last_error
    }

    /// Link counters
    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    /// Active configuration
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Shared busy flags
    pub fn flags(&self) -> &LinkFlags {
        &self.flags
    }

    /// Transport hook
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Transport hook, mutably (e.g. to read from the underlying UART)
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Checksum port
    pub fn checksum(&self) -> &C {
        &self.checksum
    }

    /// Fault hook
    pub fn fault_hook(&self) -> &H {
        &self.fault_hook
    }

    /// Reinitialize the receive side
    ///
    /// Drops any partial or ready frame and clears the last fault. In-flight
    /// transfers are left alone; their completion still arrives via the flags.
    pub fn reset(&mut self) {
        self.parser.reset();
        self.ready = None;
        self.last_error = None;
        self.idle_ms = 0;
    }

    /// Error manager for faults that abort a partial frame
    fn receive_fault(&mut self, fault: Fault, state: RxState) -> Fault {
        self.parser.reset();
        self.idle_ms = 0;
        self.stats.record_fault(fault);
        self.report(fault, state)
    }

    /// Error manager for request-level faults; the receive parser is untouched
    fn request_fault(&mut self, fault: Fault) -> Fault {
        let state = self.parser.state();
        self.report(fault, state)
    }

    fn report(&mut self, fault: Fault, state: RxState) -> Fault {
        self.last_error = Some(fault);

        #[cfg(feature = "defmt")]
        defmt::warn!("zetta: {} in state {}", fault, state);

        self.fault_hook.on_fault(fault, state);
        fault
    }
}
