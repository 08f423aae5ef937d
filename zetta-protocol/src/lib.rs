//! Zetta serial packet protocol
//!
//! This crate implements a small framing protocol for exchanging short typed
//! packets over an unreliable byte-oriented link such as a UART. Frames are
//! delimited by sentinel bytes, tagged with a message kind, carry a bounded
//! payload, and are protected by a single checksum byte computed by a
//! host-supplied function.
//!
//! # Wire Format
//!
//! ```text
//! ┌───────┬──────┬────────┬─────────────┬──────────┬──────┐
//! │ START │ KIND │ LENGTH │ PAYLOAD     │ CHECKSUM │ STOP │
//! │ 0xAA  │ 1B   │ 1B     │ 0–25B       │ 1B       │ 0xBC │
//! └───────┴──────┴────────┴─────────────┴──────────┴──────┘
//! ```
//!
//! The checksum covers `KIND ++ LENGTH ++ PAYLOAD`. Nothing is padded: a frame
//! occupies exactly `5 + LENGTH` bytes on the wire.
//!
//! # Layers
//!
//! - [`Frame`] encodes a kind and payload into wire bytes.
//! - [`FrameParser`] is the byte-at-a-time receive state machine.
//! - [`Zetta`] is the protocol handle: it owns the injected hooks
//!   ([`Transport`], [`Checksum`], [`FaultHook`], [`KindFilter`]), the
//!   per-handle transmit buffer, the payload-ready latch, and the fault
//!   bookkeeping.

#![no_std]
#![deny(unsafe_code)]

pub mod checksum;
pub mod config;
pub mod error;
pub mod flags;
pub mod frame;
pub mod handle;
pub mod hooks;
pub mod messages;
pub mod parser;
pub mod stats;

pub use checksum::{Checksum, Crc8, FnChecksum, Xor};
pub use config::LinkConfig;
pub use error::Fault;
pub use flags::LinkFlags;
pub use frame::{
    Frame, FrameError, FRAME_OVERHEAD, FRAME_START, FRAME_STOP, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE,
};
pub use handle::Zetta;
pub use hooks::{
    AcceptAll, FaultHook, KindFilter, KnownKinds, NoopFaultHook, TransmitError, Transport,
};
pub use messages::MessageKind;
pub use parser::{Feed, FrameParser, Outcome, RxState};
pub use stats::LinkStats;
