//! Byte-at-a-time receive state machine
//!
//! ```text
//! WaitStart ─0xAA─▶ GetKind ─▶ GetLength ─len>0─▶ GetPayload ─┐
//!     ▲                            │                          │
//!     │                            └──────len==0──────┐       │
//!     │                                               ▼       ▼
//!     └─────────────── GetStop ◀──────────────── GetChecksum ◀┘
//! ```
//!
//! Every fault aborts the partial frame and returns the parser to
//! `WaitStart`, so the link resynchronizes on the next start sentinel.

use crate::checksum::Checksum;
use crate::error::Fault;
use crate::frame::{compute_checksum, Frame, FRAME_START, FRAME_STOP, MAX_PAYLOAD_SIZE};
use crate::hooks::KindFilter;

/// Receive parser states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxState {
    /// Waiting for START byte
    WaitStart,
    /// Got START, waiting for KIND
    GetKind,
    /// Got KIND, waiting for LENGTH
    GetLength,
    /// Reading payload bytes
    GetPayload,
    /// Waiting for CHECKSUM
    GetChecksum,
    /// Waiting for STOP
    GetStop,
}

/// Result of feeding one byte
///
/// "Still parsing" and "parsing failed" are distinct outcomes.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// More bytes are needed; no fault
    Incomplete,
    /// A frame passed its checksum and is available to the host
    FrameReady,
    /// The byte revealed a fault; the partial frame was discarded
    Fault(Fault),
}

impl Outcome {
    /// Returns true if a frame just completed
    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::FrameReady)
    }

    /// The fault carried by this outcome, if any
    pub fn fault(&self) -> Option<Fault> {
        match self {
            Outcome::Fault(fault) => Some(*fault),
            _ => None,
        }
    }
}

/// Result of feeding a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Feed {
    /// `FrameReady` if a frame completed, otherwise the outcome of the last byte
    pub outcome: Outcome,
    /// Bytes consumed; anything after the first completed frame is left over
    pub consumed: usize,
}

/// State machine for parsing incoming frames
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: RxState,
    frame: Frame,
    expected_length: u8,
    received_checksum: u8,
    max_payload: u8,
    complete: bool,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a new frame parser accepting payloads up to [`MAX_PAYLOAD_SIZE`]
    pub fn new() -> Self {
        Self::with_max_payload(MAX_PAYLOAD_SIZE as u8)
    }

    /// Create a parser with a tighter payload bound
    ///
    /// Values above [`MAX_PAYLOAD_SIZE`] are clamped.
    pub fn with_max_payload(max_payload: u8) -> Self {
        Self {
            state: RxState::WaitStart,
            frame: Frame::empty(0u8),
            expected_length: 0,
            received_checksum: 0,
            max_payload: max_payload.min(MAX_PAYLOAD_SIZE as u8),
            complete: false,
        }
    }

    /// Reset the parser state, discarding any partial or completed frame
    pub fn reset(&mut self) {
        self.state = RxState::WaitStart;
        self.frame.payload.clear();
        self.expected_length = 0;
        self.received_checksum = 0;
        self.complete = false;
    }

    /// Current state
    pub fn state(&self) -> RxState {
        self.state
    }

    /// Index of the next payload byte to fill
    pub fn cursor(&self) -> usize {
        self.frame.payload.len()
    }

    /// Returns true while a frame is partially assembled
    pub fn in_frame(&self) -> bool {
        self.state != RxState::WaitStart
    }

    /// Largest payload this parser accepts
    pub fn max_payload(&self) -> u8 {
        self.max_payload
    }

    /// Take the frame completed by the last `FrameReady`
    ///
    /// Returns `None` if no frame has completed since the last take or reset.
    pub fn take_frame(&mut self) -> Option<Frame> {
        if !self.complete {
            return None;
        }
        self.complete = false;
        Some(core::mem::replace(&mut self.frame, Frame::empty(0u8)))
    }

    /// Feed a single byte to the parser
    pub fn feed<C, K>(&mut self, byte: u8, checksum: &C, kinds: &K) -> Outcome
    where
        C: Checksum + ?Sized,
        K: KindFilter + ?Sized,
    {
        match self.state {
            RxState::WaitStart => {
                if byte != FRAME_START {
                    return Outcome::Fault(Fault::InvalidStart);
                }
                self.frame.payload.clear();
                self.complete = false;
                self.state = RxState::GetKind;
                Outcome::Incomplete
            }
            RxState::GetKind => {
                if !kinds.accepts(byte) {
                    return self.abort(Fault::UnrecognizedKind);
                }
                self.frame.kind = byte;
                self.state = RxState::GetLength;
                Outcome::Incomplete
            }
            RxState::GetLength => {
                // Checked before any payload byte is stored
                if byte > self.max_payload {
                    return self.abort(Fault::PayloadTooLarge);
                }
                self.expected_length = byte;
                self.state = if byte == 0 {
                    RxState::GetChecksum
                } else {
                    RxState::GetPayload
                };
                Outcome::Incomplete
            }
            RxState::GetPayload => {
                if self.frame.payload.push(byte).is_err() {
                    return self.abort(Fault::MalformedState);
                }
                if self.frame.payload.len() >= self.expected_length as usize {
                    self.state = RxState::GetChecksum;
                }
                Outcome::Incomplete
            }
            RxState::GetChecksum => {
                self.received_checksum = byte;
                self.state = RxState::GetStop;
                Outcome::Incomplete
            }
            RxState::GetStop => {
                if byte != FRAME_STOP {
                    return self.abort(Fault::InvalidStop);
                }
                let expected = compute_checksum(checksum, self.frame.kind, &self.frame.payload);
                if expected != self.received_checksum {
                    return self.abort(Fault::ChecksumMismatch);
                }
                self.state = RxState::WaitStart;
                self.complete = true;
                Outcome::FrameReady
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Stops after the first complete frame. Faults along the way are skipped
    /// over so garbage before a frame does not hide it.
    pub fn feed_bytes<C, K>(&mut self, bytes: &[u8], checksum: &C, kinds: &K) -> Feed
    where
        C: Checksum + ?Sized,
        K: KindFilter + ?Sized,
    {
        let mut outcome = Outcome::Incomplete;
        for (i, &byte) in bytes.iter().enumerate() {
            outcome = self.feed(byte, checksum, kinds);
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

    fn abort(&mut self, fault: Fault) -> Outcome {
        self.reset();
        Outcome::Fault(fault)
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    extern crate std;

    use super::*;
    use crate::checksum::{Crc8, Xor};
    use crate::hooks::{AcceptAll, KnownKinds};
    use crate::messages::MessageKind;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    const SCENARIO: [u8; 8] = [0xAA, 0x01, 0x03, 0x10, 0x20, 0x30, 0x02, 0xBC];

    fn feed_all(parser: &mut FrameParser, bytes: &[u8]) -> Vec<Outcome> {
        bytes
            .iter()
            .map(|&b| parser.feed(b, &Xor, &AcceptAll))
            .collect()
    }

    #[test]
    fn test_publish_scenario_byte_by_byte() {
        let mut parser = FrameParser::new();
        let outcomes = feed_all(&mut parser, &SCENARIO);

        for outcome in &outcomes[..7] {
            assert_eq!(*outcome, Outcome::Incomplete);
        }
        assert_eq!(outcomes[7], Outcome::FrameReady);

        let frame = parser.take_frame().unwrap();
        assert_eq!(frame.message_kind(), Some(MessageKind::Publish));
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.payload.as_slice(), &[0x10, 0x20, 0x30]);
        assert_eq!(parser.state(), RxState::WaitStart);
    }

    #[test]
    fn test_checksum_corruption_scenario() {
        let mut bytes = SCENARIO;
        bytes[6] = 0x03;

        let mut parser = FrameParser::new();
        let outcomes = feed_all(&mut parser, &bytes);

        assert_eq!(outcomes[7], Outcome::Fault(Fault::ChecksumMismatch));
        assert!(parser.take_frame().is_none());
        assert_eq!(parser.state(), RxState::WaitStart);
    }

    #[test]
    fn test_empty_payload_skips_payload_state() {
        let mut parser = FrameParser::new();
        assert_eq!(parser.feed(0xAA, &Xor, &AcceptAll), Outcome::Incomplete);
        assert_eq!(parser.feed(0x00, &Xor, &AcceptAll), Outcome::Incomplete);
        assert_eq!(parser.feed(0x00, &Xor, &AcceptAll), Outcome::Incomplete);
        assert_eq!(parser.state(), RxState::GetChecksum);
        assert_eq!(parser.feed(0x00, &Xor, &AcceptAll), Outcome::Incomplete);
        assert_eq!(parser.feed(0xBC, &Xor, &AcceptAll), Outcome::FrameReady);
        assert!(parser.take_frame().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_start_stays_waiting() {
        let mut parser = FrameParser::new();
        assert_eq!(
            parser.feed(0x55, &Xor, &AcceptAll),
            Outcome::Fault(Fault::InvalidStart)
        );
        assert_eq!(parser.state(), RxState::WaitStart);
    }

    #[test]
    fn test_oversize_length_rejected_before_payload() {
        let mut parser = FrameParser::new();
        let _ = parser.feed(0xAA, &Xor, &AcceptAll);
        let _ = parser.feed(0x01, &Xor, &AcceptAll);
        let outcome = parser.feed(MAX_PAYLOAD_SIZE as u8 + 1, &Xor, &AcceptAll);

        assert_eq!(outcome, Outcome::Fault(Fault::PayloadTooLarge));
        assert_eq!(parser.cursor(), 0);
        assert_eq!(parser.state(), RxState::WaitStart);
    }

    #[test]
    fn test_configured_max_payload() {
        let mut parser = FrameParser::with_max_payload(4);
        let _ = parser.feed(0xAA, &Xor, &AcceptAll);
        let _ = parser.feed(0x01, &Xor, &AcceptAll);
        assert_eq!(
            parser.feed(5, &Xor, &AcceptAll),
            Outcome::Fault(Fault::PayloadTooLarge)
        );
        assert_eq!(FrameParser::with_max_payload(200).max_payload(), MAX_PAYLOAD_SIZE as u8);
    }

    #[test]
    fn test_invalid_stop() {
        let mut bytes = SCENARIO;
        bytes[7] = 0xBB;
        let mut parser = FrameParser::new();
        let outcomes = feed_all(&mut parser, &bytes);
        assert_eq!(outcomes[7], Outcome::Fault(Fault::InvalidStop));
        assert_eq!(parser.state(), RxState::WaitStart);
    }

    #[test]
    fn test_kind_filter_rejects_unknown() {
        let mut parser = FrameParser::new();
        let _ = parser.feed(0xAA, &Xor, &KnownKinds);
        assert_eq!(
            parser.feed(0x7F, &Xor, &KnownKinds),
            Outcome::Fault(Fault::UnrecognizedKind)
        );
        assert_eq!(parser.state(), RxState::WaitStart);
    }

    #[test]
    fn test_feed_bytes_leaves_second_frame() {
        let mut data = Vec::new();
        data.extend_from_slice(&SCENARIO);
        data.extend_from_slice(&SCENARIO);

        let mut parser = FrameParser::new();
        let first = parser.feed_bytes(&data, &Xor, &AcceptAll);
        assert_eq!(first.outcome, Outcome::FrameReady);
        assert_eq!(first.consumed, SCENARIO.len());
        assert!(parser.take_frame().is_some());

        let second = parser.feed_bytes(&data[first.consumed..], &Xor, &AcceptAll);
        assert_eq!(second.outcome, Outcome::FrameReady);
        assert_eq!(second.consumed, SCENARIO.len());
    }

    #[test]
    fn test_feed_bytes_without_frame_reports_last_outcome() {
        let mut parser = FrameParser::new();
        let feed = parser.feed_bytes(&SCENARIO[..5], &Xor, &AcceptAll);
        assert_eq!(feed.outcome, Outcome::Incomplete);
        assert_eq!(feed.consumed, 5);
        assert_eq!(parser.state(), RxState::GetPayload);
        assert_eq!(parser.cursor(), 2);

        let mut parser = FrameParser::new();
        let feed = parser.feed_bytes(&[0x00, 0x11], &Xor, &AcceptAll);
        assert_eq!(feed.outcome, Outcome::Fault(Fault::InvalidStart));
        assert_eq!(feed.consumed, 2);
    }

    #[test]
    fn test_stop_sentinel_inside_payload() {
        // Sentinels are not escaped; the length field governs framing.
        let frame = Frame::new(MessageKind::Publish, &[0xBC, 0xAA, 0xBC]).unwrap();
        let encoded = frame.encode_to_vec(&Crc8::ZETTA).unwrap();
        let mut parser = FrameParser::new();
        let feed = parser.feed_bytes(&encoded, &Crc8::ZETTA, &AcceptAll);
        assert_eq!(feed.outcome, Outcome::FrameReady);
        assert_eq!(parser.take_frame().unwrap(), frame);
    }

    proptest! {
        #[test]
        fn prop_roundtrip(
            kind in 0u8..3,
            payload in proptest::collection::vec(any::<u8>(), 0..=MAX_PAYLOAD_SIZE),
        ) {
            let frame = Frame::new(kind, &payload).unwrap();
            let encoded = frame.encode_to_vec(&Crc8::ZETTA).unwrap();

            let mut parser = FrameParser::new();
            let feed = parser.feed_bytes(&encoded, &Crc8::ZETTA, &KnownKinds);
            prop_assert_eq!(feed.outcome, Outcome::FrameReady);
            prop_assert_eq!(feed.consumed, encoded.len());

            let parsed = parser.take_frame().unwrap();
            prop_assert_eq!(parsed.kind, kind);
            prop_assert_eq!(parsed.len() as usize, payload.len());
            prop_assert_eq!(parsed.payload.as_slice(), payload.as_slice());
        }

        #[test]
        fn prop_single_bit_flip_is_detected(
            payload in proptest::collection::vec(any::<u8>(), 1..=MAX_PAYLOAD_SIZE),
            index in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let frame = Frame::new(MessageKind::Publish, &payload).unwrap();
            let mut encoded = frame.encode_to_vec(&Crc8::ZETTA).unwrap();
            let target = 3 + index.index(payload.len());
            encoded[target] ^= 1 << bit;

            let mut parser = FrameParser::new();
            let feed = parser.feed_bytes(&encoded, &Crc8::ZETTA, &AcceptAll);
            prop_assert_eq!(feed.outcome, Outcome::Fault(Fault::ChecksumMismatch));
            prop_assert!(parser.take_frame().is_none());
        }

        #[test]
        fn prop_resync_after_garbage(
            garbage in proptest::collection::vec(any::<u8>().prop_filter("not start", |b| *b != FRAME_START), 0..64),
            payload in proptest::collection::vec(any::<u8>(), 0..=MAX_PAYLOAD_SIZE),
        ) {
            let frame = Frame::new(MessageKind::Subscribe, &payload).unwrap();
            let encoded = frame.encode_to_vec(&Xor).unwrap();

            let mut data = garbage.clone();
            data.extend_from_slice(&encoded);

            let mut parser = FrameParser::new();
            let feed = parser.feed_bytes(&data, &Xor, &AcceptAll);
            prop_assert_eq!(feed.outcome, Outcome::FrameReady);
            prop_assert_eq!(feed.consumed, data.len());
            prop_assert_eq!(parser.take_frame().unwrap(), frame);
        }
    }
}
