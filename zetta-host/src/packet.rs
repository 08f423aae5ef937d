//! Received packets

use std::time::Instant;

use serde::de::DeserializeOwned;
use zetta_protocol::{Checksum, Frame, MessageKind};

use crate::error::{HostError, Result};

/// A validated frame as delivered to the application
#[derive(Debug, Clone)]
pub struct Packet {
    /// Raw kind byte
    pub kind: u8,
    /// Payload bytes
    pub data: Vec<u8>,
    /// Complete frame as it appeared on the wire
    pub raw: Vec<u8>,
    /// When the closing sentinel was processed
    pub received_at: Instant,
}

impl Packet {
    pub(crate) fn from_frame<C: Checksum + ?Sized>(frame: &Frame, checksum: &C) -> Self {
        let mut raw = vec![0u8; frame.wire_len()];
        // A received frame always fits its own wire length
        let written = frame.encode(checksum, &mut raw).unwrap_or(0);
        raw.truncate(written);
        Self {
            kind: frame.kind,
            data: frame.payload.to_vec(),
            raw,
            received_at: Instant::now(),
        }
    }

    /// Kind as a known message kind
    pub fn message_kind(&self) -> Option<MessageKind> {
        MessageKind::from_byte(self.kind)
    }

    /// Decode a postcard-encoded payload
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        postcard::from_bytes(&self.data).map_err(HostError::Codec)
    }

    /// Payload as UTF-8 text
    pub fn as_str(&self) -> Result<&str> {
        Ok(std::str::from_utf8(&self.data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zetta_protocol::Xor;

    #[test]
    fn test_raw_matches_wire() {
        let frame = Frame::new(MessageKind::Publish, &[0x10, 0x20, 0x30]).unwrap();
        let packet = Packet::from_frame(&frame, &Xor);
        assert_eq!(packet.raw, vec![0xAA, 0x01, 0x03, 0x10, 0x20, 0x30, 0x02, 0xBC]);
        assert_eq!(packet.data, vec![0x10, 0x20, 0x30]);
        assert_eq!(packet.message_kind(), Some(MessageKind::Publish));
    }

    #[test]
    fn test_text_payload() {
        let frame = Frame::new(MessageKind::Publish, b"temp/room1").unwrap();
        let packet = Packet::from_frame(&frame, &Xor);
        assert_eq!(packet.as_str().unwrap(), "temp/room1");

        let frame = Frame::new(MessageKind::Publish, &[0xFF, 0xFE]).unwrap();
        let packet = Packet::from_frame(&frame, &Xor);
        assert!(matches!(packet.as_str(), Err(HostError::Utf8(_))));
    }

    #[test]
    fn test_decode_postcard() {
        let bytes = postcard::to_allocvec(&(7u16, -3i32)).unwrap();
        let frame = Frame::new(0x42, &bytes).unwrap();
        let packet = Packet::from_frame(&frame, &Xor);
        assert_eq!(packet.message_kind(), None);
        assert_eq!(packet.decode::<(u16, i32)>().unwrap(), (7, -3));
        assert!(matches!(packet.decode::<[u64; 4]>(), Err(HostError::Codec(_))));
    }
}
