//! Frame encoding for the Zetta protocol.
//!
//! Frame format:
//! - START (1 byte): 0xAA synchronization byte
//! - KIND (1 byte): message kind identifier
//! - LENGTH (1 byte): payload length (0-25)
//! - PAYLOAD (0-25 bytes): opaque data
//! - CHECKSUM (1 byte): low byte of `checksum(KIND ++ LENGTH ++ PAYLOAD)`
//! - STOP (1 byte): 0xBC end marker

use heapless::Vec;

use crate::checksum::Checksum;
use crate::messages::MessageKind;

/// Frame synchronization byte
pub const FRAME_START: u8 = 0xAA;

/// Frame end marker
pub const FRAME_STOP: u8 = 0xBC;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 25;

/// Bytes on the wire besides the payload (START + KIND + LENGTH + CHECKSUM + STOP)
pub const FRAME_OVERHEAD: usize = 5;

/// Maximum complete frame size
pub const MAX_FRAME_SIZE: usize = FRAME_OVERHEAD + MAX_PAYLOAD_SIZE;

/// Errors that can occur while constructing or encoding a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// A validated or constructed frame
///
/// Only `payload.len()` bytes are part of the logical frame; the spare
/// capacity of the backing buffer never reaches the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Raw message kind byte
    pub kind: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a new frame with the given kind and payload
    pub fn new(kind: impl Into<u8>, payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadTooLarge);
        }

        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            kind: kind.into(),
            payload: payload_vec,
        })
    }

    /// Create a frame with no payload
    pub fn empty(kind: impl Into<u8>) -> Self {
        Self {
            kind: kind.into(),
            payload: Vec::new(),
        }
    }

    /// Payload length as carried in the LENGTH field
    pub fn len(&self) -> u8 {
        self.payload.len() as u8
    }

    /// Returns true if the frame carries no payload
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// The kind as one of the built-in message kinds, if it is one
    pub fn message_kind(&self) -> Option<MessageKind> {
        MessageKind::try_from(self.kind).ok()
    }

    /// Number of bytes this frame occupies on the wire
    pub fn wire_len(&self) -> usize {
        FRAME_OVERHEAD + self.payload.len()
    }

    /// Checksum byte for this frame under the given checksum function
    pub fn checksum<C: Checksum + ?Sized>(&self, checksum: &C) -> u8 {
        compute_checksum(checksum, self.kind, &self.payload)
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode<C: Checksum + ?Sized>(
        &self,
        checksum: &C,
        buffer: &mut [u8],
    ) -> Result<usize, FrameError> {
        let frame_len = self.wire_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let len = self.payload.len();
        buffer[0] = FRAME_START;
        buffer[1] = self.kind;
        buffer[2] = len as u8;
        buffer[3..3 + len].copy_from_slice(&self.payload);
        buffer[3 + len] = self.checksum(checksum);
        buffer[4 + len] = FRAME_STOP;

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec<C: Checksum + ?Sized>(
        &self,
        checksum: &C,
    ) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(checksum, &mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}

/// Run the checksum over `kind ++ length ++ payload` and keep the low byte
///
/// `payload` must not exceed [`MAX_PAYLOAD_SIZE`].
pub(crate) fn compute_checksum<C: Checksum + ?Sized>(checksum: &C, kind: u8, payload: &[u8]) -> u8 {
    let mut scratch = [0u8; MAX_PAYLOAD_SIZE + 2];
    let len = payload.len().min(MAX_PAYLOAD_SIZE);
    scratch[0] = kind;
    scratch[1] = len as u8;
    scratch[2..2 + len].copy_from_slice(&payload[..len]);
    (checksum.checksum(&scratch[..2 + len]) & 0xFF) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::{Crc8, Xor};

    #[test]
    fn test_frame_encode_empty_payload() {
        let frame = Frame::empty(MessageKind::Ack);
        let mut buffer = [0u8; 10];
        let len = frame.encode(&Xor, &mut buffer).unwrap();

        assert_eq!(len, 5);
        assert_eq!(buffer[0], FRAME_START);
        assert_eq!(buffer[1], 0); // kind
        assert_eq!(buffer[2], 0); // length
        assert_eq!(buffer[3], 0); // checksum (0 ^ 0)
        assert_eq!(buffer[4], FRAME_STOP);
    }

    #[test]
    fn test_frame_encode_publish_scenario() {
        let frame = Frame::new(MessageKind::Publish, &[0x10, 0x20, 0x30]).unwrap();
        let encoded = frame.encode_to_vec(&Xor).unwrap();

        assert_eq!(
            encoded.as_slice(),
            &[0xAA, 0x01, 0x03, 0x10, 0x20, 0x30, 0x02, 0xBC]
        );
    }

    #[test]
    fn test_wire_length_has_no_padding() {
        for len in 0..=MAX_PAYLOAD_SIZE {
            let payload = [0x5Au8; MAX_PAYLOAD_SIZE];
            let frame = Frame::new(MessageKind::Subscribe, &payload[..len]).unwrap();
            let encoded = frame.encode_to_vec(&Crc8::SMBUS).unwrap();
            assert_eq!(encoded.len(), FRAME_OVERHEAD + len);
            assert_eq!(encoded[encoded.len() - 1], FRAME_STOP);
        }
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let frame = Frame::new(MessageKind::Publish, &[1, 2, 3]).unwrap();
        let mut buffer = [0u8; 7];
        assert_eq!(frame.encode(&Xor, &mut buffer), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_payload_too_large() {
        let large_payload = [0u8; MAX_PAYLOAD_SIZE + 1];
        let result = Frame::new(MessageKind::Publish, &large_payload);
        assert_eq!(result, Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn test_checksum_uses_low_byte() {
        // Sum of bytes overflows a u8; only the low byte is transmitted.
        let sum = crate::checksum::FnChecksum::new(|data: &[u8]| {
            data.iter().map(|&b| b as u32).sum::<u32>()
        });
        let frame = Frame::new(0x7Fu8, &[0xFF, 0xFF]).unwrap();
        // 0x7F + 0x02 + 0xFF + 0xFF = 0x27F
        assert_eq!(frame.checksum(&sum), 0x7F);
    }

    #[test]
    fn test_unknown_kind_passes_through() {
        let frame = Frame::empty(0x42u8);
        assert_eq!(frame.kind, 0x42);
        assert_eq!(frame.message_kind(), None);
    }
}
