//! Message kinds carried in the KIND byte
//!
//! The built-in set is deliberately small. Frames store the raw kind byte, so
//! applications may use additional values; a [`KindFilter`](crate::KindFilter)
//! decides whether the receiver accepts them.

// Message kind IDs
pub const MSG_ACK: u8 = 0x00;
pub const MSG_PUBLISH: u8 = 0x01;
pub const MSG_SUBSCRIBE: u8 = 0x02;

/// Built-in message kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageKind {
    /// Acknowledgement
    Ack,
    /// Publish data to the peer
    Publish,
    /// Subscribe to a topic on the peer
    Subscribe,
}

impl MessageKind {
    /// All built-in kinds, in wire order
    pub const ALL: [MessageKind; 3] = [
        MessageKind::Ack,
        MessageKind::Publish,
        MessageKind::Subscribe,
    ];

    /// Convert to wire format byte
    pub const fn to_byte(self) -> u8 {
        match self {
            MessageKind::Ack => MSG_ACK,
            MessageKind::Publish => MSG_PUBLISH,
            MessageKind::Subscribe => MSG_SUBSCRIBE,
        }
    }

    /// Parse a kind from its wire format byte
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            MSG_ACK => Some(MessageKind::Ack),
            MSG_PUBLISH => Some(MessageKind::Publish),
            MSG_SUBSCRIBE => Some(MessageKind::Subscribe),
            _ => None,
        }
    }
}

impl From<MessageKind> for u8 {
    fn from(kind: MessageKind) -> u8 {
        kind.to_byte()
    }
}

impl TryFrom<u8> for MessageKind {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        MessageKind::from_byte(byte).ok_or(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_bytes() {
        assert_eq!(u8::from(MessageKind::Ack), 0);
        assert_eq!(u8::from(MessageKind::Publish), 1);
        assert_eq!(u8::from(MessageKind::Subscribe), 2);
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in MessageKind::ALL {
            assert_eq!(MessageKind::try_from(kind.to_byte()), Ok(kind));
        }
    }

    #[test]
    fn test_unknown_kind() {
        assert_eq!(MessageKind::try_from(0x03), Err(0x03));
        assert_eq!(MessageKind::from_byte(0xFF), None);
    }
}
