//! Zetta host binding
//!
//! Drives a [`zetta_protocol::Zetta`] link from a desktop or server process:
//!
//! - [`ZettaHost`] owns the serial port, pumps received bytes through the
//!   protocol handle and queues validated frames as [`Packet`]s
//! - [`IoUart`] adapts any `std::io::Read + Write` serial handle
//! - [`HostConfig`] is loaded from TOML
//!
//! Payloads can be raw bytes, UTF-8 text or postcard-encoded values:
//!
//! ```
//! use zetta_host::{HostConfig, IoUart, ZettaHost};
//! use zetta_protocol::MessageKind;
//!
//! let mut host = ZettaHost::new(IoUart::new(std::io::Cursor::new(Vec::new())), &HostConfig::default());
//! host.send(MessageKind::Publish, &(1u8, 250u16)).unwrap();
//!
//! let written = host.uart().get_ref().get_ref();
//! assert_eq!(written[0], zetta_protocol::FRAME_START);
//! assert_eq!(*written.last().unwrap(), zetta_protocol::FRAME_STOP);
//! ```

pub mod config;
pub mod error;
pub mod host;
pub mod io;
pub mod packet;

pub use config::{ChecksumKind, HostConfig};
pub use error::{HostError, Result};
pub use host::{HostKinds, HostLink, HostStats, TraceFaults, ZettaHost};
pub use io::IoUart;
pub use packet::Packet;
