//! Zetta Hardware Abstraction Layer
//!
//! This crate defines the small set of hardware traits a Zetta link needs and
//! adapts them to the hooks of [`zetta_protocol::Zetta`]:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application / zetta-host               │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  zetta-protocol (Zetta handle)          │
//! └─────────────────────────────────────────┘
//!          │ Transport          │ FaultHook
//!          ▼                    ▼
//! ┌─────────────────┐   ┌─────────────────┐
//! │ UartTransport   │   │ FaultIndicator  │
//! │  (UartTx/Rx)    │   │  (OutputPin)    │
//! └─────────────────┘   └─────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`gpio::OutputPin`] - Diagnostic indicator output

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod indicator;
pub mod transport;
pub mod uart;

// Re-export key items at crate root for convenience
pub use gpio::OutputPin;
pub use indicator::FaultIndicator;
pub use transport::UartTransport;
pub use uart::{Uart, UartConfig, UartRx, UartTx};
