//! LightUp Hardware Abstraction Layer
//!
//! This crate defines the peripheral access traits the controller is
//! written against. Board support crates implement them; the core logic
//! never touches registers or device files directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (lightup-core, lightup-sim)│
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lightup-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ lightup-hal-  │
//!             │     sim       │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`PeripheralService`] - Enumerate and open GPIO pins by name
//! - [`DigitalLine`] - One open pin: direction, value, edge callbacks
//! - [`EdgeCallback`] - Receiver of edge notifications

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod peripheral;

// Re-export key items at crate root for convenience
pub use gpio::{CallbackAction, DigitalLine, Direction, Edge, EdgeCallback, GpioError};
pub use peripheral::{pin_name, PeripheralService, PinList, PinName, MAX_GPIO_PINS, MAX_PIN_NAME_LEN};
