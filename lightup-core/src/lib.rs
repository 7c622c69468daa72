//! Board-agnostic core logic for LightUp
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Pin manager (acquire, configure and release named GPIO lines)
//! - Toggle queue fed from the button's edge callback
//! - Toggle controller with startup and teardown lifecycle
//! - Configuration and error types
//!
//! Logging goes through `defmt` or `log` depending on the enabled feature,
//! and compiles away when neither is enabled.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to every module
mod fmt;

pub mod config;
pub mod error;
pub mod pins;
pub mod queue;
pub mod toggle;

pub use config::LightUpConfig;
pub use error::{ConfigurationError, StartupError, ToggleError};
pub use pins::{PinManager, Release};
pub use queue::ToggleQueue;
pub use toggle::{ControllerState, Lifecycle, TeardownReport, ToggleController, ToggleTask};
