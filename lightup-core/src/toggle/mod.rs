//! Edge-triggered LED toggling
//!
//! Button edges enqueue [`ToggleTask`]s; the [`ToggleController`] runs
//! them against the LED line on the main control flow.

pub mod controller;
pub mod task;

pub use controller::{ControllerState, Lifecycle, TeardownReport, ToggleController};
pub use task::ToggleTask;
