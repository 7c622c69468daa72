//! GPIO line abstractions
//!
//! A [`DigitalLine`] is one named pin handed out by a
//! [`PeripheralService`](crate::PeripheralService). The holder owns it
//! exclusively and must close it exactly once.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Electrical direction of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Digital input
    In,
    /// Output, driven low as soon as the direction is applied
    OutInitiallyLow,
    /// Output, driven high as soon as the direction is applied
    OutInitiallyHigh,
}

impl Direction {
    /// Output direction with the given initial level
    pub const fn output(initially_high: bool) -> Self {
        if initially_high {
            Direction::OutInitiallyHigh
        } else {
            Direction::OutInitiallyLow
        }
    }

    /// Check if this is one of the output directions
    pub fn is_output(&self) -> bool {
        !matches!(self, Direction::In)
    }

    /// Level an output starts at, or None for inputs
    pub fn initial_value(&self) -> Option<bool> {
        match self {
            Direction::In => None,
            Direction::OutInitiallyLow => Some(false),
            Direction::OutInitiallyHigh => Some(true),
        }
    }
}

/// Transition on an input line that fires the registered callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Edge {
    /// No edge detection
    #[default]
    None,
    /// Low to high
    Rising,
    /// High to low (button pressed on a pulled-up input)
    Falling,
    /// Either transition
    Both,
}

impl Edge {
    /// Check whether a level change `from` -> `to` fires this trigger
    pub fn matches(&self, from: bool, to: bool) -> bool {
        match (self, from, to) {
            (Edge::Rising | Edge::Both, false, true) => true,
            (Edge::Falling | Edge::Both, true, false) => true,
            _ => false,
        }
    }
}

/// What an edge callback wants to happen after it ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CallbackAction {
    /// Keep delivering edges
    Continue,
    /// Stop delivering edges to this callback
    Unregister,
}

/// Receiver of edge notifications
///
/// Invoked from whatever context services the pin's interrupt or event
/// source. Implementations must not block and must not touch other lines.
pub trait EdgeCallback: Sync {
    /// Handle one edge on the line this callback is registered with
    fn on_edge(&self) -> CallbackAction;
}

/// GPIO operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioError {
    /// Pin does not exist or cannot be used right now
    Unavailable,
    /// Access refused by the platform
    PermissionDenied,
    /// Pin is already held by another line
    AlreadyClaimed,
    /// Line was closed
    Closed,
    /// Operation not valid for the line's direction
    WrongDirection,
    /// Driver or bus failure
    Io,
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpioError::Unavailable => write!(f, "pin unavailable"),
            GpioError::PermissionDenied => write!(f, "permission denied"),
            GpioError::AlreadyClaimed => write!(f, "pin already claimed"),
            GpioError::Closed => write!(f, "line closed"),
            GpioError::WrongDirection => write!(f, "wrong direction for operation"),
            GpioError::Io => write!(f, "I/O error"),
        }
    }
}

/// One open GPIO line
///
/// Implementations handle the platform side (registers, character device,
/// simulation). Every operation may fail with a [`GpioError`]; after
/// [`close`](DigitalLine::close) succeeds all other operations return
/// [`GpioError::Closed`].
pub trait DigitalLine {
    /// Board-specific pin name this line was opened with
    fn name(&self) -> &str;

    /// Configure direction; outputs are driven to their initial level
    fn set_direction(&mut self, direction: Direction) -> Result<(), GpioError>;

    /// Configure which transition fires the registered callback
    fn set_edge_trigger(&mut self, edge: Edge) -> Result<(), GpioError>;

    /// Read the logical value (input level, or the driven level for outputs)
    fn value(&self) -> Result<bool, GpioError>;

    /// Drive an output line
    fn set_value(&mut self, high: bool) -> Result<(), GpioError>;

    /// Invert an output line, returning the new level
    fn toggle(&mut self) -> Result<bool, GpioError> {
        let next = !self.value()?;
        self.set_value(next)?;
        Ok(next)
    }

    /// Attach the edge callback, replacing any previous one
    fn register_callback(&mut self, callback: &'static dyn EdgeCallback) -> Result<(), GpioError>;

    /// Detach the edge callback; no-op if none is attached
    fn unregister_callback(&mut self) -> Result<(), GpioError>;

    /// Release the underlying pin
    fn close(&mut self) -> Result<(), GpioError>;
}
