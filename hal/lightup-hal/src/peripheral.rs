//! Peripheral access service
//!
//! Boards enumerate their GPIO-capable pins by name and hand out
//! [`DigitalLine`]s for them.

use heapless::{String, Vec};

use crate::gpio::{DigitalLine, GpioError};

/// Longest board pin name ("IO13", "GPIO27", "PA0", ...)
pub const MAX_PIN_NAME_LEN: usize = 16;

/// Most GPIO pins a board may report
pub const MAX_GPIO_PINS: usize = 32;

/// Board-specific pin identifier
pub type PinName = String<MAX_PIN_NAME_LEN>;

/// Set of GPIO-capable pins reported by a board
pub type PinList = Vec<PinName, MAX_GPIO_PINS>;

/// Build a [`PinName`], or None if `name` is too long
pub fn pin_name(name: &str) -> Option<PinName> {
    let mut s = PinName::new();
    s.push_str(name).ok()?;
    Some(s)
}

/// Access to the board's GPIO peripherals
pub trait PeripheralService {
    /// Line type handed out by this board
    type Line: DigitalLine;

    /// Names of all GPIO-capable pins on the board
    fn gpio_list(&self) -> PinList;

    /// Open a pin by name
    ///
    /// The returned line is unconfigured; callers set direction and edge
    /// trigger themselves.
    fn open_gpio(&mut self, name: &str) -> Result<Self::Line, GpioError>;
}
