//! Controller configuration
//!
//! Names the two pins and how they are driven. Defaults match the
//! reference wiring: LED on `IO12`, push-button on `IO13`.

use lightup_hal::{pin_name, Direction, Edge, PinName};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Default push-button pin
pub const DEFAULT_BUTTON_PIN: &str = "IO13";

/// Default LED pin
pub const DEFAULT_LED_PIN: &str = "IO12";

/// Pin assignment and drive settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LightUpConfig {
    /// Input pin the push-button is wired to
    pub button: PinName,
    /// Output pin driving the LED
    pub led: PinName,
    /// Button transition that counts as a press
    pub trigger: Edge,
    /// LED level right after startup
    pub led_initially_high: bool,
}

impl Default for LightUpConfig {
    fn default() -> Self {
        Self {
            button: pin_name(DEFAULT_BUTTON_PIN).unwrap_or_default(),
            led: pin_name(DEFAULT_LED_PIN).unwrap_or_default(),
            trigger: Edge::Falling,
            led_initially_high: false,
        }
    }
}

impl LightUpConfig {
    /// Create a config for the given pins with default drive settings
    pub fn new(button: &str, led: &str) -> Result<Self, ConfigurationError> {
        Ok(Self {
            button: pin_name(button).ok_or(ConfigurationError::InvalidPinName)?,
            led: pin_name(led).ok_or(ConfigurationError::InvalidPinName)?,
            ..Default::default()
        })
    }

    /// Check the settings can drive a working controller
    ///
    /// Pin names are checked against the board when the lines open.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.trigger == Edge::None {
            return Err(ConfigurationError::NoEdgeTrigger);
        }
        Ok(())
    }

    /// Direction the LED line is opened with
    pub fn led_direction(&self) -> Direction {
        Direction::output(self.led_initially_high)
    }
}
