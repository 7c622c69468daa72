//! Error taxonomy
//!
//! Startup errors are fatal and go back to whoever called `start()`.
//! Toggle errors are recoverable: they are logged and the queue keeps
//! draining.

use core::fmt;

use lightup_hal::GpioError;

/// Board or pin configuration problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigurationError {
    /// Board reports no GPIO-capable pins
    NoGpio,
    /// Requested pin is not in the board's GPIO list
    NotGpioCapable,
    /// Pin name does not fit a [`lightup_hal::PinName`]
    InvalidPinName,
    /// Button trigger is `Edge::None`, so no press would ever register
    NoEdgeTrigger,
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::NoGpio => write!(f, "board does not support GPIO connections"),
            ConfigurationError::NotGpioCapable => write!(f, "pin is not GPIO-capable"),
            ConfigurationError::InvalidPinName => write!(f, "invalid pin name"),
            ConfigurationError::NoEdgeTrigger => write!(f, "button has no edge trigger"),
        }
    }
}

/// Fatal error while bringing the controller up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartupError {
    /// Board or pin configuration is unusable
    Configuration(ConfigurationError),
    /// Opening or configuring a pin failed
    Io(GpioError),
    /// `start()` called while already running
    AlreadyStarted,
}

impl From<ConfigurationError> for StartupError {
    fn from(e: ConfigurationError) -> Self {
        StartupError::Configuration(e)
    }
}

impl From<GpioError> for StartupError {
    fn from(e: GpioError) -> Self {
        StartupError::Io(e)
    }
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::Configuration(e) => write!(f, "configuration error: {}", e),
            StartupError::Io(e) => write!(f, "I/O error: {}", e),
            StartupError::AlreadyStarted => write!(f, "controller already started"),
        }
    }
}

/// Recoverable failure of a single toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ToggleError {
    /// No output line is open
    NullResource,
    /// Reading or writing the output line failed
    Io(GpioError),
}

impl From<GpioError> for ToggleError {
    fn from(e: GpioError) -> Self {
        ToggleError::Io(e)
    }
}

impl fmt::Display for ToggleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToggleError::NullResource => write!(f, "output line is not open"),
            ToggleError::Io(e) => write!(f, "output line I/O error: {}", e),
        }
    }
}
