//! Pin manager
//!
//! Acquires named lines from a [`PeripheralService`], configures their
//! direction and releases them again. Tracks which pins are open so a pin
//! is never handed out twice.

use heapless::Vec;
use lightup_hal::{pin_name, DigitalLine, Direction, GpioError, PeripheralService, PinList, PinName};

use crate::error::{ConfigurationError, StartupError};

/// Maximum lines open at once
pub const MAX_OPEN_LINES: usize = 4;

/// Outcome of releasing a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Release {
    /// Line closed cleanly
    Closed,
    /// Nothing to close; slot was empty
    NotOpen,
    /// Platform reported an error while closing; the claim is dropped anyway
    Failed(GpioError),
}

/// Owner of the board's peripheral service and the set of open pins
pub struct PinManager<S: PeripheralService> {
    service: S,
    gpio: PinList,
    open: Vec<PinName, MAX_OPEN_LINES>,
}

impl<S: PeripheralService> PinManager<S> {
    /// Take over a board's peripheral service
    ///
    /// Fails fast if the board reports no GPIO-capable pins.
    pub fn new(service: S) -> Result<Self, ConfigurationError> {
        let gpio = service.gpio_list();
        if gpio.is_empty() {
            error!("Board does not support GPIO connections");
            return Err(ConfigurationError::NoGpio);
        }
        debug!("Board reports {} GPIO pins", gpio.len());

        Ok(Self {
            service,
            gpio,
            open: Vec::new(),
        })
    }

    /// Check if the board lists `name` as GPIO-capable
    pub fn is_gpio_capable(&self, name: &str) -> bool {
        self.gpio.iter().any(|p| p.as_str() == name)
    }

    /// Check if a line for `name` is currently open
    pub fn is_open(&self, name: &str) -> bool {
        self.open.iter().any(|p| p.as_str() == name)
    }

    /// Number of lines currently open
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Underlying peripheral service
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Open `name` and configure it for `direction`
    ///
    /// Outputs start at the level `direction` names. If configuration fails
    /// the freshly opened line is closed again before the error is returned,
    /// so a failed open never leaves a pin claimed.
    pub fn open(&mut self, name: &str, direction: Direction) -> Result<S::Line, StartupError> {
        if !self.is_gpio_capable(name) {
            error!("Pin {} is not GPIO-capable on this board", name);
            return Err(ConfigurationError::NotGpioCapable.into());
        }
        if self.is_open(name) {
            error!("Pin {} is already open", name);
            return Err(GpioError::AlreadyClaimed.into());
        }
        if self.open.is_full() {
            error!("Cannot open {}: {} lines already open", name, MAX_OPEN_LINES);
            return Err(GpioError::Unavailable.into());
        }
        let key = pin_name(name).ok_or(ConfigurationError::InvalidPinName)?;

        let mut line = self.service.open_gpio(name).map_err(|e| {
            error!("Error opening GPIO port {}: {}", name, e);
            e
        })?;

        if let Err(e) = line.set_direction(direction) {
            error!("Error configuring GPIO port {}: {}", name, e);
            if let Err(close_err) = line.close() {
                warn!("Error closing GPIO port {} after failed setup: {}", name, close_err);
            }
            return Err(e.into());
        }

        // Capacity was checked above
        let _ = self.open.push(key);
        info!("Opened GPIO port {} as {:?}", name, direction);
        Ok(line)
    }

    /// Close the line held in `slot`, leaving the slot empty
    ///
    /// An empty slot is a warned no-op. A failing close is logged and
    /// reported but never fatal.
    pub fn close(&mut self, slot: &mut Option<S::Line>) -> Release {
        let Some(mut line) = slot.take() else {
            warn!("Close requested for a line that is not open");
            return Release::NotOpen;
        };

        if let Some(i) = self.open.iter().position(|p| p.as_str() == line.name()) {
            self.open.swap_remove(i);
        }

        match line.close() {
            Ok(()) => {
                debug!("Closed GPIO port {}", line.name());
                Release::Closed
            }
            Err(e) => {
                warn!("Error occurred while closing GPIO port {}: {}", line.name(), e);
                Release::Failed(e)
            }
        }
    }
}
