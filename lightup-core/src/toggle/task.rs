//! Toggle task

use lightup_hal::DigitalLine;

use crate::error::ToggleError;

/// One queued LED toggle
///
/// Reads the output line and writes back its negation. Running it twice
/// toggles twice; nothing is coalesced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ToggleTask;

impl ToggleTask {
    /// Toggle `led`, returning the level it was driven to
    ///
    /// A missing line or an I/O failure is logged and returned; the task
    /// never panics.
    pub fn run<L: DigitalLine>(self, led: Option<&mut L>) -> Result<bool, ToggleError> {
        let Some(led) = led else {
            error!("The LED connection instance is absent");
            return Err(ToggleError::NullResource);
        };

        match led.toggle() {
            Ok(level) => {
                trace!("LED {} now {}", led.name(), level);
                Ok(level)
            }
            Err(e) => {
                error!("LED toggle error on {}: {}", led.name(), e);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightup_hal::{Direction, Edge, EdgeCallback, GpioError};

    /// Mock output line for testing
    struct MockLed {
        high: bool,
        fail_write: bool,
    }

    impl MockLed {
        fn new() -> Self {
            Self {
                high: false,
                fail_write: false,
            }
        }
    }

    impl DigitalLine for MockLed {
        fn name(&self) -> &str {
            "led"
        }
        fn set_direction(&mut self, _: Direction) -> Result<(), GpioError> {
            Ok(())
        }
        fn set_edge_trigger(&mut self, _: Edge) -> Result<(), GpioError> {
            Ok(())
        }
        fn value(&self) -> Result<bool, GpioError> {
            Ok(self.high)
        }
        fn set_value(&mut self, high: bool) -> Result<(), GpioError> {
            if self.fail_write {
                return Err(GpioError::Io);
            }
            self.high = high;
            Ok(())
        }
        fn register_callback(&mut self, _: &'static dyn EdgeCallback) -> Result<(), GpioError> {
            Ok(())
        }
        fn unregister_callback(&mut self) -> Result<(), GpioError> {
            Ok(())
        }
        fn close(&mut self) -> Result<(), GpioError> {
            Ok(())
        }
    }

    #[test]
    fn test_toggle_flips_level() {
        let mut led = MockLed::new();
        assert_eq!(ToggleTask.run(Some(&mut led)), Ok(true));
        assert_eq!(ToggleTask.run(Some(&mut led)), Ok(false));
        assert_eq!(ToggleTask.run(Some(&mut led)), Ok(true));
        assert!(led.high);
    }

    #[test]
    fn test_absent_line_is_noop() {
        assert_eq!(
            ToggleTask.run::<MockLed>(None),
            Err(ToggleError::NullResource)
        );
    }

    #[test]
    fn test_write_failure_leaves_level() {
        let mut led = MockLed::new();
        led.fail_write = true;
        assert_eq!(
            ToggleTask.run(Some(&mut led)),
            Err(ToggleError::Io(GpioError::Io))
        );
        assert!(!led.high);

        // Recovers once the line works again
        led.fail_write = false;
        assert_eq!(ToggleTask.run(Some(&mut led)), Ok(true));
    }
}
