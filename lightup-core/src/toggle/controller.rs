//! Edge-triggered toggle controller
//!
//! Owns the button and LED lines. The button's edge callback is the
//! [`ToggleQueue`]; the controller drains that queue on the main control
//! flow, so the LED line is only ever written from here.
//!
//! ```text
//!   edge context                 main control flow
//!   ────────────                 ─────────────────
//!   button edge ──► ToggleQueue ──► run_pending() / process_next()
//!                   (schedule)        └─► ToggleTask::run(led)
//! ```

use embassy_sync::blocking_mutex::raw::RawMutex;
use lightup_hal::{DigitalLine, Direction, PeripheralService};

use crate::config::LightUpConfig;
use crate::error::{StartupError, ToggleError};
use crate::pins::{PinManager, Release};
use crate::queue::ToggleQueue;
use crate::toggle::ToggleTask;

/// Toggle scheduling state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerState {
    /// No toggle pending
    Idle,
    /// At least one toggle queued and not yet run
    ToggleScheduled,
}

/// Where the controller is in its host-driven lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lifecycle {
    /// Constructed, `start()` not called yet
    Created,
    /// Lines open, callback registered
    Running,
    /// Torn down
    Stopped,
}

/// What a teardown did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TeardownReport {
    /// Pending toggles discarded
    pub cancelled: usize,
    /// Button line release outcome
    pub button: Release,
    /// LED line release outcome
    pub led: Release,
}

/// Button-to-LED toggle controller
///
/// The host calls [`start`](Self::start) once and [`stop`](Self::stop)
/// once, never concurrently. In between it keeps the queue drained with
/// [`run_pending`](Self::run_pending) or [`process_next`](Self::process_next).
pub struct ToggleController<S, M>
where
    S: PeripheralService,
    M: RawMutex + Sync + 'static,
{
    pins: PinManager<S>,
    config: LightUpConfig,
    queue: &'static ToggleQueue<M>,
    button: Option<S::Line>,
    led: Option<S::Line>,
    lifecycle: Lifecycle,
}

impl<S, M> ToggleController<S, M>
where
    S: PeripheralService,
    M: RawMutex + Sync + 'static,
{
    /// Create a controller for a board
    ///
    /// Fails fast if the board has no GPIO capability. No pin is opened
    /// until [`start`](Self::start).
    pub fn new(
        service: S,
        config: LightUpConfig,
        queue: &'static ToggleQueue<M>,
    ) -> Result<Self, StartupError> {
        let pins = PinManager::new(service)?;
        Ok(Self {
            pins,
            config,
            queue,
            button: None,
            led: None,
            lifecycle: Lifecycle::Created,
        })
    }

    /// Open both lines and start listening for button edges
    ///
    /// Any failure is fatal: lines opened so far are released again and
    /// the error is returned to the host.
    pub fn start(&mut self) -> Result<(), StartupError> {
        if self.lifecycle == Lifecycle::Running {
            return Err(StartupError::AlreadyStarted);
        }
        self.config.validate()?;
        info!(
            "Starting: button on {}, LED on {}",
            self.config.button.as_str(),
            self.config.led.as_str()
        );

        let opened = self.open_button().and_then(|()| self.open_led());
        if let Err(e) = opened {
            error!("Startup failed: {}", e);
            self.teardown();
            return Err(e);
        }

        self.lifecycle = Lifecycle::Running;
        Ok(())
    }

    /// Tear everything down
    ///
    /// Cancels pending toggles, unregisters the edge callback, closes the
    /// button line, then closes the LED line. Every step runs even if an
    /// earlier one failed. Calling it again only performs no-ops.
    pub fn stop(&mut self) -> TeardownReport {
        let report = self.teardown();
        self.lifecycle = Lifecycle::Stopped;
        info!("Stopped, {} pending toggles cancelled", report.cancelled);
        report
    }

    fn teardown(&mut self) -> TeardownReport {
        let mut cancelled = self.queue.cancel_all();

        if let Some(button) = self.button.as_mut() {
            if let Err(e) = button.unregister_callback() {
                warn!("Error unregistering callback on {}: {}", button.name(), e);
            }
        }
        // Edges that raced in before the callback was removed
        cancelled += self.queue.cancel_all();
        if cancelled > 0 {
            debug!("Cancelled {} pending toggles", cancelled);
        }

        let button = self.pins.close(&mut self.button);
        let led = self.pins.close(&mut self.led);

        TeardownReport {
            cancelled,
            button,
            led,
        }
    }

    fn open_button(&mut self) -> Result<(), StartupError> {
        let mut line = self.pins.open(&self.config.button, Direction::In)?;

        // Set up the trigger that marks the button as pressed
        let configured = line
            .set_edge_trigger(self.config.trigger)
            .and_then(|()| line.register_callback(self.queue));

        match configured {
            Ok(()) => {
                self.button = Some(line);
                Ok(())
            }
            Err(e) => {
                error!("Error configuring button on {}: {}", line.name(), e);
                self.pins.close(&mut Some(line));
                Err(e.into())
            }
        }
    }

    /// Open the LED line at its configured initial level
    ///
    /// Called by [`start`](Self::start). Can be called again after
    /// [`close_led`](Self::close_led) to attach a fresh line; toggles
    /// resume from the new line's initial level.
    pub fn open_led(&mut self) -> Result<(), StartupError> {
        let line = self
            .pins
            .open(&self.config.led, self.config.led_direction())?;
        self.led = Some(line);
        Ok(())
    }

    /// Close the LED line while leaving the button active
    ///
    /// Toggles that run afterwards are no-ops that report
    /// [`ToggleError::NullResource`].
    pub fn close_led(&mut self) -> Release {
        self.pins.close(&mut self.led)
    }

    /// Run one toggle against the LED line
    pub fn execute(&mut self, task: ToggleTask) -> Result<bool, ToggleError> {
        task.run(self.led.as_mut())
    }

    /// Run every queued toggle in order, returning how many ran
    ///
    /// Failed toggles count as run; they are logged by the task and do not
    /// stop the drain.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.queue.try_next() {
            let _ = self.execute(task);
            ran += 1;
        }
        ran
    }

    /// Wait for the next queued toggle and run it
    pub async fn process_next(&mut self) -> Result<bool, ToggleError> {
        let task = self.queue.next().await;
        self.execute(task)
    }

    /// Current scheduling state
    pub fn state(&self) -> ControllerState {
        if self.queue.is_empty() {
            ControllerState::Idle
        } else {
            ControllerState::ToggleScheduled
        }
    }

    /// Current lifecycle stage
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Current LED level, or None if the line is closed or unreadable
    pub fn led_value(&self) -> Option<bool> {
        self.led.as_ref().and_then(|led| led.value().ok())
    }

    /// Configuration in use
    pub fn config(&self) -> &LightUpConfig {
        &self.config
    }

    /// Pin manager holding the board
    pub fn pins(&self) -> &PinManager<S> {
        &self.pins
    }

    /// Queue the button feeds
    pub fn queue(&self) -> &'static ToggleQueue<M> {
        self.queue
    }
}

impl<S, M> Drop for ToggleController<S, M>
where
    S: PeripheralService,
    M: RawMutex + Sync + 'static,
{
    fn drop(&mut self) {
        if self.lifecycle == Lifecycle::Running {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigurationError;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use lightup_hal::{Edge, GpioError};
    use lightup_hal_sim::{Operation, SimBoard, SimPin};
    use proptest::prelude::*;

    type Queue = ToggleQueue<CriticalSectionRawMutex>;
    type Controller = ToggleController<SimBoard, CriticalSectionRawMutex>;

    fn queue() -> &'static Queue {
        Box::leak(Box::new(ToggleQueue::new()))
    }

    fn board() -> SimBoard {
        SimBoard::new(["IO12", "IO13", "IO14"])
    }

    /// Started controller plus handles to the button and LED pins
    fn started() -> (Controller, SimPin, SimPin) {
        let board = board();
        let button = board.pin("IO13").unwrap();
        let led = board.pin("IO12").unwrap();
        let mut controller =
            ToggleController::new(board, LightUpConfig::default(), queue()).unwrap();
        controller.start().unwrap();
        (controller, button, led)
    }

    #[test]
    fn test_start_configures_lines() {
        let (controller, button, led) = started();
        assert_eq!(controller.lifecycle(), Lifecycle::Running);
        assert_eq!(button.direction(), Direction::In);
        assert!(button.has_callback());
        assert_eq!(led.direction(), Direction::OutInitiallyLow);
        assert!(!led.level());
        assert_eq!(controller.led_value(), Some(false));
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[test]
    fn test_press_sequence() {
        let (mut controller, button, led) = started();

        button.click().unwrap();
        assert_eq!(controller.state(), ControllerState::ToggleScheduled);
        // The edge only enqueues; the LED is untouched until the drain
        assert!(!led.level());
        assert_eq!(controller.run_pending(), 1);
        assert_eq!(controller.state(), ControllerState::Idle);
        assert!(led.level());

        button.click().unwrap();
        controller.run_pending();
        assert!(!led.level());

        button.click().unwrap();
        controller.run_pending();
        assert!(led.level());
    }

    #[test]
    fn test_release_does_not_toggle() {
        let (mut controller, button, led) = started();
        button.press().unwrap();
        button.release().unwrap();
        button.release().unwrap();
        assert_eq!(controller.run_pending(), 1);
        assert!(led.level());
    }

    #[test]
    fn test_no_gpio_fails_fast() {
        let result = Controller::new(SimBoard::without_gpio(), LightUpConfig::default(), queue());
        assert!(matches!(
            result,
            Err(StartupError::Configuration(ConfigurationError::NoGpio))
        ));
    }

    #[test]
    fn test_non_gpio_pin_fails_startup() {
        let board = board();
        let config = LightUpConfig::new("IO99", "IO12").unwrap();
        let mut controller = ToggleController::new(board.clone(), config, queue()).unwrap();

        assert_eq!(
            controller.start(),
            Err(StartupError::Configuration(ConfigurationError::NotGpioCapable))
        );
        assert_eq!(board.claimed_count(), 0);
        assert_eq!(controller.pins().open_count(), 0);
    }

    #[test]
    fn test_led_open_failure_rolls_back_button() {
        let board = board();
        let button = board.pin("IO13").unwrap();
        board
            .pin("IO12")
            .unwrap()
            .inject(Operation::Open, GpioError::PermissionDenied);

        let mut controller =
            ToggleController::new(board.clone(), LightUpConfig::default(), queue()).unwrap();
        assert_eq!(
            controller.start(),
            Err(StartupError::Io(GpioError::PermissionDenied))
        );

        // No partially configured pin set survives
        assert!(!button.is_claimed());
        assert!(!button.has_callback());
        assert_eq!(board.claimed_count(), 0);
        assert_eq!(controller.lifecycle(), Lifecycle::Created);
    }

    #[test]
    fn test_button_configure_failure() {
        let board = board();
        let button = board.pin("IO13").unwrap();
        button.inject(Operation::Configure, GpioError::Io);

        let mut controller =
            ToggleController::new(board.clone(), LightUpConfig::default(), queue()).unwrap();
        assert_eq!(controller.start(), Err(StartupError::Io(GpioError::Io)));
        assert_eq!(board.claimed_count(), 0);
    }

    #[test]
    fn test_same_pin_for_both_lines() {
        let board = board();
        let config = LightUpConfig::new("IO12", "IO12").unwrap();
        let mut controller = ToggleController::new(board.clone(), config, queue()).unwrap();

        assert_eq!(
            controller.start(),
            Err(StartupError::Io(GpioError::AlreadyClaimed))
        );
        assert_eq!(board.claimed_count(), 0);
    }

    #[test]
    fn test_many_edges_before_drain() {
        let (mut controller, button, led) = started();
        for _ in 0..17 {
            button.click().unwrap();
        }
        assert_eq!(controller.queue().pending(), 17);
        assert_eq!(controller.run_pending(), 17);
        // Odd count from low ends high
        assert!(led.level());
    }

    #[test]
    fn test_no_trigger_rejected() {
        let board = board();
        let config = LightUpConfig {
            trigger: Edge::None,
            ..Default::default()
        };
        let mut controller = ToggleController::new(board.clone(), config, queue()).unwrap();

        assert_eq!(
            controller.start(),
            Err(StartupError::Configuration(ConfigurationError::NoEdgeTrigger))
        );
        assert_eq!(board.claimed_count(), 0);
        assert_eq!(controller.lifecycle(), Lifecycle::Created);
    }

    #[test]
    fn test_start_twice() {
        let (mut controller, _button, _led) = started();
        assert_eq!(controller.start(), Err(StartupError::AlreadyStarted));
        assert_eq!(controller.lifecycle(), Lifecycle::Running);
    }

    #[test]
    fn test_toggle_without_led_then_reopen() {
        let (mut controller, button, led) = started();
        assert_eq!(controller.close_led(), Release::Closed);
        assert!(!led.is_claimed());

        button.click().unwrap();
        assert_eq!(controller.run_pending(), 1);
        assert_eq!(controller.led_value(), None);

        // Direct execution reports the missing line
        assert_eq!(
            controller.execute(ToggleTask),
            Err(ToggleError::NullResource)
        );

        controller.open_led().unwrap();
        assert_eq!(controller.led_value(), Some(false));

        button.click().unwrap();
        controller.run_pending();
        assert_eq!(controller.led_value(), Some(true));
    }

    #[test]
    fn test_toggle_io_error_keeps_draining() {
        let (mut controller, button, led) = started();
        led.inject(Operation::Write, GpioError::Io);

        button.click().unwrap();
        button.click().unwrap();
        assert_eq!(controller.run_pending(), 2);
        assert!(!led.level());

        led.clear(Operation::Write);
        button.click().unwrap();
        controller.run_pending();
        assert!(led.level());
    }

    #[test]
    fn test_stop_order_and_release() {
        let (mut controller, button, led) = started();
        button.click().unwrap();
        button.click().unwrap();

        let report = controller.stop();
        assert_eq!(report.cancelled, 2);
        assert_eq!(report.button, Release::Closed);
        assert_eq!(report.led, Release::Closed);

        assert!(!button.has_callback());
        assert!(!button.is_claimed());
        assert!(!led.is_claimed());
        assert_eq!(controller.lifecycle(), Lifecycle::Stopped);

        // Edges after teardown go nowhere
        assert_eq!(button.click(), Ok(false));
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut controller, _button, _led) = started();
        controller.stop();

        let second = controller.stop();
        assert_eq!(
            second,
            TeardownReport {
                cancelled: 0,
                button: Release::NotOpen,
                led: Release::NotOpen,
            }
        );
    }

    #[test]
    fn test_stop_before_start() {
        let mut controller = Controller::new(board(), LightUpConfig::default(), queue()).unwrap();
        let report = controller.stop();
        assert_eq!(report.button, Release::NotOpen);
        assert_eq!(report.led, Release::NotOpen);
    }

    #[test]
    fn test_close_failure_does_not_block_led_close() {
        let (mut controller, button, led) = started();
        button.inject(Operation::Close, GpioError::Io);

        let report = controller.stop();
        assert_eq!(report.button, Release::Failed(GpioError::Io));
        assert_eq!(report.led, Release::Closed);
        assert!(!led.is_claimed());
        // The failed line was dropped, which frees the pin
        assert!(!button.is_claimed());
    }

    #[test]
    fn test_drop_while_running_releases_pins() {
        let board = board();
        let mut controller =
            ToggleController::new(board.clone(), LightUpConfig::default(), queue()).unwrap();
        controller.start().unwrap();
        assert_eq!(board.claimed_count(), 2);

        drop(controller);
        assert_eq!(board.claimed_count(), 0);
    }

    #[test]
    fn test_restart_after_stop() {
        let (mut controller, button, led) = started();
        controller.stop();
        controller.start().unwrap();

        button.click().unwrap();
        controller.run_pending();
        assert!(led.level());
    }

    #[test]
    fn test_process_next() {
        let (mut controller, button, led) = started();
        button.click().unwrap();
        button.click().unwrap();

        let first = embassy_futures::block_on(controller.process_next());
        assert_eq!(first, Ok(true));
        assert_eq!(controller.state(), ControllerState::ToggleScheduled);

        let second = embassy_futures::block_on(controller.process_next());
        assert_eq!(second, Ok(false));
        assert!(!led.level());
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[test]
    fn test_edges_from_interrupt_thread() {
        let (mut controller, button, led) = started();

        let presser = std::thread::spawn(move || {
            for _ in 0..7 {
                button.click().unwrap();
            }
        });

        // Drain concurrently with the producer, then once more after it ends
        let mut ran = 0;
        while !presser.is_finished() {
            ran += controller.run_pending();
        }
        presser.join().unwrap();
        ran += controller.run_pending();

        assert_eq!(ran, 7);
        assert!(led.level());
    }

    #[test]
    fn test_initially_high_led() {
        let board = board();
        let led = board.pin("IO12").unwrap();
        let button = board.pin("IO13").unwrap();
        let config = LightUpConfig {
            led_initially_high: true,
            ..Default::default()
        };
        let mut controller = ToggleController::new(board, config, queue()).unwrap();
        controller.start().unwrap();
        assert!(led.level());

        button.click().unwrap();
        controller.run_pending();
        assert!(!led.level());
    }

    proptest! {
        #[test]
        fn prop_led_parity(edges in 0usize..256, initially_high in any::<bool>()) {
            let board = board();
            let led = board.pin("IO12").unwrap();
            let button = board.pin("IO13").unwrap();
            let config = LightUpConfig { led_initially_high: initially_high, ..Default::default() };
            let mut controller = ToggleController::new(board, config, queue()).unwrap();
            controller.start().unwrap();

            for _ in 0..edges {
                button.click().unwrap();
            }
            prop_assert_eq!(controller.run_pending(), edges);
            prop_assert_eq!(led.level(), initially_high ^ (edges % 2 == 1));
        }

        #[test]
        fn prop_led_parity_in_bursts(bursts in prop::collection::vec(0usize..64, 0..8)) {
            let (mut controller, button, led) = started();
            let mut total = 0;

            for burst in bursts {
                for _ in 0..burst {
                    button.click().unwrap();
                }
                total += controller.run_pending();
            }
            prop_assert_eq!(led.level(), total % 2 == 1);
        }
    }
}
