//! LightUp - button/LED toggle on a simulated board
//!
//! Host runner for the toggle controller. Plays the part of the host
//! framework: loads the board file, starts the controller, feeds console
//! key presses in as button edges and keeps the toggle queue drained until
//! asked to quit, then tears everything down.
//!
//! Usage: `lightup-sim [path/to/lightup.toml]`

use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use lightup_core::{StartupError, ToggleController, ToggleQueue};

use crate::config::{load_config, ConfigError};
use crate::console::Command;

mod config;
mod console;

/// Default board file, relative to the working directory
const DEFAULT_CONFIG_PATH: &str = "lightup.toml";

/// How often the main loop drains the queue when idle
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Toggle requests from the button's edge callback
static TOGGLE_QUEUE: ToggleQueue<CriticalSectionRawMutex> = ToggleQueue::new();

#[derive(Debug)]
enum AppError {
    Config(ConfigError),
    Startup(StartupError),
    NoButtonPin,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(e) => write!(f, "{}", e),
            AppError::Startup(e) => write!(f, "startup failed: {}", e),
            AppError::NoButtonPin => write!(f, "button pin is not on the board"),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}

impl From<StartupError> for AppError {
    fn from(e: StartupError) -> Self {
        AppError::Startup(e)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    log::info!("LightUp starting...");

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = load_config(&path)?;

    let board = config.board.build();
    let mut controller = ToggleController::new(board.clone(), config.app, &TOGGLE_QUEUE)?;
    controller.start()?;

    let button = board
        .pin(&controller.config().button)
        .ok_or(AppError::NoButtonPin)?;

    println!("{}", console::HELP);
    let (tx, rx) = mpsc::channel();
    // Detached: it may be blocked on stdin when we quit
    let _reader = console::spawn(button.clone(), tx);

    loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(Command::Status) => {
                controller.run_pending();
                print_status(&controller, button.level());
            }
            Ok(Command::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Ok(_) | Err(RecvTimeoutError::Timeout) => {}
        }

        let ran = controller.run_pending();
        if ran > 0 {
            log::debug!("Ran {} toggles", ran);
            if let Some(level) = controller.led_value() {
                println!("LED {}", if level { "ON" } else { "OFF" });
            }
        }
    }

    let report = controller.stop();
    log::info!(
        "Shut down: {} toggles cancelled, button {:?}, LED {:?}",
        report.cancelled,
        report.button,
        report.led
    );
    Ok(())
}

fn print_status(
    controller: &ToggleController<lightup_hal_sim::SimBoard, CriticalSectionRawMutex>,
    button_level: bool,
) {
    let led = match controller.led_value() {
        Some(true) => "ON",
        Some(false) => "OFF",
        None => "closed",
    };
    println!(
        "LED {} | button {} | {:?} | {:?} | {} pending",
        led,
        if button_level { "up" } else { "down" },
        controller.lifecycle(),
        controller.state(),
        controller.queue().pending()
    );
}
