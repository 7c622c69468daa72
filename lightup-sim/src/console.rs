//! Interactive console
//!
//! A reader thread turns stdin lines into button transitions. Pin changes
//! are made right on the reader thread, so the edge callback fires there
//! the way an interrupt would; everything else goes to the main loop.

use std::io::{self, BufRead};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use lightup_hal_sim::SimPin;

/// Console command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Press and release the button
    Click,
    /// Press and hold
    Down,
    /// Release only
    Release,
    /// Print controller status
    Status,
    /// Shut down
    Quit,
}

impl Command {
    /// Parse one input line; unknown input yields None
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "p" | "P" => Some(Command::Click),
            "d" | "D" => Some(Command::Down),
            "r" | "R" => Some(Command::Release),
            "s" | "S" => Some(Command::Status),
            "q" | "Q" => Some(Command::Quit),
            _ => None,
        }
    }
}

pub const HELP: &str = "\
=== LightUp ===
Controls:
  p - Press and release the button
  d - Hold the button down
  r - Release the button
  s - Status
  q - Quit";

/// Spawn the stdin reader
///
/// Status and quit requests go to `tx`. End of input counts as quit.
pub fn spawn(button: SimPin, tx: Sender<Command>) -> JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let Some(command) = Command::parse(&line) else {
                if !line.trim().is_empty() {
                    println!("Unknown command {:?}", line.trim());
                }
                continue;
            };

            let driven = match command {
                Command::Click => button.click(),
                Command::Down => button.press(),
                Command::Release => button.release(),
                Command::Status | Command::Quit => {
                    if tx.send(command).is_err() || command == Command::Quit {
                        return;
                    }
                    continue;
                }
            };
            if let Err(e) = driven {
                log::warn!("Cannot drive button: {}", e);
            }
        }
        let _ = tx.send(Command::Quit);
    })
}
