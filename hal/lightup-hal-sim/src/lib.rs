//! Simulated board for the LightUp controller
//!
//! Implements the `lightup-hal` traits on the host so the controller can
//! run without hardware:
//!
//! - Named GPIO pins with exclusive claims
//! - Output levels and input levels driven from any thread
//! - Edge detection that invokes the registered callback on the driving
//!   thread, like an interrupt arriving on its own context
//! - Fault injection for open, configure, read, write and close
//!
//! # Usage
//!
//! ```ignore
//! let board = SimBoard::new(["IO12", "IO13"]);
//! let button = board.pin("IO13").unwrap();
//! // hand `board.clone()` to the controller, then:
//! button.click()?;
//! ```

mod board;
mod line;

pub use board::{Operation, SimBoard, SimPin};
pub use line::SimLine;
