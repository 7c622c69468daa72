//! Simulated board
//!
//! Holds the electrical state of every named pin behind a shared lock so
//! that the line owner (the controller) and the outside world (a test, a
//! console thread) can both reach it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lightup_hal::{
    pin_name, CallbackAction, Direction, Edge, EdgeCallback, GpioError, PeripheralService,
    PinList, PinName,
};

use crate::line::SimLine;

/// Operation a fault can be injected into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operation {
    /// `open_gpio`
    Open,
    /// `set_direction`, `set_edge_trigger`, callback (un)registration
    Configure,
    /// `value`
    Read,
    /// `set_value`
    Write,
    /// `close`
    Close,
}

/// Injected failures for one pin
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Faults {
    open: Option<GpioError>,
    configure: Option<GpioError>,
    read: Option<GpioError>,
    write: Option<GpioError>,
    close: Option<GpioError>,
}

impl Faults {
    pub(crate) fn get(&self, op: Operation) -> Option<GpioError> {
        match op {
            Operation::Open => self.open,
            Operation::Configure => self.configure,
            Operation::Read => self.read,
            Operation::Write => self.write,
            Operation::Close => self.close,
        }
    }

    fn set(&mut self, op: Operation, error: Option<GpioError>) {
        let slot = match op {
            Operation::Open => &mut self.open,
            Operation::Configure => &mut self.configure,
            Operation::Read => &mut self.read,
            Operation::Write => &mut self.write,
            Operation::Close => &mut self.close,
        };
        *slot = error;
    }
}

/// Electrical and ownership state of one pin
pub(crate) struct PinState {
    pub(crate) name: PinName,
    pub(crate) claimed: bool,
    pub(crate) direction: Direction,
    /// Current logical level; inputs idle high (pulled up)
    pub(crate) level: bool,
    pub(crate) edge: Edge,
    pub(crate) callback: Option<&'static dyn EdgeCallback>,
    pub(crate) faults: Faults,
    pub(crate) edges_fired: u32,
}

impl PinState {
    fn new(name: PinName) -> Self {
        Self {
            name,
            claimed: false,
            direction: Direction::In,
            level: true,
            edge: Edge::None,
            callback: None,
            faults: Faults::default(),
            edges_fired: 0,
        }
    }

    pub(crate) fn check(&self, op: Operation) -> Result<(), GpioError> {
        match self.faults.get(op) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Drop everything a line configured on this pin
    pub(crate) fn release(&mut self) {
        self.claimed = false;
        self.edge = Edge::None;
        self.callback = None;
    }
}

pub(crate) struct BoardState {
    pub(crate) pins: Vec<PinState>,
}

pub(crate) type Shared = Arc<Mutex<BoardState>>;

/// Lock the board, recovering from a panicked holder
pub(crate) fn lock(shared: &Shared) -> MutexGuard<'_, BoardState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A board with a fixed set of named GPIO pins
///
/// Cloning is cheap and every clone refers to the same pins, so one clone
/// can be handed to the controller while another drives the button.
#[derive(Clone)]
pub struct SimBoard {
    shared: Shared,
}

impl SimBoard {
    /// Create a board exposing the given GPIO-capable pins
    ///
    /// Names longer than [`lightup_hal::MAX_PIN_NAME_LEN`] and entries past
    /// [`lightup_hal::MAX_GPIO_PINS`] are ignored.
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let pins = names
            .into_iter()
            .filter_map(pin_name)
            .take(lightup_hal::MAX_GPIO_PINS)
            .map(PinState::new)
            .collect();
        Self {
            shared: Arc::new(Mutex::new(BoardState { pins })),
        }
    }

    /// A board without any GPIO capability
    pub fn without_gpio() -> Self {
        Self::new(core::iter::empty())
    }

    /// Host-side handle to a pin, or None if the board has no such pin
    pub fn pin(&self, name: &str) -> Option<SimPin> {
        let state = lock(&self.shared);
        let index = state.pins.iter().position(|p| p.name.as_str() == name)?;
        Some(SimPin {
            shared: Arc::clone(&self.shared),
            index,
        })
    }

    /// Number of pins currently held by an open line
    pub fn claimed_count(&self) -> usize {
        lock(&self.shared).pins.iter().filter(|p| p.claimed).count()
    }
}

impl PeripheralService for SimBoard {
    type Line = SimLine;

    fn gpio_list(&self) -> PinList {
        let mut list = PinList::new();
        for pin in &lock(&self.shared).pins {
            // Board construction already capped the pin count
            let _ = list.push(pin.name.clone());
        }
        list
    }

    fn open_gpio(&mut self, name: &str) -> Result<SimLine, GpioError> {
        let mut state = lock(&self.shared);
        let index = state
            .pins
            .iter()
            .position(|p| p.name.as_str() == name)
            .ok_or(GpioError::Unavailable)?;

        let pin = &mut state.pins[index];
        pin.check(Operation::Open)?;
        if pin.claimed {
            return Err(GpioError::AlreadyClaimed);
        }
        pin.claimed = true;
        let name = pin.name.clone();
        drop(state);

        Ok(SimLine::new(name, index, Arc::clone(&self.shared)))
    }
}

/// Outside-world access to one simulated pin
///
/// Used to press the button, watch the LED and inject faults. Driving an
/// input fires the registered edge callback on the calling thread, the way
/// an interrupt would arrive on whatever context services it.
#[derive(Clone)]
pub struct SimPin {
    shared: Shared,
    index: usize,
}

impl SimPin {
    /// Drive an input pin to `level`
    ///
    /// Returns true if the change fired an edge callback. Output pins are
    /// driven by their line, so attempts to drive them fail.
    pub fn drive(&self, level: bool) -> Result<bool, GpioError> {
        let callback = {
            let mut state = lock(&self.shared);
            let pin = &mut state.pins[self.index];
            if pin.direction.is_output() {
                return Err(GpioError::WrongDirection);
            }
            let previous = pin.level;
            pin.level = level;

            if pin.claimed && pin.edge.matches(previous, level) {
                pin.callback
            } else {
                None
            }
        };

        // The callback runs without the board lock held
        let Some(callback) = callback else {
            return Ok(false);
        };
        let action = callback.on_edge();

        let mut state = lock(&self.shared);
        let pin = &mut state.pins[self.index];
        pin.edges_fired = pin.edges_fired.saturating_add(1);
        if action == CallbackAction::Unregister {
            pin.callback = None;
        }
        Ok(true)
    }

    /// Press a pulled-up button (falling edge)
    pub fn press(&self) -> Result<bool, GpioError> {
        self.drive(false)
    }

    /// Release a pulled-up button (rising edge)
    pub fn release(&self) -> Result<bool, GpioError> {
        self.drive(true)
    }

    /// Press then release; returns true if either transition fired
    pub fn click(&self) -> Result<bool, GpioError> {
        let pressed = self.press()?;
        let released = self.release()?;
        Ok(pressed || released)
    }

    /// Current logical level
    pub fn level(&self) -> bool {
        lock(&self.shared).pins[self.index].level
    }

    /// Current direction
    pub fn direction(&self) -> Direction {
        lock(&self.shared).pins[self.index].direction
    }

    /// Configured edge trigger
    pub fn edge(&self) -> Edge {
        lock(&self.shared).pins[self.index].edge
    }

    /// Check if an open line holds this pin
    pub fn is_claimed(&self) -> bool {
        lock(&self.shared).pins[self.index].claimed
    }

    /// Check if an edge callback is attached
    pub fn has_callback(&self) -> bool {
        lock(&self.shared).pins[self.index].callback.is_some()
    }

    /// Number of edges delivered to callbacks so far
    pub fn edges_fired(&self) -> u32 {
        lock(&self.shared).pins[self.index].edges_fired
    }

    /// Make every future `op` on this pin fail with `error`
    pub fn inject(&self, op: Operation, error: GpioError) {
        lock(&self.shared).pins[self.index]
            .faults
            .set(op, Some(error));
    }

    /// Remove an injected fault
    pub fn clear(&self, op: Operation) {
        lock(&self.shared).pins[self.index].faults.set(op, None);
    }
}
