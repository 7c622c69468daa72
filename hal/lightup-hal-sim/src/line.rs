//! Simulated GPIO line

use lightup_hal::{DigitalLine, Direction, Edge, EdgeCallback, GpioError, PinName};

use crate::board::{lock, Operation, PinState, Shared};

/// An open line on a [`SimBoard`](crate::SimBoard)
///
/// Dropping a line without closing it releases the pin, like dropping a
/// HAL pin driver returns it to its reset state.
pub struct SimLine {
    name: PinName,
    index: usize,
    shared: Shared,
    closed: bool,
}

impl SimLine {
    pub(crate) fn new(name: PinName, index: usize, shared: Shared) -> Self {
        Self {
            name,
            index,
            shared,
            closed: false,
        }
    }

    /// Check if this line has been closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Run `f` against this line's pin once the line and fault checks pass
    fn with_pin<T>(
        &self,
        op: Operation,
        f: impl FnOnce(&mut PinState) -> Result<T, GpioError>,
    ) -> Result<T, GpioError> {
        if self.closed {
            return Err(GpioError::Closed);
        }
        let mut state = lock(&self.shared);
        let pin = &mut state.pins[self.index];
        pin.check(op)?;
        f(pin)
    }
}

impl DigitalLine for SimLine {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_direction(&mut self, direction: Direction) -> Result<(), GpioError> {
        self.with_pin(Operation::Configure, |pin| {
            pin.direction = direction;
            if let Some(level) = direction.initial_value() {
                pin.level = level;
                // Outputs do not report edges
                pin.edge = Edge::None;
            }
            Ok(())
        })
    }

    fn set_edge_trigger(&mut self, edge: Edge) -> Result<(), GpioError> {
        self.with_pin(Operation::Configure, |pin| {
            if pin.direction.is_output() && edge != Edge::None {
                return Err(GpioError::WrongDirection);
            }
            pin.edge = edge;
            Ok(())
        })
    }

    fn value(&self) -> Result<bool, GpioError> {
        self.with_pin(Operation::Read, |pin| Ok(pin.level))
    }

    fn set_value(&mut self, high: bool) -> Result<(), GpioError> {
        self.with_pin(Operation::Write, |pin| {
            if !pin.direction.is_output() {
                return Err(GpioError::WrongDirection);
            }
            pin.level = high;
            Ok(())
        })
    }

    fn register_callback(&mut self, callback: &'static dyn EdgeCallback) -> Result<(), GpioError> {
        self.with_pin(Operation::Configure, |pin| {
            pin.callback = Some(callback);
            Ok(())
        })
    }

    fn unregister_callback(&mut self) -> Result<(), GpioError> {
        self.with_pin(Operation::Configure, |pin| {
            pin.callback = None;
            Ok(())
        })
    }

    fn close(&mut self) -> Result<(), GpioError> {
        self.with_pin(Operation::Close, |pin| {
            pin.release();
            Ok(())
        })?;
        self.closed = true;
        Ok(())
    }
}

impl Drop for SimLine {
    fn drop(&mut self) {
        if !self.closed {
            lock(&self.shared).pins[self.index].release();
        }
    }
}
