//! The single-wire data line the sensor talks on.

use core::ops::{ControlFlow, Deref, DerefMut};

use embedded_hal::digital::{ErrorType, PinState};

/// Direction of the data line.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinMode {
    /// Released; the pull-up holds the line high unless the sensor drives it.
    Input,
    /// Driven by the host.
    Output,
}

/// A timestamped transition of the data line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeEvent {
    /// Level the line settled at after the transition.
    pub level: PinState,
    /// Monotonic microsecond counter. Wraps around.
    pub tick: u32,
}

impl EdgeEvent {
    /// Creates an edge event.
    pub const fn new(level: PinState, tick: u32) -> Self {
        EdgeEvent { level, tick }
    }
}

/// A GPIO line that can be driven by the host and that timestamps its own edges.
///
/// While a listener is registered the implementation buffers every transition
/// (both directions) and hands them out in chronological order through
/// [`next_edge`](EdgeLine::next_edge). This is the shape of edge-interrupt
/// subsystems such as pigpio callbacks or Linux GPIO line events.
pub trait EdgeLine: ErrorType {
    /// Enables the internal pull-up so the idle line reads high.
    fn set_pull_up(&mut self) -> Result<(), Self::Error>;

    /// Switches the line between host-driven output and released input.
    fn set_mode(&mut self, mode: PinMode) -> Result<(), Self::Error>;

    /// Drives the line. Only meaningful in [`PinMode::Output`].
    fn write(&mut self, level: PinState) -> Result<(), Self::Error>;

    /// Current value of the microsecond tick counter.
    fn current_tick(&mut self) -> u32;

    /// Registers an either-edge listener on the line.
    fn listen(&mut self) -> Result<(), Self::Error>;

    /// Takes the oldest buffered edge, if any.
    fn next_edge(&mut self) -> Option<EdgeEvent>;

    /// Cancels the listener and drops any edges still buffered.
    fn cancel(&mut self);
}

impl<T: EdgeLine + ?Sized> EdgeLine for &mut T {
    #[inline]
    fn set_pull_up(&mut self) -> Result<(), Self::Error> {
        T::set_pull_up(self)
    }

    #[inline]
    fn set_mode(&mut self, mode: PinMode) -> Result<(), Self::Error> {
        T::set_mode(self, mode)
    }

    #[inline]
    fn write(&mut self, level: PinState) -> Result<(), Self::Error> {
        T::write(self, level)
    }

    #[inline]
    fn current_tick(&mut self) -> u32 {
        T::current_tick(self)
    }

    #[inline]
    fn listen(&mut self) -> Result<(), Self::Error> {
        T::listen(self)
    }

    #[inline]
    fn next_edge(&mut self) -> Option<EdgeEvent> {
        T::next_edge(self)
    }

    #[inline]
    fn cancel(&mut self) {
        T::cancel(self)
    }
}

/// Receives edges from an armed [`Listener`].
pub trait EdgeHandler {
    /// Handles one edge. Returning `Break` stops delivery for good.
    fn on_edge(&mut self, edge: EdgeEvent) -> ControlFlow<()>;
}

/// A registered edge listener.
///
/// The listener is cancelled when the guard drops, so it never outlives the
/// read attempt that armed it, whichever way that attempt ends.
pub(crate) struct Listener<'a, L: EdgeLine> {
    line: &'a mut L,
}

impl<'a, L: EdgeLine> Listener<'a, L> {
    pub(crate) fn arm(line: &'a mut L) -> Result<Self, L::Error> {
        line.listen()?;
        Ok(Listener { line })
    }

    /// Feeds buffered edges to `handler` until the line runs dry or the
    /// handler asks to stop.
    pub(crate) fn deliver<H: EdgeHandler>(&mut self, handler: &mut H) {
        while let Some(edge) = self.line.next_edge() {
            if handler.on_edge(edge).is_break() {
                break;
            }
        }
    }
}

impl<L: EdgeLine> Deref for Listener<'_, L> {
    type Target = L;

    fn deref(&self) -> &L {
        self.line
    }
}

impl<L: EdgeLine> DerefMut for Listener<'_, L> {
    fn deref_mut(&mut self) -> &mut L {
        self.line
    }
}

impl<L: EdgeLine> Drop for Listener<'_, L> {
    fn drop(&mut self) {
        self.line.cancel();
    }
}
