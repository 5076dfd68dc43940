//! Scripted line and synthetic sensor traces for unit tests.

use std::collections::VecDeque;

use embedded_hal::digital::{ErrorKind, ErrorType, PinState};

use crate::line::{EdgeEvent, EdgeLine, PinMode};

const START_SIGNAL_US: u32 = 18_000;
const ACK_US: u32 = 80;
const BIT_LOW_US: u32 = 50;
const ZERO_HIGH_US: u32 = 27;
const ONE_HIGH_US: u32 = 70;

/// The two edges the host itself causes: pulling low, then releasing.
pub fn request_edges(start: u32) -> Vec<EdgeEvent> {
    vec![
        EdgeEvent::new(PinState::Low, start),
        EdgeEvent::new(PinState::High, start.wrapping_add(START_SIGNAL_US)),
    ]
}

/// A complete 86-edge transmission of `bytes` as a sensor would produce it.
pub fn encode_frame(bytes: [u8; 5], start: u32) -> Vec<EdgeEvent> {
    let mut edges = request_edges(start);
    let mut tick = start.wrapping_add(START_SIGNAL_US);

    let mut push = |level, after: u32| {
        tick = tick.wrapping_add(after);
        edges.push(EdgeEvent::new(level, tick));
    };

    // Acknowledge, then the low that opens bit 0.
    push(PinState::Low, 30);
    push(PinState::High, ACK_US);
    push(PinState::Low, ACK_US);

    for byte in bytes {
        for i in 0..8 {
            let bit = (byte >> (7 - i)) & 1;
            push(PinState::High, BIT_LOW_US);
            push(
                PinState::Low,
                if bit == 1 { ONE_HIGH_US } else { ZERO_HIGH_US },
            );
        }
    }

    // Release to idle.
    push(PinState::High, BIT_LOW_US);

    edges
}

/// Host-side calls recorded by [`FakeLine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    PullUp,
    Mode(PinMode),
    Write(PinState),
    Listen,
    Cancel,
}

/// An [`EdgeLine`] that replays one scripted edge trace per listener.
#[derive(Debug, Default)]
pub struct FakeLine {
    pub ops: Vec<Op>,
    pub fail_writes: bool,
    attempts: VecDeque<Vec<EdgeEvent>>,
    pending: VecDeque<EdgeEvent>,
    ticks: VecDeque<u32>,
    now: u32,
    tick_step: u32,
    listening: bool,
}

impl FakeLine {
    /// A line whose clock advances `tick_step` microseconds per query.
    pub fn new(tick_step: u32) -> Self {
        FakeLine {
            tick_step,
            ..Default::default()
        }
    }

    /// Queues the edges the next listener will see.
    pub fn push_attempt(&mut self, edges: Vec<EdgeEvent>) -> &mut Self {
        self.attempts.push_back(edges);
        self
    }

    /// Queues exact values for the next `current_tick` calls.
    pub fn push_ticks(&mut self, ticks: &[u32]) -> &mut Self {
        self.ticks.extend(ticks.iter().copied());
        self
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn count(&self, op: Op) -> usize {
        self.ops.iter().filter(|o| **o == op).count()
    }
}

impl ErrorType for FakeLine {
    type Error = ErrorKind;
}

impl EdgeLine for FakeLine {
    fn set_pull_up(&mut self) -> Result<(), Self::Error> {
        self.ops.push(Op::PullUp);
        Ok(())
    }

    fn set_mode(&mut self, mode: PinMode) -> Result<(), Self::Error> {
        self.ops.push(Op::Mode(mode));
        Ok(())
    }

    fn write(&mut self, level: PinState) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(ErrorKind::Other);
        }
        self.ops.push(Op::Write(level));
        Ok(())
    }

    fn current_tick(&mut self) -> u32 {
        self.now = match self.ticks.pop_front() {
            Some(tick) => tick,
            None => self.now.wrapping_add(self.tick_step),
        };
        self.now
    }

    fn listen(&mut self) -> Result<(), Self::Error> {
        self.ops.push(Op::Listen);
        self.listening = true;
        self.pending = self.attempts.pop_front().unwrap_or_default().into();
        Ok(())
    }

    fn next_edge(&mut self) -> Option<EdgeEvent> {
        if !self.listening {
            return None;
        }
        self.pending.pop_front()
    }

    fn cancel(&mut self) {
        self.ops.push(Op::Cancel);
        self.listening = false;
        self.pending.clear();
    }
}
