use core::ops::ControlFlow;

use embedded_hal::digital::PinState;

use crate::fmt::trace;
use crate::frame::Frame;
use crate::line::{EdgeEvent, EdgeHandler};

/// Number of edges in a complete transmission, host request included.
pub const SUCCESS_EDGE_COUNT: u32 = 86;

/// Number of data bits in a frame.
pub const EXPECTED_DATA_BITS: usize = 40;

/// A high pulse at least this long (in microseconds) is a `1`.
///
/// The sensor sends ~26-28us for `0` and ~70us for `1`.
pub const ONE_BIT_THRESHOLD_US: u32 = 70;

const LAST_DATA_EDGE: u32 = SUCCESS_EDGE_COUNT - 2;

/// Where an edge sits in the transmission, by its index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Host pulling the line low and releasing it.
    Request,
    /// Sensor acknowledging with a low then a high.
    AckStart,
    /// Low that opens the first bit.
    PreData,
    /// Forty high/low pairs, one bit each.
    DataStream,
    /// Sensor releasing the line.
    Terminal,
}

impl Phase {
    fn of(edge_index: u32) -> Self {
        match edge_index {
            0..=1 => Phase::Request,
            2..=3 => Phase::AckStart,
            4 => Phase::PreData,
            5..=LAST_DATA_EDGE => Phase::DataStream,
            _ => Phase::Terminal,
        }
    }
}

/// How a decode session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// No acknowledgement edge was seen.
    NoResponse,
    /// The sensor acknowledged but the transmission was incomplete or misframed.
    MalformedResponse,
    /// All 40 bits arrived and the line was released.
    Complete(Frame),
}

/// Decoding state for one read attempt.
///
/// Feed it the line's edges in order; it classifies each by position and turns
/// the width of every high pulse into a bit.
#[derive(Clone, Debug)]
pub struct DecodeSession {
    edge_index: u32,
    first_tick: u32,
    last_tick: u32,
    terminal_tick: Option<u32>,
    bits: [bool; EXPECTED_DATA_BITS],
    bit_count: usize,
    sensor_responded: bool,
    completed_ok: bool,
}

impl DecodeSession {
    /// Starts a session. `start_tick` is the tick read just before the request.
    pub fn new(start_tick: u32) -> Self {
        DecodeSession {
            edge_index: 0,
            first_tick: start_tick,
            last_tick: start_tick,
            terminal_tick: None,
            bits: [false; EXPECTED_DATA_BITS],
            bit_count: 0,
            sensor_responded: false,
            completed_ok: false,
        }
    }

    /// Number of edges consumed so far.
    pub fn edge_count(&self) -> u32 {
        self.edge_index
    }

    /// Number of bits captured so far, including any beyond the 40th.
    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    /// Whether the sensor acknowledged the request.
    pub fn sensor_responded(&self) -> bool {
        self.sensor_responded
    }

    /// Whether the terminal edge was reached with exactly 40 bits captured.
    pub fn completed_ok(&self) -> bool {
        self.completed_ok
    }

    /// Ticks from session start to the terminal edge, once it has been seen.
    pub fn round_trip_ticks(&self) -> Option<u32> {
        self.terminal_tick
            .map(|tick| tick.wrapping_sub(self.first_tick))
    }

    /// Classifies the session. Call once no more edges will arrive.
    pub fn outcome(&self) -> Outcome {
        if !self.sensor_responded {
            Outcome::NoResponse
        } else if !self.completed_ok {
            Outcome::MalformedResponse
        } else {
            Outcome::Complete(Frame::from_bits(&self.bits))
        }
    }

    fn capture_bit(&mut self, elapsed: u32) {
        let bit = elapsed >= ONE_BIT_THRESHOLD_US;
        trace!("bit {} = {} ({}us)", self.bit_count, bit, elapsed);

        // Noise can produce more falling edges than bits; count them but keep
        // only the first 40 so the session can still be classified.
        if let Some(slot) = self.bits.get_mut(self.bit_count) {
            *slot = bit;
        }
        self.bit_count += 1;
    }
}

impl EdgeHandler for DecodeSession {
    fn on_edge(&mut self, edge: EdgeEvent) -> ControlFlow<()> {
        if self.terminal_tick.is_some() {
            return ControlFlow::Break(());
        }

        let phase = Phase::of(self.edge_index);
        trace!(
            "edge {} high={} tick={}",
            self.edge_index,
            edge.level == PinState::High,
            edge.tick
        );

        match phase {
            Phase::Request | Phase::PreData => {}
            Phase::AckStart => self.sensor_responded = true,
            Phase::DataStream => {
                if edge.level == PinState::Low {
                    let elapsed = edge.tick.wrapping_sub(self.last_tick);
                    self.capture_bit(elapsed);
                }
            }
            Phase::Terminal => {
                self.terminal_tick = Some(edge.tick);
                self.completed_ok = edge.level == PinState::High
                    && self.edge_index == SUCCESS_EDGE_COUNT - 1
                    && self.bit_count == EXPECTED_DATA_BITS;
            }
        }

        self.last_tick = edge.tick;
        self.edge_index += 1;

        if phase == Phase::Terminal {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}
