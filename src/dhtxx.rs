use embedded_hal::{delay::DelayNs, digital::PinState};

use crate::config::{SensorProfile, Settings};
use crate::decoder::{DecodeSession, Outcome};
use crate::error::DhtError;
use crate::fmt::{debug, warning};
use crate::frame::Reading;
use crate::line::{EdgeLine, Listener, PinMode};

/// How long the host holds the line low to request a reading, in milliseconds.
///
/// The datasheet asks for at least 18 ms so the DHT11 notices the request.
const START_SIGNAL_MS: u32 = 18;

/// Driver for the DHT11 and DHT22 temperature and humidity sensors.
pub struct Dht<L, D> {
    line: L,
    delay: D,
    profile: SensorProfile,
    settings: Settings,
    last_read_tick: Option<u32>,
}

impl<L, D> Dht<L, D>
where
    L: EdgeLine,
    D: DelayNs,
{
    /// Creates a driver with default [`Settings`].
    ///
    /// # Arguments
    ///
    /// * `line` - The GPIO line connected to the sensor's data pin.
    /// * `delay` - A delay provider implementing the `DelayNs` trait.
    /// * `profile` - The sensor model, e.g. [`SensorProfile::DHT22`].
    pub fn new(line: L, delay: D, profile: SensorProfile) -> Result<Self, DhtError<L::Error>> {
        Self::with_settings(line, delay, profile, Settings::default())
    }

    /// Creates a driver, enabling the internal pull-up if the settings ask for it.
    pub fn with_settings(
        mut line: L,
        delay: D,
        profile: SensorProfile,
        settings: Settings,
    ) -> Result<Self, DhtError<L::Error>> {
        if settings.use_internal_pullup {
            line.set_pull_up()?;
        }

        Ok(Dht {
            line,
            delay,
            profile,
            settings,
            last_read_tick: None,
        })
    }

    /// The sensor model this driver decodes for.
    pub fn profile(&self) -> &SensorProfile {
        &self.profile
    }

    /// The settings this driver was created with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Gives back the line and the delay provider.
    pub fn release(self) -> (L, D) {
        (self.line, self.delay)
    }

    /// Reads a temperature and humidity measurement from the sensor.
    ///
    /// Makes up to `retries + 1` attempts and stops at the first one whose
    /// checksum matches. Consecutive attempts are spaced by the profile's read
    /// interval, blocking if necessary.
    ///
    /// The interval is measured on the line's wrapping 32-bit microsecond
    /// tick. A read issued just after a whole number of wraps (about every
    /// 71.6 minutes) since the previous one cannot be told apart from a
    /// back-to-back read and pauses for at most one more read interval.
    ///
    /// # Returns
    ///
    /// * `Ok(Reading)` with `valid == true` on success, or the last attempt's
    ///   zeroed reading if every checksum failed.
    /// * `Err(DhtError::NoResponse)` or `Err(DhtError::MalformedResponse)` as
    ///   soon as any attempt fails to complete the transmission.
    pub fn read(&mut self, retries: u32) -> Result<Reading, DhtError<L::Error>> {
        let mut reading = self.read_once()?;

        for attempt in 1..=retries {
            if reading.valid {
                break;
            }
            warning!("checksum mismatch, retry {} of {}", attempt, retries);
            reading = self.read_once()?;
        }

        Ok(reading)
    }

    /// One request/response cycle.
    fn read_once(&mut self) -> Result<Reading, DhtError<L::Error>> {
        self.throttle();

        let start = self.line.current_tick();
        self.last_read_tick = Some(start);

        let mut session = DecodeSession::new(start);
        {
            let mut listener = Listener::arm(&mut self.line)?;

            listener.set_mode(PinMode::Output)?;
            listener.write(PinState::Low)?;
            self.delay.delay_ms(START_SIGNAL_MS);
            listener.set_mode(PinMode::Input)?;

            self.delay.delay_us(self.settings.timeout_us);
            listener.deliver(&mut session);
        }

        debug!(
            "session: edges={} bits={} responded={} round_trip_us={}",
            session.edge_count(),
            session.bit_count(),
            session.sensor_responded(),
            session.round_trip_ticks().unwrap_or(0)
        );

        match session.outcome() {
            Outcome::NoResponse => Err(DhtError::NoResponse),
            Outcome::MalformedResponse => Err(DhtError::MalformedResponse),
            Outcome::Complete(frame) => Ok(frame.decode(self.profile.encoding)),
        }
    }

    /// Blocks until the profile's read interval has passed since the last attempt.
    fn throttle(&mut self) {
        let Some(last) = self.last_read_tick else {
            return;
        };

        let interval = self.profile.read_interval_us();
        let elapsed = self.line.current_tick().wrapping_sub(last);
        if elapsed < interval {
            let pause = interval - elapsed;
            debug!("throttling read for {}us", pause);
            self.delay.delay_us(pause);
        }
    }
}
