/// How the sensor encodes temperature and humidity in its frame.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    /// One datum byte each: whole percent and whole degrees (DHT11).
    Integer,
    /// Two datum bytes each: tenths, with a sign bit on the temperature (DHT22).
    FixedPoint,
}

impl Encoding {
    /// Number of frame bytes carrying each of humidity and temperature.
    pub const fn datum_byte_count(self) -> u8 {
        match self {
            Encoding::Integer => 1,
            Encoding::FixedPoint => 2,
        }
    }
}

/// Fixed characteristics of a sensor model.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SensorProfile {
    /// Frame decoding rule.
    pub encoding: Encoding,
    /// Minimum time between the starts of two read attempts, in milliseconds.
    ///
    /// Requests issued faster than this are not answered. The interval is
    /// measured on the line's 32-bit microsecond tick, so values above
    /// `u32::MAX / 1000` (about 71 minutes) are capped there.
    pub read_interval_ms: u32,
}

impl SensorProfile {
    /// DHT11: integer encoding, one read per second.
    pub const DHT11: SensorProfile = SensorProfile {
        encoding: Encoding::Integer,
        read_interval_ms: 1_000,
    };

    /// DHT22 / AM2302: fixed-point encoding, one read every two seconds.
    pub const DHT22: SensorProfile = SensorProfile {
        encoding: Encoding::FixedPoint,
        read_interval_ms: 2_000,
    };

    pub(crate) const fn read_interval_us(&self) -> u32 {
        self.read_interval_ms.saturating_mul(1_000)
    }
}

/// Per-instance driver settings.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
    /// How long to collect edges after releasing the line, in microseconds.
    ///
    /// A full transmission takes about 5 ms; the default leaves ample headroom
    /// for edge delivery latency.
    pub timeout_us: u32,
    /// Enable the line's internal pull-up at construction. Turn this off when an
    /// external pull-up resistor is fitted.
    pub use_internal_pullup: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            timeout_us: 500_000,
            use_internal_pullup: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_interval_us() {
        assert_eq!(SensorProfile::DHT11.read_interval_us(), 1_000_000);
        assert_eq!(SensorProfile::DHT22.read_interval_us(), 2_000_000);
    }

    #[test]
    fn test_read_interval_caps_at_tick_range() {
        let profile = SensorProfile {
            encoding: Encoding::FixedPoint,
            read_interval_ms: u32::MAX / 1_000 + 1,
        };
        assert_eq!(profile.read_interval_us(), u32::MAX);
    }
}
