use crate::config::Encoding;
use crate::decoder::EXPECTED_DATA_BITS;

/// Reading returned by the sensor.
///
/// Numeric fields are only meaningful when `valid` is `true`; an invalid
/// reading always carries zeros.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// Temperature in degrees Celsius.
    pub temp_c: f32,
    /// Temperature in degrees Fahrenheit.
    pub temp_f: f32,
    /// Relative humidity in percent.
    pub humidity: f32,
    /// Whether the frame checksum matched.
    pub valid: bool,
}

impl Reading {
    /// The reading reported for a frame whose checksum did not match.
    pub const INVALID: Reading = Reading {
        temp_c: 0.0,
        temp_f: 0.0,
        humidity: 0.0,
        valid: false,
    };

    /// Builds a valid reading, deriving Fahrenheit from Celsius.
    pub fn new(temp_c: f32, humidity: f32) -> Self {
        Reading {
            temp_c,
            temp_f: round_tenth(celsius_to_fahrenheit(temp_c)),
            humidity,
            valid: true,
        }
    }
}

/// The five bytes of a transmission: humidity, temperature, checksum.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame([u8; 5]);

impl Frame {
    /// Packs 40 bits, most significant first, into a frame.
    pub fn from_bits(bits: &[bool; EXPECTED_DATA_BITS]) -> Self {
        let mut bytes = [0u8; 5];

        for (byte, chunk) in bytes.iter_mut().zip(bits.chunks_exact(8)) {
            *byte = chunk
                .iter()
                .fold(0u8, |acc, &bit| (acc << 1) | u8::from(bit));
        }

        Frame(bytes)
    }

    /// Wraps raw frame bytes.
    pub const fn from_bytes(bytes: [u8; 5]) -> Self {
        Frame(bytes)
    }

    /// Raw frame bytes.
    pub const fn bytes(&self) -> [u8; 5] {
        self.0
    }

    /// Whether the low byte of the payload sum equals the checksum byte.
    pub fn checksum_ok(&self) -> bool {
        let [data @ .., checksum] = self.0;
        data.iter().fold(0u8, |sum, v| sum.wrapping_add(*v)) == checksum
    }

    /// Converts the frame into physical units.
    ///
    /// Returns [`Reading::INVALID`] when the checksum does not match.
    pub fn decode(&self, encoding: Encoding) -> Reading {
        if !self.checksum_ok() {
            return Reading::INVALID;
        }

        let [hum_hi, hum_lo, temp_hi, temp_lo, _] = self.0;

        match encoding {
            Encoding::Integer => Reading::new(f32::from(temp_hi), f32::from(hum_hi)),
            Encoding::FixedPoint => {
                let joined_humidity = u16::from_be_bytes([hum_hi, hum_lo]);
                let humidity = round_tenth(f32::from(joined_humidity) / 10.0);

                let is_temp_negative = (temp_hi >> 7) != 0;
                let temp_hi = temp_hi & 0b0111_1111;
                let joined_temp = u16::from_be_bytes([temp_hi, temp_lo]);
                let mut temperature = f32::from(joined_temp) / 10.0;
                if is_temp_negative {
                    temperature = -temperature;
                }

                Reading::new(round_tenth(temperature), humidity)
            }
        }
    }
}

pub(crate) fn celsius_to_fahrenheit(temp_c: f32) -> f32 {
    temp_c * 9.0 / 5.0 + 32.0
}

/// Rounds to one decimal place, halves away from zero.
pub(crate) fn round_tenth(value: f32) -> f32 {
    let scaled = value * 10.0;
    let rounded = if scaled < 0.0 {
        (scaled - 0.5) as i32
    } else {
        (scaled + 0.5) as i32
    };
    rounded as f32 / 10.0
}
