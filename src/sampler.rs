use alloc::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::dhtxx::Dht;
use crate::error::DhtError;
use crate::fmt::{debug, warning};
use crate::frame::{Reading, round_tenth};
use crate::line::EdgeLine;

/// Fewest readings a sample can be built from.
const MIN_SAMPLES: usize = 2;

impl<L, D> Dht<L, D>
where
    L: EdgeLine,
    D: DelayNs,
{
    /// Takes several readings and reduces them to one robust estimate.
    ///
    /// Collects `samples` (at least two) valid readings. Temperature and
    /// humidity are then trimmed independently to the values within one
    /// standard deviation of their mean and reduced to the most frequent
    /// value, or the mean when no value repeats.
    ///
    /// Each reading with a bad checksum costs one retry; `max_retries`
    /// defaults to twice `samples`.
    ///
    /// # Errors
    ///
    /// * `DhtError::SampleExhausted` once `max_retries` bad readings occurred.
    /// * `DhtError::NoResponse`, `DhtError::MalformedResponse` and pin errors
    ///   from the underlying [`read`](Dht::read), immediately.
    pub fn sample(
        &mut self,
        samples: usize,
        max_retries: Option<usize>,
    ) -> Result<Reading, DhtError<L::Error>> {
        let samples = samples.max(MIN_SAMPLES);
        let max_retries = max_retries.unwrap_or_else(|| default_retry_budget(samples));

        let mut temperatures = Vec::new();
        let mut humidities = Vec::new();
        let mut retries = 0;

        while temperatures.len() < samples {
            let reading = self.read(0)?;

            if reading.valid {
                temperatures.push(reading.temp_c);
                humidities.push(reading.humidity);
                continue;
            }

            retries += 1;
            warning!("invalid sample, {} of {} retries used", retries, max_retries);
            if retries >= max_retries {
                return Err(DhtError::SampleExhausted);
            }
        }

        debug!("collected {} samples with {} retries", samples, retries);

        Ok(Reading::new(estimate(&temperatures), estimate(&humidities)))
    }
}

/// Twice the sample count, saturating.
fn default_retry_budget(samples: usize) -> usize {
    samples.saturating_mul(2)
}

/// Trims outliers beyond one standard deviation, then takes the mode or mean.
pub(crate) fn estimate(values: &[f32]) -> f32 {
    let trimmed = trim_outliers(values);
    let value = mode(&trimmed).unwrap_or_else(|| mean(&trimmed));

    debug!(
        "estimate: kept {} of {} values -> {}",
        trimmed.len(),
        values.len(),
        value
    );

    round_tenth(value)
}

/// Keeps values strictly within one sample standard deviation of the mean.
///
/// A set with zero spread is returned unchanged.
fn trim_outliers(values: &[f32]) -> Vec<f32> {
    let mean = mean(values);
    let variance = sample_variance(values, mean);
    if variance == 0.0 {
        return values.to_vec();
    }

    // |x - mean| < sd, compared squared
    let trimmed: Vec<f32> = values
        .iter()
        .copied()
        .filter(|x| (x - mean) * (x - mean) < variance)
        .collect();

    if trimmed.is_empty() {
        values.to_vec()
    } else {
        trimmed
    }
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

fn sample_variance(values: &[f32], mean: f32) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let squares: f32 = values.iter().map(|x| (x - mean) * (x - mean)).sum();
    squares / (values.len() - 1) as f32
}

/// Most frequent value, if any value occurs more than once.
///
/// Ties go to the value seen first.
fn mode(values: &[f32]) -> Option<f32> {
    let mut best: Option<(f32, usize)> = None;

    for (i, value) in values.iter().enumerate() {
        if values[..i].contains(value) {
            continue;
        }
        let count = values[i..].iter().filter(|v| *v == value).count();
        if count > 1 && best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((*value, count));
        }
    }

    best.map(|(value, _)| value)
}
