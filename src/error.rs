/// Possible errors from the DHT driver.
///
/// A failed checksum is not an error: it is reported as a [`Reading`](crate::Reading)
/// with `valid == false` and every numeric field zeroed.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq)]
pub enum DhtError<E> {
    /// The sensor never acknowledged the start signal within the timeout.
    ///
    /// Usually a wiring or power fault.
    NoResponse,
    /// The sensor acknowledged but did not deliver exactly 40 bits followed by
    /// the terminal HIGH edge before the timeout.
    MalformedResponse,
    /// The sampler hit its retry budget before collecting enough valid readings.
    SampleExhausted,
    /// Error from the GPIO line.
    PinError(E),
}

impl<E> From<E> for DhtError<E> {
    fn from(value: E) -> Self {
        Self::PinError(value)
    }
}
