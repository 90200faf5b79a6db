use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

/// Allocator epoch: Wednesday, June 10, 1987 00:00:00 UTC.
///
/// The 41-bit timestamp field of every [`Guid`] counts milliseconds from this
/// instant. It matches the epoch of the pysnowflake allocator that issued the
/// identifiers already stored by inventory deployments, so it must never
/// change.
///
/// [`Guid`]: crate::Guid
pub const EPOCH: Duration = Duration::from_millis(550_281_600_000);

/// [`EPOCH`] in milliseconds since the UNIX epoch.
pub const EPOCH_MILLIS: u64 = EPOCH.as_millis() as u64;

/// A trait for time sources that return a timestamp in milliseconds since
/// [`EPOCH`].
///
/// This abstraction allows you to plug in the system clock or a mocked time
/// source in tests.
///
/// # Example
///
/// ```
/// use stockid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since [`EPOCH`].
    fn current_millis(&self) -> u64;
}

/// Wall-clock time source aligned to [`EPOCH`].
///
/// The wall clock can step backwards (NTP corrections); the generator treats
/// that as a pending state rather than issuing a duplicate.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|now| now.saturating_sub(EPOCH).as_millis() as u64)
            .unwrap_or(0)
    }
}
