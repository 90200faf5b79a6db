use crate::Guid;

/// Outcome of a single [`GuidGenerator::try_poll_id`] call.
///
/// - [`Poll::Ready`] carries a freshly issued identifier.
/// - [`Poll::Pending`] means no identifier can be issued until the clock
///   moves forward by at least `yield_for` milliseconds, either because the
///   sequence for the current millisecond is exhausted or because the clock
///   went backwards.
///
/// [`GuidGenerator::try_poll_id`]: crate::GuidGenerator::try_poll_id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// A unique identifier was generated.
    Ready {
        /// The generated identifier.
        id: Guid,
    },
    /// The generator is throttled.
    Pending {
        /// Milliseconds to wait before polling again.
        yield_for: u64,
    },
}
