use crate::{AllocatorStats, Guid, Poll, TimeSource};
use core::cmp::Ordering;
use parking_lot::Mutex;

#[cfg(feature = "tracing")]
use tracing::instrument;

struct State {
    last: Guid,
    /// `false` until the first identifier is issued by a generator built with
    /// [`GuidGenerator::new`].
    primed: bool,
    sequence_overload: u64,
    errors: u64,
}

/// A lock-based generator issuing [`Guid`]s for one datacenter/worker pair.
///
/// This is the allocator side of the identifier contract: every process
/// that creates records asks an allocator service, and the service owns one
/// generator per worker slot. The state lives behind a [`parking_lot::Mutex`]
/// so a single generator can be shared by every request handler.
///
/// Identifiers issued in the same millisecond differ by sequence; the first
/// identifier of a new millisecond has sequence 0. Uniqueness across
/// processes relies on each `(datacenter, worker)` pair being owned by
/// exactly one generator.
///
/// # Example
///
/// ```
/// use stockid::{GuidGenerator, SystemClock};
///
/// let generator = GuidGenerator::new(1, 23, SystemClock);
/// let id = generator.next_id(|ms| std::thread::sleep(std::time::Duration::from_millis(ms)));
///
/// assert!(id.is_valid());
/// assert_eq!(id.datacenter_index(), 1);
/// assert_eq!(id.worker_index(), 23);
/// ```
pub struct GuidGenerator<T>
where
    T: TimeSource,
{
    state: Mutex<State>,
    time: T,
}

impl<T> GuidGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator for the given slot. Out-of-range indices are
    /// masked to their field widths.
    pub fn new(datacenter: u64, worker: u64, time: T) -> Self {
        Self::with_state(Guid::from_components(0, datacenter, worker, 0), false, time)
    }

    /// Creates a generator preloaded with explicit state, for example to
    /// resume after a restart without reissuing the last millisecond.
    pub fn from_components(
        timestamp: u64,
        datacenter: u64,
        worker: u64,
        sequence: u64,
        time: T,
    ) -> Self {
        Self::with_state(
            Guid::from_components(timestamp, datacenter, worker, sequence),
            true,
            time,
        )
    }

    fn with_state(last: Guid, primed: bool, time: T) -> Self {
        Self {
            state: Mutex::new(State {
                last,
                primed,
                sequence_overload: 0,
                errors: 0,
            }),
            time,
        }
    }

    /// Attempts to issue the next identifier without blocking.
    ///
    /// # Example
    ///
    /// ```
    /// use stockid::{GuidGenerator, Poll, SystemClock};
    ///
    /// let generator = GuidGenerator::new(0, 7, SystemClock);
    /// let id = loop {
    ///     match generator.try_poll_id() {
    ///         Poll::Ready { id } => break id,
    ///         Poll::Pending { .. } => std::thread::yield_now(),
    ///     }
    /// };
    /// assert_eq!(id.worker_index(), 7);
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Poll {
        let now = self.time.current_millis();
        let mut state = self.state.lock();

        let current_ts = state.last.timestamp();
        // The first reading always starts a fresh millisecond, even at 0.
        let ordering = if state.primed {
            now.cmp(&current_ts)
        } else {
            Ordering::Greater
        };
        match ordering {
            Ordering::Equal => {
                let last = state.last;
                if last.sequence_index() < Guid::max_sequence() {
                    state.last = Guid::from_components(
                        current_ts,
                        last.datacenter_index(),
                        last.worker_index(),
                        last.sequence_index() + 1,
                    );
                    Poll::Ready { id: state.last }
                } else {
                    state.sequence_overload += 1;
                    Poll::Pending { yield_for: 1 }
                }
            }
            Ordering::Greater => {
                let last = state.last;
                state.last =
                    Guid::from_components(now, last.datacenter_index(), last.worker_index(), 0);
                state.primed = true;
                Poll::Ready { id: state.last }
            }
            Ordering::Less => {
                state.errors += 1;
                Self::cold_clock_behind(now, current_ts)
            }
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: u64, current_ts: u64) -> Poll {
        #[cfg(feature = "tracing")]
        tracing::warn!(now, last = current_ts, "clock moved backwards");
        Poll::Pending {
            yield_for: current_ts - now,
        }
    }

    /// Issues the next identifier, calling `f` with the number of
    /// milliseconds to wait each time the generator is throttled.
    ///
    /// `f` is where the caller sleeps, yields or spins.
    pub fn next_id(&self, mut f: impl FnMut(u64)) -> Guid {
        loop {
            match self.try_poll_id() {
                Poll::Ready { id } => break id,
                Poll::Pending { yield_for } => f(yield_for),
            }
        }
    }

    /// The datacenter index stamped into every identifier.
    pub fn datacenter_index(&self) -> u64 {
        self.state.lock().last.datacenter_index()
    }

    /// The worker index stamped into every identifier.
    pub fn worker_index(&self) -> u64 {
        self.state.lock().last.worker_index()
    }

    /// Returns a diagnostic snapshot of the generator.
    pub fn stats(&self) -> AllocatorStats {
        let now = self.time.current_millis();
        let state = self.state.lock();
        AllocatorStats {
            datacenter: state.last.datacenter_index(),
            worker: state.last.worker_index(),
            timestamp: now,
            last_timestamp: state.last.timestamp(),
            sequence: state.last.sequence_index(),
            sequence_overload: state.sequence_overload,
            errors: state.errors,
        }
    }
}
