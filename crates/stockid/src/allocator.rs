use serde::{Deserialize, Serialize};

/// The seam between identifier construction and the remote allocator
/// service.
///
/// An implementation is built once at service startup and handed to every
/// code path that creates records, usually behind an `Arc`. Implementations
/// must be safe to call concurrently: uniqueness comes from the remote
/// allocator, so concurrent calls only need to not corrupt each other's
/// requests.
///
/// The futures are `Send` so allocation can happen inside spawned tasks.
///
/// # Example
///
/// ```
/// use stockid::{Allocator, AllocatorStats, Guid};
///
/// struct Fixed(u64);
///
/// impl Allocator for Fixed {
///     type Error = core::convert::Infallible;
///
///     async fn fetch_raw_identifier(&self) -> Result<u64, Self::Error> {
///         Ok(self.0)
///     }
///
///     async fn health_stats(&self) -> Result<AllocatorStats, Self::Error> {
///         Ok(AllocatorStats::default())
///     }
/// }
///
/// # tokio_test(async {
/// let id = Guid::allocate(&Fixed(4_731_797_472_099_266_561)).await.unwrap();
/// assert_eq!(id, Guid::SAMPLE);
/// # });
/// # fn tokio_test<F: std::future::Future>(f: F) {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
/// # }
/// ```
pub trait Allocator: Send + Sync {
    /// Transport or service error.
    type Error: core::error::Error + Send + Sync + 'static;

    /// Returns one fresh, opaque 64-bit identifier.
    fn fetch_raw_identifier(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send;

    /// Returns a diagnostic snapshot of the allocator.
    fn health_stats(&self) -> impl Future<Output = Result<AllocatorStats, Self::Error>> + Send;
}

/// Diagnostic snapshot reported by an allocator.
///
/// `timestamp` and `last_timestamp` are milliseconds since [`EPOCH`].
///
/// [`EPOCH`]: crate::EPOCH
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatorStats {
    pub datacenter: u64,
    pub worker: u64,
    pub timestamp: u64,
    pub last_timestamp: u64,
    pub sequence: u64,
    /// Times the sequence ran out within a single millisecond.
    pub sequence_overload: u64,
    /// Times the clock was observed moving backwards.
    pub errors: u64,
}
