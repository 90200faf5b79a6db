//! Shared constants and conversions between the wire messages and the core
//! `stockid` types.

use crate::proto::StatsResponse;
use core::time::Duration;
use stockid::AllocatorStats;

/// Port the allocator listens on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 8910;

/// Default bound on every allocator call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Default bound on establishing the connection at startup.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

impl From<StatsResponse> for AllocatorStats {
    fn from(stats: StatsResponse) -> Self {
        Self {
            datacenter: stats.datacenter,
            worker: stats.worker,
            timestamp: stats.timestamp,
            last_timestamp: stats.last_timestamp,
            sequence: stats.sequence,
            sequence_overload: stats.sequence_overload,
            errors: stats.errors,
        }
    }
}

impl From<AllocatorStats> for StatsResponse {
    fn from(stats: AllocatorStats) -> Self {
        Self {
            datacenter: stats.datacenter,
            worker: stats.worker,
            timestamp: stats.timestamp,
            last_timestamp: stats.last_timestamp,
            sequence: stats.sequence,
            sequence_overload: stats.sequence_overload,
            errors: stats.errors,
        }
    }
}
