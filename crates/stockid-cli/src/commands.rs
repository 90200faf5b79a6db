//! Subcommand implementations. Each returns the text printed on stdout.

use crate::config::Command;
use crate::records::{MAX_ALLOCATIONS_IN_FLIGHT, NewCabinet, NewStorageRule, schemas};
use anyhow::{Context, bail};
use futures::{StreamExt, TryStreamExt, stream};
use stockid::{Allocator, Guid};

/// Runs a command that does not talk to the allocator.
pub fn execute_offline(command: &Command) -> anyhow::Result<String> {
    match command {
        Command::Inspect { guid } => inspect(guid),
        Command::Schema => schema(),
        other => bail!("{other:?} needs a configured allocator"),
    }
}

/// Runs any command against a configured allocator.
pub async fn execute<A: Allocator>(command: &Command, allocator: &A) -> anyhow::Result<String> {
    match command {
        Command::Allocate { count } => allocate(allocator, *count).await,
        Command::Stats => stats(allocator).await,
        Command::CreateCabinet { json } => create_cabinet(allocator, json).await,
        Command::CreateRule { json } => create_rule(allocator, json).await,
        Command::Inspect { .. } | Command::Schema => execute_offline(command),
    }
}

pub fn inspect(guid: &str) -> anyhow::Result<String> {
    let id = Guid::parse(guid).with_context(|| format!("cannot inspect {guid}"))?;
    Ok(serde_json::to_string_pretty(&id.details())?)
}

pub fn schema() -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&schemas())?)
}

pub async fn allocate<A: Allocator>(allocator: &A, count: u32) -> anyhow::Result<String> {
    let ids: Vec<Guid> = stream::iter(0..count)
        .map(|_| Guid::allocate(allocator))
        .buffered(MAX_ALLOCATIONS_IN_FLIGHT)
        .try_collect()
        .await
        .context("identifier allocation failed")?;
    tracing::debug!(count = ids.len(), "identifiers allocated");
    Ok(ids
        .iter()
        .map(Guid::to_string)
        .collect::<Vec<_>>()
        .join("\n"))
}

pub async fn stats<A: Allocator>(allocator: &A) -> anyhow::Result<String> {
    let stats = allocator
        .health_stats()
        .await
        .context("failed to fetch allocator stats")?;
    Ok(serde_json::to_string_pretty(&stats)?)
}

pub async fn create_cabinet<A: Allocator>(allocator: &A, json: &str) -> anyhow::Result<String> {
    let cabinet = NewCabinet::from_json(json)?.create(allocator).await?;
    Ok(serde_json::to_string_pretty(&cabinet)?)
}

pub async fn create_rule<A: Allocator>(allocator: &A, json: &str) -> anyhow::Result<String> {
    let rule = NewStorageRule::from_json(json)?.create(allocator).await?;
    Ok(serde_json::to_string_pretty(&rule)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::testing::{OfflineAllocator, SequentialAllocator};
    use core::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use serde_json::{Value, json};
    use stockid::AllocatorStats;

    /// Records the largest number of concurrent calls.
    #[derive(Default)]
    struct TrackingAllocator {
        next: AtomicU64,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl Allocator for TrackingAllocator {
        type Error = core::convert::Infallible;

        async fn fetch_raw_identifier(&self) -> Result<u64, Self::Error> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Guid::SAMPLE.to_raw() + self.next.fetch_add(1, Ordering::Relaxed))
        }

        async fn health_stats(&self) -> Result<AllocatorStats, Self::Error> {
            Ok(AllocatorStats::default())
        }
    }

    #[test]
    fn inspect_prints_details() {
        let out: Value = serde_json::from_str(&inspect("4731797472099266561").unwrap()).unwrap();
        assert_eq!(out["guid"], "4731797472099266561");
        assert_eq!(out["timestamp"], 1_678_430_029_894_u64);
        assert_eq!(out["data_center"], 1);
        assert_eq!(out["worker"], 23);
        assert_eq!(out["sequence"], 1);
    }

    #[test]
    fn inspect_rejects_bad_input() {
        let err = inspect("12ab").unwrap_err();
        assert_eq!(err.to_string(), "cannot inspect 12ab");
        assert_eq!(err.root_cause().to_string(), "guid (12ab) is not a number");
    }

    #[test]
    fn offline_refuses_allocator_commands() {
        assert!(execute_offline(&Command::Stats).is_err());
        assert!(execute_offline(&Command::Schema).is_ok());
    }

    #[tokio::test]
    async fn allocate_prints_one_id_per_line() {
        let allocator = SequentialAllocator::default();
        let out = execute(&Command::Allocate { count: 3 }, &allocator)
            .await
            .unwrap();
        let mut lines: Vec<u64> = out.lines().map(|l| l.parse().unwrap()).collect();
        lines.sort_unstable();
        let first = Guid::SAMPLE.to_raw();
        assert_eq!(lines, [first, first + 1, first + 2]);
    }

    #[tokio::test]
    async fn large_batches_are_bounded() {
        let allocator = TrackingAllocator::default();
        let out = allocate(&allocator, 1_000).await.unwrap();
        assert_eq!(out.lines().count(), 1_000);
        let peak = allocator.peak.load(Ordering::Relaxed);
        assert!(peak > 1, "calls ran one at a time");
        assert!(peak <= MAX_ALLOCATIONS_IN_FLIGHT, "{peak} calls in flight");
    }

    #[tokio::test]
    async fn stats_prints_snapshot() {
        let out = execute(&Command::Stats, &SequentialAllocator::default())
            .await
            .unwrap();
        let out: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(out["sequence_overload"], 0);
    }

    #[tokio::test]
    async fn create_cabinet_prints_record() {
        let command = Command::CreateCabinet {
            json: json!({"located_room": "4731797472099266561", "max_number": 2}).to_string(),
        };
        let out = execute(&command, &SequentialAllocator::default())
            .await
            .unwrap();
        let out: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(out["cabinet_id"], "4731797472099266561");
        assert_eq!(out["status"], 0);
    }

    #[tokio::test]
    async fn allocator_errors_keep_context() {
        let err = execute(&Command::Allocate { count: 2 }, &OfflineAllocator)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "identifier allocation failed");
        assert_eq!(err.root_cause().to_string(), "allocator offline");

        let command = Command::CreateRule {
            json: "{}".to_string(),
        };
        assert!(execute(&command, &OfflineAllocator).await.is_err());
    }
}
