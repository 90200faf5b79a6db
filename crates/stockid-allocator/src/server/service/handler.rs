//! gRPC service implementation for identifier allocation.
//!
//! [`AllocatorService`] wraps one [`GuidGenerator`] for the configured
//! `(datacenter, worker)` slot. Every request handler polls the same
//! generator, so identifiers stay unique however many connections are open.

use crate::server::{
    config::ServerConfig,
    telemetry::{increment_ids_issued, increment_request_errors, increment_requests, record_backoff},
};
use core::time::Duration;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use stockid::{EPOCH_MILLIS, Guid, GuidGenerator, Poll, SystemClock, TimeSource};
use stockid_tonic_core::{
    Error,
    proto::{
        HandshakeRequest, HandshakeResponse, NextIdRequest, NextIdResponse, StatsRequest,
        StatsResponse, id_allocator_server::IdAllocator,
    },
};
use tonic::{Request, Response, Status};

/// The `IdAllocator` gRPC service.
pub struct AllocatorService<T = SystemClock>
where
    T: TimeSource,
{
    generator: Arc<GuidGenerator<T>>,
    datacenter: u64,
    worker: u64,
    shutting_down: Arc<AtomicBool>,
}

impl<T> Clone for AllocatorService<T>
where
    T: TimeSource,
{
    fn clone(&self) -> Self {
        Self {
            generator: Arc::clone(&self.generator),
            datacenter: self.datacenter,
            worker: self.worker,
            shutting_down: Arc::clone(&self.shutting_down),
        }
    }
}

impl AllocatorService<SystemClock> {
    /// Creates a service issuing identifiers for the configured slot from the
    /// wall clock.
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_generator(GuidGenerator::new(
            config.datacenter_id,
            config.worker_id,
            SystemClock,
        ))
    }
}

impl<T> AllocatorService<T>
where
    T: TimeSource,
{
    pub fn with_generator(generator: GuidGenerator<T>) -> Self {
        Self {
            datacenter: generator.datacenter_index(),
            worker: generator.worker_index(),
            generator: Arc::new(generator),
            shutting_down: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stops issuing identifiers. Requests arriving afterwards are answered
    /// with `UNAVAILABLE`.
    pub fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::Release);
    }

    /// Polls the generator until it is ready, sleeping through throttled
    /// milliseconds and clock regressions.
    async fn issue(&self) -> Result<Guid, Error> {
        if self.shutting_down.load(Ordering::Acquire) {
            return Err(Error::Unavailable);
        }
        loop {
            match self.generator.try_poll_id() {
                Poll::Ready { id } => return Ok(id),
                Poll::Pending { yield_for } => {
                    tracing::debug!(yield_for, "generator throttled");
                    record_backoff(yield_for);
                    tokio::time::sleep(Duration::from_millis(yield_for)).await;
                }
            }
        }
    }
}

#[tonic::async_trait]
impl<T> IdAllocator for AllocatorService<T>
where
    T: TimeSource + Send + Sync + 'static,
{
    #[tracing::instrument(skip_all, fields(host = %req.get_ref().host, port = req.get_ref().port))]
    async fn handshake(
        &self,
        req: Request<HandshakeRequest>,
    ) -> Result<Response<HandshakeResponse>, Status> {
        increment_requests("handshake");
        let HandshakeRequest { host, port } = req.into_inner();

        if host.is_empty() {
            increment_request_errors();
            return Err(Error::InvalidRequest {
                reason: "host must not be empty".to_string(),
            }
            .into());
        }
        if port > u32::from(u16::MAX) {
            increment_request_errors();
            return Err(Error::InvalidRequest {
                reason: format!("port {port} is out of range"),
            }
            .into());
        }

        tracing::info!(host = %host, port, "client connected");
        Ok(Response::new(HandshakeResponse {
            datacenter: self.datacenter as u32,
            worker: self.worker as u32,
            epoch_ms: EPOCH_MILLIS,
        }))
    }

    #[tracing::instrument(level = "debug", skip_all)]
    async fn next_id(
        &self,
        _req: Request<NextIdRequest>,
    ) -> Result<Response<NextIdResponse>, Status> {
        increment_requests("next_id");
        match self.issue().await {
            Ok(id) => {
                increment_ids_issued();
                Ok(Response::new(NextIdResponse { id: id.to_raw() }))
            }
            Err(e) => {
                increment_request_errors();
                Err(e.into())
            }
        }
    }

    async fn stats(&self, _req: Request<StatsRequest>) -> Result<Response<StatsResponse>, Status> {
        increment_requests("stats");
        Ok(Response::new(self.generator.stats().into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicU64;
    use tonic::Code;

    // Bit 40 set, so every identifier is structurally valid.
    const NOW: u64 = (1 << 40) + 1_000;

    /// Advances one millisecond every `step` reads.
    struct SteppingClock {
        reads: AtomicU64,
        step: u64,
    }

    impl TimeSource for SteppingClock {
        fn current_millis(&self) -> u64 {
            NOW + self.reads.fetch_add(1, Ordering::Relaxed) / self.step
        }
    }

    fn service() -> AllocatorService {
        AllocatorService::new(&ServerConfig {
            server_addr: "127.0.0.1:0".parse().unwrap(),
            datacenter_id: 2,
            worker_id: 17,
        })
    }

    fn handshake_request(host: &str, port: u32) -> Request<HandshakeRequest> {
        Request::new(HandshakeRequest {
            host: host.to_string(),
            port,
        })
    }

    #[tokio::test]
    async fn handshake_reports_slot_and_epoch() {
        let response = service()
            .handshake(handshake_request("localhost", 8910))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.datacenter, 2);
        assert_eq!(response.worker, 17);
        assert_eq!(response.epoch_ms, 550_281_600_000);
    }

    #[tokio::test]
    async fn handshake_rejects_bad_requests() {
        let status = service()
            .handshake(handshake_request("", 8910))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);

        let status = service()
            .handshake(handshake_request("localhost", 70_000))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "port 70000 is out of range");
    }

    #[tokio::test]
    async fn next_id_issues_unique_valid_ids() {
        let service = service();
        let mut seen = HashSet::new();
        for _ in 0..1_000 {
            let raw = service
                .next_id(Request::new(NextIdRequest {}))
                .await
                .unwrap()
                .into_inner()
                .id;
            let id = Guid::try_from(raw).unwrap();
            assert_eq!(id.datacenter_index(), 2);
            assert_eq!(id.worker_index(), 17);
            assert!(seen.insert(id));
        }
    }

    #[tokio::test]
    async fn next_id_waits_out_exhausted_sequence() {
        let generator = GuidGenerator::from_components(
            NOW,
            1,
            1,
            Guid::max_sequence(),
            SteppingClock {
                reads: AtomicU64::new(0),
                step: 4,
            },
        );
        let service = AllocatorService::with_generator(generator);

        let raw = service
            .next_id(Request::new(NextIdRequest {}))
            .await
            .unwrap()
            .into_inner()
            .id;
        let id = Guid::from_raw(raw);
        assert_eq!(id.timestamp(), NOW + 1);
        assert_eq!(id.sequence_index(), 0);

        let stats = service
            .stats(Request::new(StatsRequest {}))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(stats.sequence_overload, 4);
        assert_eq!(stats.last_timestamp, NOW + 1);
    }

    #[tokio::test]
    async fn shutdown_refuses_new_ids() {
        let service = service();
        service.clone().shutdown();
        let status = service
            .next_id(Request::new(NextIdRequest {}))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::Unavailable);
    }
}
