use crate::proto::{
    HandshakeRequest, NextIdRequest, StatsRequest, id_allocator_client::IdAllocatorClient,
};
use crate::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT, DEFAULT_TIMEOUT, Error, Result};
use core::time::Duration;
use stockid::{Allocator, AllocatorStats, EPOCH_MILLIS};
use tonic::transport::{Channel, Endpoint};
use tonic::{Response, Status};


/// Where and how to reach the allocator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Bound on every call after startup.
    pub timeout: Duration,
    /// Bound on establishing the connection.
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// The `http://host:port` URI the client dials.
    pub fn endpoint_uri(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// gRPC client for the allocator service.
///
/// Built once at startup with [`AllocatorClient::configure`] and then handed
/// to every code path that creates records. Cloning is cheap: all clones
/// share one multiplexed HTTP/2 channel, and each call works on its own
/// clone so concurrent calls never share request state.
#[derive(Clone, Debug)]
pub struct AllocatorClient {
    inner: IdAllocatorClient<Channel>,
    config: ClientConfig,
    datacenter: u32,
    worker: u32,
}

impl AllocatorClient {
    /// Connects to the allocator, performs the handshake and fetches an
    /// initial stats snapshot.
    ///
    /// No client is returned unless all three steps succeed. Nothing is
    /// retried; callers treat failure as fatal.
    ///
    /// # Errors
    ///
    /// - [`Error::Transport`] if the host does not form a valid URI
    /// - [`Error::Unreachable`] if the connection cannot be established
    /// - [`Error::EpochMismatch`] if the allocator counts from another epoch
    /// - [`Error::Rpc`] or [`Error::Timeout`] if a startup call fails
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(host = %config.host, port = config.port)))]
    pub async fn configure(config: ClientConfig) -> Result<(Self, AllocatorStats)> {
        let uri = config.endpoint_uri();
        let endpoint = Endpoint::from_shared(uri.clone())
            .map_err(|e| Error::Transport {
                context: format!("invalid allocator endpoint {uri}: {e}"),
            })?
            .connect_timeout(config.connect_timeout);

        let channel = match tokio::time::timeout(config.connect_timeout, endpoint.connect()).await
        {
            Ok(Ok(channel)) => channel,
            Ok(Err(e)) => {
                return Err(Error::Unreachable {
                    endpoint: uri,
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(Error::Unreachable {
                    endpoint: uri,
                    reason: format!("no connection after {:?}", config.connect_timeout),
                });
            }
        };

        let mut client = Self {
            inner: IdAllocatorClient::new(channel),
            config,
            datacenter: 0,
            worker: 0,
        };

        let request = HandshakeRequest {
            host: client.config.host.clone(),
            port: u32::from(client.config.port),
        };
        let mut inner = client.inner.clone();
        let layout = client
            .call("handshake", inner.handshake(request))
            .await?;
        if layout.epoch_ms != EPOCH_MILLIS {
            return Err(Error::EpochMismatch {
                expected: EPOCH_MILLIS,
                found: layout.epoch_ms,
            });
        }
        client.datacenter = layout.datacenter;
        client.worker = layout.worker;

        let stats = client.stats().await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            datacenter = client.datacenter,
            worker = client.worker,
            "allocator handshake complete"
        );

        Ok((client, stats))
    }

    /// Datacenter index reported by the allocator at handshake.
    pub fn datacenter(&self) -> u32 {
        self.datacenter
    }

    /// Worker index reported by the allocator at handshake.
    pub fn worker(&self) -> u32 {
        self.worker
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Requests one identifier.
    ///
    /// # Errors
    ///
    /// [`Error::Rpc`] or [`Error::Timeout`].
    pub async fn next_id(&self) -> Result<u64> {
        let mut inner = self.inner.clone();
        let response = self.call("next_id", inner.next_id(NextIdRequest {})).await?;
        Ok(response.id)
    }

    /// Requests a diagnostic snapshot.
    ///
    /// # Errors
    ///
    /// [`Error::Rpc`] or [`Error::Timeout`].
    pub async fn stats(&self) -> Result<AllocatorStats> {
        let mut inner = self.inner.clone();
        let response = self.call("stats", inner.stats(StatsRequest {})).await?;
        Ok(response.into())
    }

    async fn call<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = core::result::Result<Response<T>, Status>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.config.timeout, fut).await {
            Ok(Ok(response)) => Ok(response.into_inner()),
            Ok(Err(status)) => Err(Error::Rpc(status)),
            Err(_) => Err(Error::Timeout {
                operation,
                after: self.config.timeout,
            }),
        }
    }
}

impl Allocator for AllocatorClient {
    type Error = Error;

    async fn fetch_raw_identifier(&self) -> Result<u64> {
        self.next_id().await
    }

    async fn health_stats(&self) -> Result<AllocatorStats> {
        self.stats().await
    }
}
