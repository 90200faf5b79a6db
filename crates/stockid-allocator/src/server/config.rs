use anyhow::{Context, bail};
use clap::Parser;
use std::net::SocketAddr;
use stockid::Guid;

/// Runtime configuration for the `stockid-allocator` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is loaded first if present).
///
/// Each running allocator must own a distinct `(datacenter, worker)` pair:
/// two allocators sharing a slot will issue duplicate identifiers.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "stockid-allocator",
    version,
    about = "A gRPC service issuing stockid identifiers"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8910"))]
    pub server_addr: String,

    /// Datacenter index encoded into every identifier (2 bits, 0..=3).
    ///
    /// Environment variable: `DATACENTER_ID`
    #[arg(long, env = "DATACENTER_ID", default_value_t = 0)]
    pub datacenter_id: u64,

    /// Worker index encoded into every identifier (8 bits, 0..=255).
    ///
    /// Environment variable: `WORKER_ID`
    #[arg(long, env = "WORKER_ID", default_value_t = 0)]
    pub worker_id: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: SocketAddr,
    pub datacenter_id: u64,
    pub worker_id: u64,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let server_addr = args
            .server_addr
            .parse()
            .with_context(|| format!("SERVER_ADDR ({}) is not a socket address", args.server_addr))?;

        if args.datacenter_id > Guid::DATACENTER_MASK {
            bail!(
                "DATACENTER_ID ({}) exceeds the datacenter field (max = {})",
                args.datacenter_id,
                Guid::DATACENTER_MASK
            );
        }

        if args.worker_id > Guid::WORKER_MASK {
            bail!(
                "WORKER_ID ({}) exceeds the worker field (max = {})",
                args.worker_id,
                Guid::WORKER_MASK
            );
        }

        Ok(Self {
            server_addr,
            datacenter_id: args.datacenter_id,
            worker_id: args.worker_id,
        })
    }
}
