use crate::logging::LogFormat;
use anyhow::bail;
use clap::{Parser, Subcommand};
use core::time::Duration;
use std::path::PathBuf;
use stockid_tonic_core::{ClientConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_TIMEOUT_MS: u64 = 3_000;

// A dotenv line such as `ID_SERVICE_PORT=` sets the variable to an empty
// string; treat that the same as leaving it unset.
fn host_or_default(value: &str) -> Result<String, String> {
    Ok(if value.is_empty() {
        DEFAULT_HOST.to_string()
    } else {
        value.to_string()
    })
}

fn port_or_default(value: &str) -> Result<u16, String> {
    if value.is_empty() {
        return Ok(DEFAULT_PORT);
    }
    value.parse().map_err(|e| format!("{e}"))
}

fn timeout_or_default(value: &str) -> Result<u64, String> {
    if value.is_empty() {
        return Ok(DEFAULT_TIMEOUT_MS);
    }
    value.parse().map_err(|e| format!("{e}"))
}

/// Runtime configuration for the `stockid` binary.
///
/// All values are parsed from CLI arguments or environment variables. A
/// `.env` file in the working directory is loaded first if present, and
/// `--env-file` names another one.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "stockid",
    version,
    about = "Inventory records keyed by allocator-issued identifiers"
)]
pub struct Cli {
    /// Extra dotenv file to load before reading the environment.
    #[arg(long, global = true, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Allocator host.
    ///
    /// Environment variable: `ID_SERVICE_HOST`
    #[arg(long, global = true, env = "ID_SERVICE_HOST", default_value = DEFAULT_HOST, value_parser = host_or_default)]
    pub id_service_host: String,

    /// Allocator port.
    ///
    /// Environment variable: `ID_SERVICE_PORT`
    #[arg(long, global = true, env = "ID_SERVICE_PORT", default_value_t = DEFAULT_PORT, value_parser = port_or_default)]
    pub id_service_port: u16,

    /// Bound on every allocator call, in milliseconds.
    ///
    /// Environment variable: `ID_SERVICE_TIMEOUT_MS`
    #[arg(long, global = true, env = "ID_SERVICE_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS, value_parser = timeout_or_default)]
    pub id_service_timeout_ms: u64,

    /// Console log format.
    ///
    /// Environment variable: `LOG_FORMAT`
    #[arg(long, global = true, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Allocate fresh identifiers and print one per line.
    Allocate {
        /// How many identifiers to allocate.
        #[arg(long, short = 'n', default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=10_000))]
        count: u32,
    },
    /// Print the allocator's diagnostic snapshot.
    Stats,
    /// Decode an identifier without contacting the allocator.
    Inspect {
        /// Decimal identifier.
        guid: String,
    },
    /// Validate a cabinet and assign it an identifier.
    CreateCabinet {
        /// Cabinet fields as a JSON object.
        json: String,
    },
    /// Validate a storage rule and assign identifiers to it and its records.
    CreateRule {
        /// Rule fields as a JSON object.
        json: String,
    },
    /// Print the documentation fragment of every validated type.
    Schema,
}

impl Command {
    /// Whether the command needs a configured allocator.
    pub fn needs_allocator(&self) -> bool {
        !matches!(self, Self::Inspect { .. } | Self::Schema)
    }
}

impl TryFrom<&Cli> for ClientConfig {
    type Error = anyhow::Error;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        if cli.id_service_host.trim().is_empty() {
            bail!("ID_SERVICE_HOST must not be empty");
        }
        if cli.id_service_port == 0 {
            bail!("ID_SERVICE_PORT must not be 0");
        }
        if cli.id_service_timeout_ms == 0 {
            bail!("ID_SERVICE_TIMEOUT_MS must be greater than 0");
        }

        let timeout = Duration::from_millis(cli.id_service_timeout_ms);
        Ok(Self {
            host: cli.id_service_host.clone(),
            port: cli.id_service_port,
            timeout,
            connect_timeout: timeout.min(DEFAULT_CONNECT_TIMEOUT),
        })
    }
}
