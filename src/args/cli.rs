use clap::Parser;
use std::time::Duration;

use crate::error::ValidationError;

use super::parsers::{parse_duration_arg, parse_positive_u64, parse_positive_usize};
use super::types::{HttpVersion, PositiveU64, PositiveUsize, WorkloadKind};

// Short flags follow h2load naming.
#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Concurrent load generator for HTTP/1.1, h2c and binary producer endpoints, reporting latency percentiles and throughput."
)]
pub struct BenchArgs {
    /// Number of requests across all clients
    #[arg(
        long = "requests",
        short = 'n',
        default_value = "100",
        value_parser = parse_positive_u64
    )]
    pub requests: PositiveU64,

    /// Number of clients
    #[arg(
        long = "clients",
        short = 'c',
        default_value = "1",
        value_parser = parse_positive_usize
    )]
    pub clients: PositiveUsize,

    /// Max concurrent requests to issue per client
    #[arg(
        long = "max-concurrent-streams",
        short = 'm',
        default_value = "32",
        value_parser = parse_positive_usize
    )]
    pub max_concurrent_streams: PositiveUsize,

    /// Max connections per host (HTTP/1.1 pool size, producer connections)
    #[arg(
        long = "max-conns-per-host",
        default_value = "32",
        value_parser = parse_positive_usize
    )]
    pub max_conns_per_host: PositiveUsize,

    /// The host(s) or URI(s) of the endpoint(s), comma separated
    #[arg(long, short = 'u')]
    pub url: Option<String>,

    /// The name of the workload (default, http, get, binary)
    #[arg(long, short = 'w', default_value = "default")]
    pub workload: WorkloadKind,

    /// Number of messages per request in the workload (when supported)
    #[arg(
        long = "messages-per-request",
        visible_alias = "mr",
        default_value = "16",
        value_parser = parse_positive_usize
    )]
    pub messages_per_request: PositiveUsize,

    /// Force HTTP/1.1 (HTTP/2 prior knowledge is used otherwise)
    #[arg(long = "h1")]
    pub h1: bool,

    /// Send a distinct partition key per request (binary workload)
    #[arg(long)]
    pub ordered: bool,

    /// Topic the workload produces to
    #[arg(long, default_value = "test-topic")]
    pub topic: String,

    /// Size in bytes of each generated message
    #[arg(
        long = "message-size",
        default_value = "1024",
        value_parser = parse_positive_usize
    )]
    pub message_size: PositiveUsize,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(long = "timeout", default_value = "10s", value_parser = parse_duration_arg)]
    pub request_timeout: Duration,

    /// Requests issued before the measured run, split across clients (0 disables warmup)
    #[arg(long = "warmup-requests", default_value = "10000")]
    pub warmup_requests: u64,

    /// Per-client concurrency of the warmup run
    #[arg(
        long = "warmup-concurrency",
        default_value = "16",
        value_parser = parse_positive_usize
    )]
    pub warmup_concurrency: PositiveUsize,

    /// Path to config file (TOML/JSON). Defaults to ./streambench.toml or ./streambench.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by STREAMBENCH_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable ANSI colors in log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl BenchArgs {
    #[must_use]
    pub const fn http_version(&self) -> HttpVersion {
        HttpVersion::from_force_h1(self.h1)
    }

    /// Requests each logical client issues; the remainder of an uneven split is not sent.
    #[must_use]
    pub const fn requests_per_client(&self) -> u64 {
        let clients = self.clients.get() as u64;
        match self.requests.get().checked_div(clients) {
            Some(per_client) => per_client,
            None => 0,
        }
    }

    /// Checks the settings that must hold before any work starts.
    ///
    /// # Errors
    ///
    /// Returns `MissingUrl` when no target was given and `ClientsExceedRequests`
    /// when some client would have nothing to send.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let has_url = self
            .url
            .as_deref()
            .is_some_and(|value| !value.trim().is_empty());
        if !has_url {
            return Err(ValidationError::MissingUrl);
        }
        if self.requests_per_client() == 0 {
            return Err(ValidationError::ClientsExceedRequests {
                clients: self.clients.get(),
                requests: self.requests.get(),
            });
        }
        Ok(())
    }
}
