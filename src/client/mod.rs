//! Request clients: one logical request against a transport.
mod binary;
mod http;


use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::args::{BenchArgs, HttpVersion, WorkloadKind};
use crate::endpoint::producer_address;
use crate::error::AppResult;
use crate::producer::{ProducerSettings, TcpProducer};
use crate::workload::Workload;

pub use binary::BinaryRequestClient;
pub use http::{HttpRequestClient, NDJSON_CONTENT_TYPE};

/// Result of one request. Failures carry the error or response text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    Success,
    Failure(String),
}

impl RequestOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Success)
    }
}

#[async_trait]
pub trait RequestClient: Send + Sync {
    /// Issues request `index`. Transport problems become `Failure`, never a panic.
    async fn do_request(&self, index: u64) -> RequestOutcome;
}

/// Transport settings shared by every logical client of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub http_version: HttpVersion,
    pub max_conns_per_host: usize,
    pub request_timeout: Duration,
    pub topic: String,
    pub ordered: bool,
}

impl ClientSettings {
    #[must_use]
    pub fn from_args(args: &BenchArgs) -> Self {
        Self {
            http_version: args.http_version(),
            max_conns_per_host: args.max_conns_per_host.get(),
            request_timeout: args.request_timeout,
            topic: args.topic.clone(),
            ordered: args.ordered,
        }
    }
}

/// Builds the client for one logical client.
///
/// # Errors
///
/// Returns an error when the endpoint list is invalid, the HTTP client cannot
/// be built, or the producer cannot connect.
pub async fn build_client(
    workload: Arc<Workload>,
    urls: &str,
    settings: &ClientSettings,
) -> AppResult<Arc<dyn RequestClient>> {
    match workload.kind() {
        WorkloadKind::Pattern | WorkloadKind::Probe => {
            let client = HttpRequestClient::new(workload, urls, settings)?;
            Ok(Arc::new(client))
        }
        WorkloadKind::Binary => {
            let addr = producer_address(urls)?;
            let producer = TcpProducer::connect(
                &addr,
                ProducerSettings {
                    connections: settings.max_conns_per_host,
                    request_timeout: settings.request_timeout,
                },
            )
            .await?;
            debug!("Binary client bound to {}", producer.addr());
            Ok(Arc::new(BinaryRequestClient::new(
                workload,
                Arc::new(producer),
                settings.topic.clone(),
                settings.ordered,
            )))
        }
    }
}
