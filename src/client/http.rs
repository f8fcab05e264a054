use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response};
use tokio::sync::Semaphore;
use tracing::debug;
use url::Url;

use crate::args::{HttpVersion, WorkloadKind};
use crate::endpoint::{EndpointRotator, http_endpoints, workload_path};
use crate::error::{AppResult, HttpError};
use crate::workload::Workload;

use super::{ClientSettings, RequestClient, RequestOutcome};

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";
const H2_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct HttpTarget {
    url: Url,
    /// Caps in-flight requests to this host over HTTP/1.1.
    gate: Option<Arc<Semaphore>>,
}

/// Sends workload bodies to a rotating set of HTTP endpoints.
#[derive(Debug)]
pub struct HttpRequestClient {
    client: Client,
    targets: EndpointRotator<HttpTarget>,
    workload: Arc<Workload>,
    method: Method,
}

impl HttpRequestClient {
    /// Builds the reqwest client and the endpoint rotation.
    ///
    /// # Errors
    ///
    /// Returns an error for the binary workload, invalid endpoints, or when
    /// reqwest rejects the client configuration.
    pub fn new(
        workload: Arc<Workload>,
        urls: &str,
        settings: &ClientSettings,
    ) -> AppResult<Self> {
        let kind = workload.kind();
        let path = workload_path(kind, &settings.topic).ok_or(HttpError::UnsupportedWorkload {
            name: kind.as_str(),
        })?;
        let urls = http_endpoints(urls, &path)?;
        let targets = build_targets(urls, settings)?;
        let client = build_http_client(settings)?;
        let method = match kind {
            WorkloadKind::Probe => Method::GET,
            WorkloadKind::Pattern | WorkloadKind::Binary => Method::POST,
        };
        debug!(
            "HTTP client ready: {} endpoint(s), {}",
            targets.len(),
            settings.http_version.as_str()
        );
        Ok(Self {
            client,
            targets: EndpointRotator::new(targets)?,
            workload,
            method,
        })
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &Url> {
        self.targets.iter().map(|target| &target.url)
    }
}

fn build_targets(urls: Vec<Url>, settings: &ClientSettings) -> Result<Vec<HttpTarget>, HttpError> {
    let mut gates: HashMap<String, Arc<Semaphore>> = HashMap::new();
    let mut targets = Vec::with_capacity(urls.len());
    for url in urls {
        let gate = match settings.http_version {
            HttpVersion::Http2 => None,
            HttpVersion::Http1 => {
                let host = url.host_str().ok_or_else(|| HttpError::EndpointMissingHost {
                    url: url.to_string(),
                })?;
                let key = format!("{}:{}", host, url.port_or_known_default().unwrap_or(0));
                let gate = gates
                    .entry(key)
                    .or_insert_with(|| {
                        Arc::new(Semaphore::new(
                            settings.max_conns_per_host.min(Semaphore::MAX_PERMITS),
                        ))
                    });
                Some(Arc::clone(gate))
            }
        };
        targets.push(HttpTarget { url, gate });
    }
    Ok(targets)
}

fn build_http_client(settings: &ClientSettings) -> Result<Client, HttpError> {
    let builder = Client::builder().timeout(settings.request_timeout);
    let builder = match settings.http_version {
        HttpVersion::Http1 => builder
            .http1_only()
            .pool_max_idle_per_host(settings.max_conns_per_host),
        HttpVersion::Http2 => builder
            .http2_prior_knowledge()
            .http2_keep_alive_interval(H2_KEEP_ALIVE_INTERVAL)
            .http2_keep_alive_timeout(settings.request_timeout)
            .http2_keep_alive_while_idle(true),
    };
    builder
        .build()
        .map_err(|source| HttpError::BuildClientFailed { source })
}

async fn drain_response_body(response: Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}

async fn failure_text(response: Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(text) if !text.is_empty() => text,
        Ok(_) => format!("HTTP status {}", status),
        Err(err) => err.to_string(),
    }
}

#[async_trait]
impl RequestClient for HttpRequestClient {
    async fn do_request(&self, index: u64) -> RequestOutcome {
        let target = self.targets.next();
        let _permit = match &target.gate {
            Some(gate) => match gate.acquire().await {
                Ok(permit) => Some(permit),
                Err(err) => return RequestOutcome::Failure(err.to_string()),
            },
            None => None,
        };

        let mut request = self.client.request(self.method.clone(), target.url.clone());
        if let Some(body) = self.workload.body(index) {
            request = request.header(CONTENT_TYPE, NDJSON_CONTENT_TYPE).body(body);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                match drain_response_body(response).await {
                    Ok(_) => RequestOutcome::Success,
                    Err(err) => RequestOutcome::Failure(err.to_string()),
                }
            }
            Ok(response) => RequestOutcome::Failure(failure_text(response).await),
            Err(err) => RequestOutcome::Failure(err.to_string()),
        }
    }
}
