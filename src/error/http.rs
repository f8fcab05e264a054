use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Endpoint '{url}' has no host.")]
    EndpointMissingHost { url: String },
    #[error("Workload '{name}' is not served over HTTP.")]
    UnsupportedWorkload { name: &'static str },
}
