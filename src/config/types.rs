use serde::Deserialize;

use crate::args::WorkloadKind;

/// On-disk run settings. Every field is optional; flags given on the command
/// line take precedence.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub requests: Option<u64>,
    pub clients: Option<usize>,
    #[serde(alias = "concurrency")]
    pub max_concurrent_streams: Option<usize>,
    pub max_conns_per_host: Option<usize>,
    #[serde(alias = "hosts")]
    pub url: Option<String>,
    pub workload: Option<WorkloadKind>,
    pub messages_per_request: Option<usize>,
    pub h1: Option<bool>,
    pub ordered: Option<bool>,
    pub topic: Option<String>,
    pub message_size: Option<usize>,
    pub timeout: Option<String>,
    pub warmup_requests: Option<u64>,
    pub warmup_concurrency: Option<usize>,
    pub verbose: Option<bool>,
    pub no_color: Option<bool>,
}
