mod app;
mod config;
mod http;
mod metrics;
mod producer;
mod runner;
mod validation;
mod workload;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::HttpError;
pub use metrics::MetricsError;
pub use producer::ProducerError;
pub use runner::RunnerError;
pub use validation::ValidationError;
pub use workload::WorkloadError;
