use thiserror::Error;

use super::{
    ConfigError, HttpError, MetricsError, ProducerError, RunnerError, ValidationError,
    WorkloadError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("CLI error: {source}")]
    Clap {
        #[from]
        source: clap::Error,
    },
    #[error("Join error: {source}")]
    Join {
        #[from]
        source: tokio::task::JoinError,
    },
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Workload error: {0}")]
    Workload(#[from] WorkloadError),
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),
    #[error("Producer error: {0}")]
    Producer(#[from] ProducerError),
    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),
    #[error("Runner error: {0}")]
    Runner(#[from] RunnerError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation<E>(error: E) -> Self
    where
        E: Into<ValidationError>,
    {
        error.into().into()
    }

    pub fn config<E>(error: E) -> Self
    where
        E: Into<ConfigError>,
    {
        error.into().into()
    }
}
