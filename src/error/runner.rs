use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Request permits were closed while the client was running.")]
    PermitsClosed,
    #[error("Concurrency {value} exceeds the supported maximum of {max}.")]
    ConcurrencyTooLarge { value: usize, max: usize },
    #[error("No clients were built for the run.")]
    NoClients,
}
