use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("Workload '{name}' not found. Use default, http, get, or binary.")]
    UnknownWorkload { name: String },
    #[error(
        "Record template is {length} bytes before filler, which does not fit the {target} byte record size."
    )]
    RecordOverflow { length: usize, target: usize },
}
