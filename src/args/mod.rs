//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod parsers;
mod types;


pub use cli::BenchArgs;
pub use parsers::parse_duration_arg;
pub use types::{HttpVersion, PositiveU64, PositiveUsize, WorkloadKind};
