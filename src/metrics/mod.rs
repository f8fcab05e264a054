//! Shared run measurements: the latency histogram and the last request error.
mod histogram;
mod last_error;


pub use histogram::{HIGHEST_TRACKABLE_MICROS, LatencyQuantiles, LatencyRecorder};
pub use last_error::LastError;
