//! Summary lines printed after a run.
use std::time::Duration;

use crate::metrics::LatencyQuantiles;
use crate::runner::{Measurements, RunResult};

const MICROS_PER_SECOND: u128 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Any failed request hides latency and throughput.
    Errors {
        count: u64,
        last_error: Option<String>,
    },
    Completed {
        latency: LatencyQuantiles,
        requests_per_sec: u64,
        messages_per_sec: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub total_responses: u64,
    pub elapsed: Duration,
    pub outcome: ReportOutcome,
}

impl RunReport {
    #[must_use]
    pub fn new(result: &RunResult, measurements: &Measurements) -> Self {
        let outcome = if result.total_errors > 0 {
            ReportOutcome::Errors {
                count: result.total_errors,
                last_error: measurements
                    .last_error
                    .load()
                    .map(|message| message.to_string()),
            }
        } else {
            let requests_per_sec = requests_per_second(result.total_responses, result.elapsed);
            let messages = u64::try_from(result.messages_per_payload).unwrap_or(u64::MAX);
            ReportOutcome::Completed {
                latency: measurements.recorder.quantiles(),
                requests_per_sec,
                messages_per_sec: requests_per_sec.saturating_mul(messages),
            }
        };
        Self {
            total_responses: result.total_responses,
            elapsed: result.elapsed,
            outcome,
        }
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Finished. Total responses {} in {}ms.",
            self.total_responses,
            self.elapsed.as_millis()
        )];
        match &self.outcome {
            ReportOutcome::Errors {
                count,
                last_error: Some(message),
            } => {
                lines.push(format!(
                    "Encountered {} errors. Last error: {}",
                    count, message
                ));
            }
            ReportOutcome::Errors {
                count,
                last_error: None,
            } => {
                lines.push(format!("Encountered {} errors.", count));
            }
            ReportOutcome::Completed {
                latency,
                requests_per_sec,
                messages_per_sec,
            } => {
                lines.push(format!(
                    "Latency in ms p50: {}; p999: {} max: {}.",
                    format_millis(latency.p50),
                    format_millis(latency.p999),
                    format_millis(latency.max)
                ));
                lines.push(format!(
                    "Throughput {} messages/s ({} req/s)",
                    messages_per_sec, requests_per_sec
                ));
            }
        }
        lines
    }
}

/// `total * 1_000_000 / elapsed_micros`, with sub-microsecond runs counted as one microsecond.
#[must_use]
pub fn requests_per_second(total: u64, elapsed: Duration) -> u64 {
    let micros = elapsed.as_micros().max(1);
    let rate = u128::from(total)
        .saturating_mul(MICROS_PER_SECOND)
        .checked_div(micros)
        .unwrap_or(0);
    u64::try_from(rate).unwrap_or(u64::MAX)
}

/// Microseconds as milliseconds rounded to one decimal.
#[must_use]
pub fn format_millis(micros: u64) -> String {
    let tenths = micros.saturating_add(50) / 100;
    format!("{}.{}", tenths / 10, tenths % 10)
}
