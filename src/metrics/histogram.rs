use std::time::Duration;

use hdrhistogram::Histogram;
use parking_lot::Mutex;

use crate::error::MetricsError;

const LOWEST_DISCERNIBLE_MICROS: u64 = 1;
/// Samples above this many microseconds land in the top bucket.
pub const HIGHEST_TRACKABLE_MICROS: u64 = 4_000_000;
const SIGNIFICANT_FIGURES: u8 = 4;

/// Quantiles of a finished run, in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencyQuantiles {
    pub p50: u64,
    pub p999: u64,
    pub max: u64,
}

/// Latency histogram shared by every request task of a run.
#[derive(Debug)]
pub struct LatencyRecorder {
    hist: Mutex<Histogram<u64>>,
}

impl LatencyRecorder {
    /// Create an empty recorder.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram bounds are rejected.
    pub fn new() -> Result<Self, MetricsError> {
        let hist = Histogram::<u64>::new_with_bounds(
            LOWEST_DISCERNIBLE_MICROS,
            HIGHEST_TRACKABLE_MICROS,
            SIGNIFICANT_FIGURES,
        )
        .map_err(|err| MetricsError::HistogramCreate {
            message: err.to_string(),
        })?;
        Ok(Self {
            hist: Mutex::new(hist),
        })
    }

    /// Record one request latency.
    pub fn record(&self, latency: Duration) {
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        self.hist.lock().saturating_record(micros);
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.lock().len()
    }

    /// p50, p99.9 and max; all zero when nothing was recorded.
    #[must_use]
    pub fn quantiles(&self) -> LatencyQuantiles {
        let hist = self.hist.lock();
        if hist.is_empty() {
            return LatencyQuantiles::default();
        }
        LatencyQuantiles {
            p50: hist.value_at_quantile(0.5),
            p999: hist.value_at_quantile(0.999),
            max: hist.max(),
        }
    }
}
