//! Concurrency-bounded request dispatch.
//!
//! Every logical client fills a permit pool with spawned requests, then
//! drains it by taking back every permit. Clients run concurrently and fold
//! their success counts into the run total.
mod client_run;

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rand::Rng;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::args::{BenchArgs, WorkloadKind};
use crate::client::{ClientSettings, RequestClient, build_client};
use crate::error::{AppResult, MetricsError, RunnerError};
use crate::metrics::{LastError, LatencyRecorder};
use crate::workload::Workload;

pub use client_run::ClientPhase;

use client_run::{ClientRun, run_client};

/// Request indices start at a random offset below this bound.
pub const START_INDEX_RANGE: u64 = 1 << 31;

/// Sizes of the warmup and measured cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPlan {
    pub clients: usize,
    pub requests_per_client: u64,
    pub concurrency: usize,
    pub warmup_requests: u64,
    pub warmup_concurrency: usize,
}

impl RunPlan {
    /// Largest per-client concurrency a permit pool can hold.
    #[must_use]
    pub fn max_concurrency() -> usize {
        Semaphore::MAX_PERMITS.min(usize::try_from(u32::MAX).unwrap_or(usize::MAX))
    }

    /// Checks the concurrency limits and returns the plan.
    ///
    /// # Errors
    ///
    /// Returns `ConcurrencyTooLarge` when either concurrency exceeds
    /// [`RunPlan::max_concurrency`] and `NoClients` for zero clients.
    pub fn validated(self) -> Result<Self, RunnerError> {
        let max = Self::max_concurrency();
        for value in [self.concurrency, self.warmup_concurrency] {
            if value > max {
                return Err(RunnerError::ConcurrencyTooLarge { value, max });
            }
        }
        if self.clients == 0 {
            return Err(RunnerError::NoClients);
        }
        Ok(self)
    }

    /// # Errors
    ///
    /// See [`RunPlan::validated`].
    pub fn from_args(args: &BenchArgs) -> Result<Self, RunnerError> {
        Self {
            clients: args.clients.get(),
            requests_per_client: args.requests_per_client(),
            concurrency: args.max_concurrent_streams.get(),
            warmup_requests: args.warmup_requests,
            warmup_concurrency: args.warmup_concurrency.get(),
        }
        .validated()
    }

    #[must_use]
    pub fn expected_responses(&self) -> u64 {
        self.requests_per_client
            .saturating_mul(u64::try_from(self.clients).unwrap_or(u64::MAX))
    }
}

/// Latency samples and the last failure of the measured run.
#[derive(Debug, Clone)]
pub struct Measurements {
    pub recorder: Arc<LatencyRecorder>,
    pub last_error: Arc<LastError>,
}

impl Measurements {
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        Ok(Self {
            recorder: Arc::new(LatencyRecorder::new()?),
            last_error: Arc::new(LastError::new()),
        })
    }
}

/// Counts of a finished measured run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    pub total_responses: u64,
    pub total_errors: u64,
    pub elapsed: Duration,
    pub messages_per_payload: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarmupSummary {
    pub requests: u64,
    pub successes: u64,
}

/// Builds one request client per logical client.
///
/// # Errors
///
/// Returns the first construction failure; no client is retried.
pub async fn build_clients(
    workload: &Arc<Workload>,
    urls: &str,
    settings: &ClientSettings,
    count: usize,
) -> AppResult<Vec<Arc<dyn RequestClient>>> {
    let mut clients = Vec::with_capacity(count);
    for _ in 0..count {
        clients.push(build_client(Arc::clone(workload), urls, settings).await?);
    }
    debug!("Built {} client(s)", clients.len());
    Ok(clients)
}

fn random_start_indices(count: usize) -> Vec<u64> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| rng.gen_range(0..START_INDEX_RANGE))
        .collect()
}

/// Splits `total` warmup requests over `clients`, earlier clients taking the remainder.
fn warmup_shares(total: u64, clients: usize) -> Vec<u64> {
    let count = u64::try_from(clients).unwrap_or(u64::MAX);
    let base = total.checked_div(count).unwrap_or(0);
    let remainder = total.checked_rem(count).unwrap_or(0);
    (0..count)
        .map(|position| {
            if position < remainder {
                base.saturating_add(1)
            } else {
                base
            }
        })
        .collect()
}

/// Runs one unrecorded cycle spread over every client so their connections are open.
///
/// # Errors
///
/// Returns `NoClients` for an empty client list, or an error if a client task
/// panics or its permit pool breaks. Request failures are logged and discarded.
pub async fn warmup(
    clients: &[Arc<dyn RequestClient>],
    plan: &RunPlan,
) -> AppResult<WarmupSummary> {
    if clients.is_empty() {
        return Err(RunnerError::NoClients.into());
    }
    if plan.warmup_requests == 0 {
        return Ok(WarmupSummary {
            requests: 0,
            successes: 0,
        });
    }
    let last_error = Arc::new(LastError::new());
    let shares = warmup_shares(plan.warmup_requests, clients.len());
    let start_indices = random_start_indices(clients.len());

    let mut handles = Vec::with_capacity(clients.len());
    for (((client_id, client), requests), start_index) in
        clients.iter().enumerate().zip(shares).zip(start_indices)
    {
        if requests == 0 {
            continue;
        }
        handles.push(tokio::spawn(run_client(ClientRun {
            client_id,
            client: Arc::clone(client),
            recorder: None,
            last_error: Arc::clone(&last_error),
            requests,
            concurrency: plan.warmup_concurrency,
            start_index,
        })));
    }
    let mut successes: u64 = 0;
    for handle in handles {
        successes = successes.saturating_add(handle.await??);
    }

    let failures = plan.warmup_requests.saturating_sub(successes);
    if failures > 0 {
        warn!(
            "Warmup discarded {} failed request(s); last error: {}",
            failures,
            last_error.load().as_deref().unwrap_or("unknown")
        );
    }
    Ok(WarmupSummary {
        requests: plan.warmup_requests,
        successes,
    })
}

/// Runs every client's measured cycle concurrently and totals the results.
///
/// # Errors
///
/// Returns `NoClients` for an empty client list, or an error if a client
/// task panics or its permit pool breaks.
pub async fn run_measured(
    clients: &[Arc<dyn RequestClient>],
    plan: &RunPlan,
    measurements: &Measurements,
    messages_per_payload: usize,
) -> AppResult<RunResult> {
    if clients.is_empty() {
        return Err(RunnerError::NoClients.into());
    }
    let total = Arc::new(AtomicU64::new(0));
    let start_indices = random_start_indices(clients.len());
    let started = Instant::now();

    let mut handles = Vec::with_capacity(clients.len());
    for ((client_id, client), start_index) in clients.iter().enumerate().zip(start_indices) {
        let run = ClientRun {
            client_id,
            client: Arc::clone(client),
            recorder: Some(Arc::clone(&measurements.recorder)),
            last_error: Arc::clone(&measurements.last_error),
            requests: plan.requests_per_client,
            concurrency: plan.concurrency,
            start_index,
        };
        let total = Arc::clone(&total);
        handles.push(tokio::spawn(async move {
            let successes = run_client(run).await?;
            total.fetch_add(successes, Ordering::Relaxed);
            Ok::<(), RunnerError>(())
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let elapsed = started.elapsed();
    let total_responses = total.load(Ordering::Acquire);
    let expected = plan.requests_per_client.saturating_mul(
        u64::try_from(clients.len()).unwrap_or(u64::MAX),
    );
    Ok(RunResult {
        total_responses,
        total_errors: expected.saturating_sub(total_responses),
        elapsed,
        messages_per_payload,
    })
}

/// Progress points of [`run_benchmark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    WarmingUp,
    Measuring(WorkloadKind),
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStage::WarmingUp => f.write_str("Warming up"),
            RunStage::Measuring(kind) => write!(f, "Starting workload {}", kind.as_str()),
        }
    }
}

/// Warmup across all clients followed by the measured run.
///
/// `on_stage` is called as each phase begins; the warmup stage is skipped
/// when the plan has no warmup requests.
///
/// # Errors
///
/// See [`warmup`] and [`run_measured`].
pub async fn run_benchmark<F>(
    workload: &Workload,
    clients: &[Arc<dyn RequestClient>],
    plan: &RunPlan,
    measurements: &Measurements,
    mut on_stage: F,
) -> AppResult<RunResult>
where
    F: FnMut(RunStage),
{
    if plan.warmup_requests > 0 {
        on_stage(RunStage::WarmingUp);
        let warm = warmup(clients, plan).await?;
        info!(
            "Warmup finished: {}/{} succeeded",
            warm.successes, warm.requests
        );
    }
    on_stage(RunStage::Measuring(workload.kind()));
    run_measured(clients, plan, measurements, workload.messages_per_payload()).await
}
