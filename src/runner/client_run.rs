use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::debug;

use crate::client::{RequestClient, RequestOutcome};
use crate::error::RunnerError;
use crate::metrics::{LastError, LatencyRecorder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientPhase {
    Filling,
    Draining,
    Done,
}

impl fmt::Display for ClientPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClientPhase::Filling => "filling",
            ClientPhase::Draining => "draining",
            ClientPhase::Done => "done",
        };
        f.write_str(name)
    }
}

pub(super) struct ClientRun {
    pub(super) client_id: usize,
    pub(super) client: Arc<dyn RequestClient>,
    /// `None` while warming up.
    pub(super) recorder: Option<Arc<LatencyRecorder>>,
    pub(super) last_error: Arc<LastError>,
    pub(super) requests: u64,
    pub(super) concurrency: usize,
    pub(super) start_index: u64,
}

/// Issues `requests` requests with at most `concurrency` in flight and
/// returns how many succeeded.
pub(super) async fn run_client(run: ClientRun) -> Result<u64, RunnerError> {
    let drain_permits =
        u32::try_from(run.concurrency).map_err(|_err| RunnerError::ConcurrencyTooLarge {
            value: run.concurrency,
            max: usize::try_from(u32::MAX).unwrap_or(usize::MAX),
        })?;
    let permits = Arc::new(Semaphore::new(run.concurrency));
    let successes = Arc::new(AtomicU64::new(0));
    debug!("Client {} {}", run.client_id, ClientPhase::Filling);

    for offset in 0..run.requests {
        let permit = Arc::clone(&permits)
            .acquire_owned()
            .await
            .map_err(|_err| RunnerError::PermitsClosed)?;
        let index = run.start_index.wrapping_add(offset);
        let client = Arc::clone(&run.client);
        let recorder = run.recorder.clone();
        let last_error = Arc::clone(&run.last_error);
        let successes = Arc::clone(&successes);

        tokio::spawn(async move {
            let started = Instant::now();
            match client.do_request(index).await {
                RequestOutcome::Success => {
                    if let Some(recorder) = recorder {
                        recorder.record(started.elapsed());
                    }
                    successes.fetch_add(1, Ordering::Relaxed);
                }
                RequestOutcome::Failure(message) => last_error.store(message),
            }
            drop(permit);
        });
    }

    debug!("Client {} {}", run.client_id, ClientPhase::Draining);
    let _drained = permits
        .acquire_many(drain_permits)
        .await
        .map_err(|_err| RunnerError::PermitsClosed)?;
    debug!("Client {} {}", run.client_id, ClientPhase::Done);
    Ok(successes.load(Ordering::Acquire))
}
