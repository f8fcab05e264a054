use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::*;
use crate::args::WorkloadKind;
use crate::client::{RequestClient, RequestOutcome};
use crate::error::{AppError, AppResult};
use crate::workload::{DEFAULT_MESSAGE_LENGTH, WorkloadPlan};

fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Succeed,
    Fail(&'static str),
    FailEveryOther,
}

#[derive(Debug)]
struct MockClient {
    mode: Mode,
    calls: AtomicU64,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    indices: Mutex<Vec<u64>>,
}

impl MockClient {
    fn new(mode: Mode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            calls: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            indices: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl RequestClient for MockClient {
    async fn do_request(&self, index: u64) -> RequestOutcome {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        self.indices.lock().push(index);
        tokio::time::sleep(Duration::from_millis(1)).await;
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match self.mode {
            Mode::Succeed => RequestOutcome::Success,
            Mode::Fail(message) => RequestOutcome::Failure(message.to_owned()),
            Mode::FailEveryOther if call % 2 == 0 => {
                RequestOutcome::Failure(format!("call {} failed", call))
            }
            Mode::FailEveryOther => RequestOutcome::Success,
        }
    }
}

fn plan(clients: usize, requests_per_client: u64, concurrency: usize) -> RunPlan {
    RunPlan {
        clients,
        requests_per_client,
        concurrency,
        warmup_requests: 0,
        warmup_concurrency: 16,
    }
}

fn as_clients(mocks: &[Arc<MockClient>]) -> Vec<Arc<dyn RequestClient>> {
    mocks
        .iter()
        .map(|mock| {
            let client: Arc<dyn RequestClient> = mock.clone();
            client
        })
        .collect()
}

fn probe_workload() -> AppResult<Workload> {
    Ok(WorkloadPlan::new(WorkloadKind::Probe, 1, DEFAULT_MESSAGE_LENGTH).init()?)
}

#[test]
fn four_clients_complete_every_request() -> AppResult<()> {
    run_async_test(async {
        let mocks: Vec<_> = (0..4).map(|_| MockClient::new(Mode::Succeed)).collect();
        let measurements = Measurements::new()?;
        let run_plan = plan(4, 40, 8);
        let result = run_measured(&as_clients(&mocks), &run_plan, &measurements, 1).await?;

        if result.total_responses != 160 || result.total_errors != 0 {
            return Err(AppError::validation(format!("Unexpected result {:?}", result)));
        }
        if measurements.recorder.count() != 160 || measurements.last_error.load().is_some() {
            return Err(AppError::validation("Expected 160 samples and no error"));
        }
        for mock in &mocks {
            if mock.calls.load(Ordering::SeqCst) != 40 {
                return Err(AppError::validation("Each client should send 40 requests"));
            }
            if mock.peak_in_flight.load(Ordering::SeqCst) > 8 {
                return Err(AppError::validation("Concurrency bound exceeded"));
            }
        }
        Ok(())
    })
}

#[test]
fn indices_are_sequential_from_a_random_start() -> AppResult<()> {
    run_async_test(async {
        let mock = MockClient::new(Mode::Succeed);
        let measurements = Measurements::new()?;
        run_measured(&as_clients(&[mock.clone()]), &plan(1, 25, 4), &measurements, 1).await?;

        let mut indices = mock.indices.lock().clone();
        indices.sort_unstable();
        let Some(&first) = indices.first() else {
            return Err(AppError::validation("No requests were issued"));
        };
        if first >= START_INDEX_RANGE {
            return Err(AppError::validation("Start index out of range"));
        }
        let expected: Vec<u64> = (first..first + 25).collect();
        if indices != expected {
            return Err(AppError::validation(format!("Unexpected indices {:?}", indices)));
        }
        Ok(())
    })
}

#[test]
fn failures_are_counted_and_last_error_kept() -> AppResult<()> {
    run_async_test(async {
        let mock = MockClient::new(Mode::Fail("broker unavailable"));
        let measurements = Measurements::new()?;
        let result = run_measured(&as_clients(&[mock]), &plan(1, 50, 10), &measurements, 4).await?;

        if result.total_responses != 0 || result.total_errors != 50 {
            return Err(AppError::validation(format!("Unexpected result {:?}", result)));
        }
        if measurements.last_error.load().as_deref() != Some("broker unavailable") {
            return Err(AppError::validation("Expected the failure text"));
        }
        if measurements.recorder.count() != 0 {
            return Err(AppError::validation("Failures must not be recorded"));
        }
        Ok(())
    })
}

#[test]
fn partial_failures_balance_the_totals() -> AppResult<()> {
    run_async_test(async {
        let mocks: Vec<_> = (0..2).map(|_| MockClient::new(Mode::FailEveryOther)).collect();
        let measurements = Measurements::new()?;
        let run_plan = plan(2, 30, 5);
        let result = run_measured(&as_clients(&mocks), &run_plan, &measurements, 1).await?;

        if result.total_responses + result.total_errors != run_plan.expected_responses() {
            return Err(AppError::validation(format!("Totals do not add up: {:?}", result)));
        }
        if result.total_errors != 30 || measurements.recorder.count() != 30 {
            return Err(AppError::validation(format!("Unexpected result {:?}", result)));
        }
        Ok(())
    })
}

#[test]
fn warmup_is_spread_over_clients_and_not_recorded() -> AppResult<()> {
    run_async_test(async {
        let mocks: Vec<_> = (0..2).map(|_| MockClient::new(Mode::Succeed)).collect();
        let measurements = Measurements::new()?;
        let run_plan = RunPlan {
            warmup_requests: 20,
            warmup_concurrency: 4,
            ..plan(2, 10, 2)
        };
        let workload = probe_workload()?;
        let mut stages = Vec::new();
        let result = run_benchmark(
            &workload,
            &as_clients(&mocks),
            &run_plan,
            &measurements,
            |stage| stages.push(stage),
        )
        .await?;

        if result.total_responses != 20 || measurements.recorder.count() != 20 {
            return Err(AppError::validation(format!("Unexpected result {:?}", result)));
        }
        let calls: Vec<u64> = mocks
            .iter()
            .map(|mock| mock.calls.load(Ordering::SeqCst))
            .collect();
        if calls != [20, 20] {
            return Err(AppError::validation(format!(
                "Expected every client to warm up, got {:?}",
                calls
            )));
        }
        if stages != [RunStage::WarmingUp, RunStage::Measuring(WorkloadKind::Probe)] {
            return Err(AppError::validation(format!("Unexpected stages {:?}", stages)));
        }
        Ok(())
    })
}

#[test]
fn no_warmup_stage_without_warmup_requests() -> AppResult<()> {
    run_async_test(async {
        let mock = MockClient::new(Mode::Succeed);
        let measurements = Measurements::new()?;
        let workload = probe_workload()?;
        let mut stages = Vec::new();
        run_benchmark(
            &workload,
            &as_clients(std::slice::from_ref(&mock)),
            &plan(1, 5, 2),
            &measurements,
            |stage| stages.push(stage.to_string()),
        )
        .await?;
        if stages != ["Starting workload get"] || mock.calls.load(Ordering::SeqCst) != 5 {
            return Err(AppError::validation(format!("Unexpected stages {:?}", stages)));
        }
        Ok(())
    })
}

#[test]
fn warmup_shares_hand_out_the_remainder_first() -> AppResult<()> {
    let shares = warmup_shares(10, 4);
    if shares != [3, 3, 2, 2] {
        return Err(AppError::validation(format!("Unexpected shares {:?}", shares)));
    }
    if warmup_shares(2, 3) != [1, 1, 0] {
        return Err(AppError::validation("Expected idle third client"));
    }
    Ok(())
}

#[test]
fn warmup_failures_are_discarded() -> AppResult<()> {
    run_async_test(async {
        let mock = MockClient::new(Mode::Fail("cold"));
        let client: Arc<dyn RequestClient> = mock;
        let run_plan = RunPlan {
            warmup_requests: 10,
            warmup_concurrency: 3,
            ..plan(1, 1, 1)
        };
        let summary = warmup(&[client], &run_plan).await?;
        if summary.requests != 10 || summary.successes != 0 {
            return Err(AppError::validation(format!("Unexpected warmup {:?}", summary)));
        }
        Ok(())
    })
}

#[test]
fn empty_client_list_is_an_error() -> AppResult<()> {
    run_async_test(async {
        let measurements = Measurements::new()?;
        match run_measured(&[], &plan(1, 1, 1), &measurements, 1).await {
            Err(AppError::Runner(RunnerError::NoClients)) => Ok(()),
            other => Err(AppError::validation(format!("Unexpected result {:?}", other))),
        }
    })
}

#[test]
fn oversized_concurrency_is_rejected() -> AppResult<()> {
    let too_large = RunPlan::max_concurrency().saturating_add(1);
    match plan(1, 1, too_large).validated() {
        Err(RunnerError::ConcurrencyTooLarge { value, .. }) if value == too_large => Ok(()),
        other => Err(AppError::validation(format!("Unexpected result {:?}", other))),
    }
}
