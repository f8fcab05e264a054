
use std::sync::Arc;
use std::time::Duration;

use streambench::args::{HttpVersion, WorkloadKind};
use streambench::client::ClientSettings;
use streambench::error::AppResult;
use streambench::report::{ReportOutcome, RunReport};
use streambench::runner::{Measurements, RunPlan, build_clients, run_benchmark};
use streambench::workload::{DEFAULT_MESSAGE_LENGTH, WorkloadPlan};

use support_single::{spawn_failing_http_server, spawn_http_server};

fn settings() -> ClientSettings {
    ClientSettings {
        http_version: HttpVersion::Http1,
        max_conns_per_host: 8,
        request_timeout: Duration::from_secs(5),
        topic: "test-topic".to_owned(),
        ordered: false,
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| format!("runtime failed: {}", err))
}

async fn run(
    kind: WorkloadKind,
    urls: &str,
    run_plan: RunPlan,
) -> AppResult<(RunReport, u64, u64)> {
    let workload = Arc::new(WorkloadPlan::new(kind, 4, DEFAULT_MESSAGE_LENGTH).init()?);
    let clients = build_clients(&workload, urls, &settings(), run_plan.clients).await?;
    let measurements = Measurements::new()?;
    let result =
        run_benchmark(&workload, &clients, &run_plan, &measurements, |_stage| {}).await?;
    Ok((
        RunReport::new(&result, &measurements),
        result.total_responses,
        result.total_errors,
    ))
}

#[test]
fn four_clients_against_http_server() -> Result<(), String> {
    let server = spawn_http_server()?;
    let run_plan = RunPlan {
        clients: 4,
        requests_per_client: 40,
        concurrency: 8,
        warmup_requests: 16,
        warmup_concurrency: 4,
    };
    let (report, responses, errors) = runtime()?
        .block_on(run(WorkloadKind::Probe, &server.addr, run_plan))
        .map_err(|err| err.to_string())?;
    if responses != 160 || errors != 0 {
        return Err(format!("unexpected totals {} / {}", responses, errors));
    }
    let ReportOutcome::Completed { latency, .. } = report.outcome else {
        return Err(format!("unexpected report {:?}", report));
    };
    if !(latency.p50 <= latency.p999 && latency.p999 <= latency.max) {
        return Err(format!("quantiles out of order {:?}", latency));
    }
    if server.requests() != 176 {
        return Err(format!("server saw {} requests", server.requests()));
    }
    Ok(())
}

#[test]
fn failing_pattern_run_keeps_last_error() -> Result<(), String> {
    let server = spawn_failing_http_server()?;
    let run_plan = RunPlan {
        clients: 1,
        requests_per_client: 50,
        concurrency: 8,
        warmup_requests: 0,
        warmup_concurrency: 1,
    };
    let (report, responses, errors) = runtime()?
        .block_on(run(WorkloadKind::Pattern, &server.addr, run_plan))
        .map_err(|err| err.to_string())?;
    if responses != 0 || errors != 50 {
        return Err(format!("unexpected totals {} / {}", responses, errors));
    }
    match report.outcome {
        ReportOutcome::Errors {
            count: 50,
            last_error: Some(message),
        } if message == "broker unavailable" => {
            Ok(())
        }
        other => Err(format!("unexpected outcome {:?}", other)),
    }
}
