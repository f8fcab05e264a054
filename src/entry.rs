use std::sync::Arc;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::error;

use crate::args::BenchArgs;
use crate::client::ClientSettings;
use crate::config::{apply_config, load_config};
use crate::error::{AppError, AppResult, ValidationError};
use crate::report::RunReport;
use crate::runner::{Measurements, RunPlan, build_clients, run_benchmark};
use crate::workload::WorkloadPlan;

/// Runs the command line tool.
///
/// # Errors
///
/// Returns configuration, workload and client construction errors. Failed
/// requests are reported in the summary instead.
pub fn run() -> AppResult<()> {
    let (mut args, matches) = parse_args()?;
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }

    crate::logger::init_logging(args.verbose, args.no_color);

    if let Err(err) = args.validate() {
        error!("{}", err);
        return Err(err.into());
    }
    let plan = RunPlan::from_args(&args).inspect_err(|err| error!("{}", err))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime
        .block_on(run_async(args, plan))
        .inspect_err(|err| error!("{}", err))
}

fn parse_args() -> AppResult<(BenchArgs, ArgMatches)> {
    let matches = BenchArgs::command().get_matches_from(std::env::args_os());
    let args = BenchArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

async fn run_async(args: BenchArgs, plan: RunPlan) -> AppResult<()> {
    let urls = args
        .url
        .as_deref()
        .ok_or_else(|| AppError::validation(ValidationError::MissingUrl))?;

    println!(
        "Starting benchmark. {} total client(s). {} total requests",
        plan.clients,
        args.requests.get()
    );
    println!("Initializing");
    let workload = Arc::new(WorkloadPlan::from_args(&args).init()?);
    let settings = ClientSettings::from_args(&args);
    let clients = build_clients(&workload, urls, &settings, plan.clients).await?;
    let measurements = Measurements::new()?;

    let result = run_benchmark(&workload, &clients, &plan, &measurements, |stage| {
        println!("{}", stage);
    })
    .await?;

    for line in RunReport::new(&result, &measurements).lines() {
        println!("{}", line);
    }
    Ok(())
}
