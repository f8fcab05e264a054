use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{BenchArgs, PositiveU64, PositiveUsize, parse_duration_arg};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_u64(value: u64, field: &str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn ensure_positive_usize(value: usize, field: &str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

/// Applies config values to every setting that was not given on the command line.
///
/// # Errors
///
/// Returns an error when a config value is out of range or malformed.
pub fn apply_config(
    args: &mut BenchArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    apply_counts(args, matches, config)?;
    apply_target(args, matches, config)?;

    if !is_cli(matches, "verbose")
        && let Some(value) = config.verbose
    {
        args.verbose = value;
    }
    if !is_cli(matches, "no_color")
        && let Some(value) = config.no_color
    {
        args.no_color = value;
    }
    Ok(())
}

fn apply_counts(args: &mut BenchArgs, matches: &ArgMatches, config: &ConfigFile) -> AppResult<()> {
    if !is_cli(matches, "requests")
        && let Some(value) = config.requests
    {
        args.requests = ensure_positive_u64(value, "requests")?;
    }
    if !is_cli(matches, "clients")
        && let Some(value) = config.clients
    {
        args.clients = ensure_positive_usize(value, "clients")?;
    }
    if !is_cli(matches, "max_concurrent_streams")
        && let Some(value) = config.max_concurrent_streams
    {
        args.max_concurrent_streams = ensure_positive_usize(value, "max_concurrent_streams")?;
    }
    if !is_cli(matches, "max_conns_per_host")
        && let Some(value) = config.max_conns_per_host
    {
        args.max_conns_per_host = ensure_positive_usize(value, "max_conns_per_host")?;
    }
    if !is_cli(matches, "messages_per_request")
        && let Some(value) = config.messages_per_request
    {
        args.messages_per_request = ensure_positive_usize(value, "messages_per_request")?;
    }
    if !is_cli(matches, "message_size")
        && let Some(value) = config.message_size
    {
        args.message_size = ensure_positive_usize(value, "message_size")?;
    }
    if !is_cli(matches, "warmup_requests")
        && let Some(value) = config.warmup_requests
    {
        args.warmup_requests = value;
    }
    if !is_cli(matches, "warmup_concurrency")
        && let Some(value) = config.warmup_concurrency
    {
        args.warmup_concurrency = ensure_positive_usize(value, "warmup_concurrency")?;
    }
    Ok(())
}

fn apply_target(args: &mut BenchArgs, matches: &ArgMatches, config: &ConfigFile) -> AppResult<()> {
    if !is_cli(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }
    if !is_cli(matches, "workload")
        && let Some(workload) = config.workload
    {
        args.workload = workload;
    }
    if !is_cli(matches, "h1")
        && let Some(value) = config.h1
    {
        args.h1 = value;
    }
    if !is_cli(matches, "ordered")
        && let Some(value) = config.ordered
    {
        args.ordered = value;
    }
    if !is_cli(matches, "topic")
        && let Some(topic) = config.topic.clone()
    {
        args.topic = topic;
    }
    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_deref()
    {
        args.request_timeout = parse_duration_arg(timeout)
            .map_err(|err| AppError::config(ConfigError::InvalidTimeout { source: err }))?;
    }
    Ok(())
}
