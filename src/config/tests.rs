use std::time::Duration;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tempfile::tempdir;

use super::*;
use crate::args::{BenchArgs, WorkloadKind};
use crate::error::{AppError, AppResult};

fn parse_with_matches(raw: &[&str]) -> AppResult<(BenchArgs, ArgMatches)> {
    let matches = BenchArgs::command().try_get_matches_from(raw)?;
    let args = BenchArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

fn write_config(name: &str, content: &str) -> AppResult<(tempfile::TempDir, std::path::PathBuf)> {
    let dir = tempdir()?;
    let path = dir.path().join(name);
    std::fs::write(&path, content)?;
    Ok((dir, path))
}

#[test]
fn toml_config_fills_unset_flags() -> AppResult<()> {
    let (_dir, path) = write_config(
        "streambench.toml",
        r#"
requests = 500
clients = 5
concurrency = 4
url = "broker-a,broker-b"
workload = "get"
h1 = true
timeout = "2s"
warmup_requests = 0
"#,
    )?;
    let config = load_config_file(&path)?;
    let (mut args, matches) = parse_with_matches(&["streambench"])?;
    apply_config(&mut args, &matches, &config)?;

    if args.requests.get() != 500 || args.clients.get() != 5 {
        return Err(AppError::config("Expected counts from config"));
    }
    if args.max_concurrent_streams.get() != 4 {
        return Err(AppError::config("Expected concurrency alias to apply"));
    }
    if args.url.as_deref() != Some("broker-a,broker-b") {
        return Err(AppError::config("Expected url from config"));
    }
    if args.workload != WorkloadKind::Probe || !args.h1 {
        return Err(AppError::config("Expected workload and h1 from config"));
    }
    if args.request_timeout != Duration::from_secs(2) || args.warmup_requests != 0 {
        return Err(AppError::config("Expected timeout and warmup from config"));
    }
    Ok(())
}

#[test]
fn cli_flags_win_over_config() -> AppResult<()> {
    let (_dir, path) = write_config(
        "streambench.json",
        r#"{"requests": 500, "url": "from-config", "workload": "binary"}"#,
    )?;
    let config = load_config_file(&path)?;
    let (mut args, matches) =
        parse_with_matches(&["streambench", "-n", "20", "-u", "from-cli"])?;
    apply_config(&mut args, &matches, &config)?;

    if args.requests.get() != 20 {
        return Err(AppError::config("Expected CLI requests to win"));
    }
    if args.url.as_deref() != Some("from-cli") {
        return Err(AppError::config("Expected CLI url to win"));
    }
    if args.workload != WorkloadKind::Binary {
        return Err(AppError::config("Expected workload from config"));
    }
    Ok(())
}

#[test]
fn zero_values_in_config_are_rejected() -> AppResult<()> {
    let (_dir, path) = write_config("streambench.toml", "clients = 0\n")?;
    let config = load_config_file(&path)?;
    let (mut args, matches) = parse_with_matches(&["streambench"])?;
    if apply_config(&mut args, &matches, &config).is_ok() {
        return Err(AppError::config("Expected clients = 0 to fail"));
    }
    Ok(())
}

#[test]
fn unknown_extension_is_rejected() -> AppResult<()> {
    let (_dir, path) = write_config("streambench.yaml", "requests: 1\n")?;
    if load_config_file(&path).is_ok() {
        return Err(AppError::config("Expected yaml config to fail"));
    }
    Ok(())
}

#[test]
fn unknown_fields_are_rejected() -> AppResult<()> {
    let (_dir, path) = write_config("streambench.toml", "request = 5\n")?;
    if load_config_file(&path).is_ok() {
        return Err(AppError::config("Expected misspelled field to fail"));
    }
    Ok(())
}

#[test]
fn explicit_missing_path_fails() -> AppResult<()> {
    let dir = tempdir()?;
    let missing = dir.path().join("absent.toml");
    let missing = missing.to_string_lossy().into_owned();
    if load_config(Some(&missing)).is_ok() {
        return Err(AppError::config("Expected missing config to fail"));
    }
    Ok(())
}
