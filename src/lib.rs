//! Core library for the `streambench` load generator.
//!
//! The binary drives these modules in order: arguments and config files
//! produce a run plan, the workload renders its payloads, one request client
//! is built per logical client, and the runner dispatches requests under a
//! permit pool while recording latency. The library is public so runs can be
//! driven in-process.
pub mod args;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod entry;
pub mod error;
pub mod logger;
pub mod metrics;
pub mod producer;
pub mod report;
pub mod runner;
pub mod workload;
