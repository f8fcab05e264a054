//! Request payload generation.
//!
//! A [`WorkloadPlan`] describes what to generate; [`WorkloadPlan::init`] renders
//! the payload pool once and yields an immutable [`Workload`] that any number
//! of request tasks can read from.
mod corpus;
mod pattern;

#[cfg(test)]
mod tests;

use bytes::Bytes;
use chrono::Local;
use tracing::debug;

use crate::args::{BenchArgs, WorkloadKind};
use crate::error::WorkloadError;

pub use pattern::{DEFAULT_MESSAGE_LENGTH, POOL_SIZE};

use pattern::{RecordShape, render_payloads};

/// Pre-rendered payloads indexed by `index mod POOL_SIZE`.
#[derive(Debug)]
pub struct PayloadPool {
    payloads: Vec<Bytes>,
    messages_per_payload: usize,
}

impl PayloadPool {
    fn render(messages_per_payload: usize, message_length: usize) -> Result<Self, WorkloadError> {
        let words = corpus::lorem_words();
        let shape = RecordShape::new(message_length, &words, Local::now());
        let mut rng = rand::thread_rng();
        let payloads = render_payloads(&mut rng, &shape, messages_per_payload)?;
        Ok(Self {
            payloads,
            messages_per_payload,
        })
    }

    /// Returns a shared handle to the payload for `index`.
    #[must_use]
    pub fn get(&self, index: u64) -> Option<Bytes> {
        let len = u64::try_from(self.payloads.len()).ok()?;
        let slot = usize::try_from(index.checked_rem(len)?).ok()?;
        self.payloads.get(slot).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

/// Describes a workload before its payloads are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadPlan {
    kind: WorkloadKind,
    messages_per_request: usize,
    message_length: usize,
}

impl WorkloadPlan {
    #[must_use]
    pub const fn new(kind: WorkloadKind, messages_per_request: usize, message_length: usize) -> Self {
        Self {
            kind,
            messages_per_request,
            message_length,
        }
    }

    #[must_use]
    pub const fn from_args(args: &BenchArgs) -> Self {
        Self::new(
            args.workload,
            args.messages_per_request.get(),
            args.message_size.get(),
        )
    }

    #[must_use]
    pub const fn kind(&self) -> WorkloadKind {
        self.kind
    }

    /// Renders every payload. Consumes the plan, so rendering happens once.
    ///
    /// # Errors
    ///
    /// Returns `RecordOverflow` when the record template alone exceeds the
    /// configured message length.
    pub fn init(self) -> Result<Workload, WorkloadError> {
        let workload = match self.kind {
            WorkloadKind::Pattern => Workload::Pattern(PayloadPool::render(
                self.messages_per_request,
                self.message_length,
            )?),
            WorkloadKind::Probe => Workload::Probe,
            WorkloadKind::Binary => {
                Workload::Binary(PayloadPool::render(1, self.message_length)?)
            }
        };
        debug!(
            "Workload {} ready with {} payload(s)",
            self.kind.as_str(),
            workload.pool_size()
        );
        Ok(workload)
    }
}

/// An initialized workload. Reads never mutate, so it is shared behind an `Arc`.
#[derive(Debug)]
pub enum Workload {
    /// Newline-delimited JSON records posted over HTTP.
    Pattern(PayloadPool),
    /// No body; availability probe.
    Probe,
    /// Single-record payloads for the binary producer.
    Binary(PayloadPool),
}

impl Workload {
    /// Body for request `index`, or `None` for body-less workloads.
    #[must_use]
    pub fn body(&self, index: u64) -> Option<Bytes> {
        match self {
            Workload::Pattern(pool) | Workload::Binary(pool) => pool.get(index),
            Workload::Probe => None,
        }
    }

    #[must_use]
    pub const fn messages_per_payload(&self) -> usize {
        match self {
            Workload::Pattern(pool) | Workload::Binary(pool) => pool.messages_per_payload,
            Workload::Probe => 1,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> WorkloadKind {
        match self {
            Workload::Pattern(_) => WorkloadKind::Pattern,
            Workload::Probe => WorkloadKind::Probe,
            Workload::Binary(_) => WorkloadKind::Binary,
        }
    }

    #[must_use]
    pub fn pool_size(&self) -> usize {
        match self {
            Workload::Pattern(pool) | Workload::Binary(pool) => pool.len(),
            Workload::Probe => 0,
        }
    }
}
