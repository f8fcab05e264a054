//! Endpoint selection.
mod list;


use std::iter;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::ValidationError;

pub use list::{HTTP_PORT, PRODUCER_PORT, http_endpoints, producer_address, workload_path};

/// Round-robins over a non-empty endpoint list.
///
/// `next` advances a shared cursor with a single `fetch_add`, so concurrent
/// callers each get a distinct position without locking.
#[derive(Debug)]
pub struct EndpointRotator<T> {
    first: T,
    rest: Vec<T>,
    cursor: AtomicUsize,
}

impl<T> EndpointRotator<T> {
    /// Builds a rotator.
    ///
    /// # Errors
    ///
    /// Returns `NoEndpoints` when `endpoints` is empty.
    pub fn new(endpoints: Vec<T>) -> Result<Self, ValidationError> {
        let mut endpoints = endpoints.into_iter();
        let first = endpoints.next().ok_or(ValidationError::NoEndpoints)?;
        Ok(Self {
            first,
            rest: endpoints.collect(),
            cursor: AtomicUsize::new(0),
        })
    }

    /// Returns the endpoint after the last one handed out.
    pub fn next(&self) -> &T {
        let position = self
            .cursor
            .fetch_add(1, Ordering::Relaxed)
            .wrapping_add(1)
            .checked_rem(self.len())
            .unwrap_or(0);
        self.get(position).unwrap_or(&self.first)
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&T> {
        match position.checked_sub(1) {
            None => Some(&self.first),
            Some(offset) => self.rest.get(offset),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rest.len().saturating_add(1)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        iter::once(&self.first).chain(self.rest.iter())
    }
}
