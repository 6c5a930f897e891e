//! The boundary to the layer that actually executes searches.
//!
//! A transport accepts a submission, returns a request identifier right away
//! and fills the request's [`ResultSlots`] later, as results arrive. How it
//! talks to the cluster is its own business.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::datatype::{Limit, Value};
use crate::error::Result;
use crate::status::Status;
use crate::translate::{EqualityConstraint, RangeConstraint};

/// Arguments of a sorted search, borrowed for the duration of the submission.
#[derive(Debug, Clone, Copy)]
pub struct SortedSearchCall<'a> {
    pub space: &'a str,
    pub equalities: &'a [EqualityConstraint],
    pub ranges: &'a [RangeConstraint],
    pub sort_by: &'a str,
    pub limit: &'a Limit,
    pub descending: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchCall<'a> {
    pub space: &'a str,
    pub equalities: &'a [EqualityConstraint],
    pub ranges: &'a [RangeConstraint],
}

pub trait Transport: Send {
    /// Submits a sorted search. A positive return value identifies the
    /// request; anything else means it was rejected and `slots` says why.
    fn sorted_search(&mut self, call: &SortedSearchCall<'_>, slots: &ResultSlots) -> i64;
    /// Submits an unsorted search, same conventions as `sorted_search`.
    fn search(&mut self, call: &SearchCall<'_>, slots: &ResultSlots) -> i64;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: Value,
}

/// One object returned by a search.
pub type Object = Vec<Attribute>;

#[derive(Debug)]
struct SlotState {
    status: Status,
    results: Vec<Object>,
}

/// Output slots of a request: status code, result objects and their count.
/// Shared between the pending search and the transport that fills it.
#[derive(Debug, Clone)]
pub struct ResultSlots {
    state: Arc<Mutex<SlotState>>,
}

impl ResultSlots {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SlotState {
                status: Status::Success,
                results: Vec::new(),
            })),
        }
    }
    fn lock(&self) -> Result<MutexGuard<'_, SlotState>> {
        Ok(self.state.lock()?)
    }
    pub fn status(&self) -> Result<Status> {
        Ok(self.lock()?.status)
    }
    pub fn set_status(&self, status: Status) -> Result<()> {
        self.lock()?.status = status;
        Ok(())
    }
    pub fn push_result(&self, object: Object) -> Result<()> {
        self.lock()?.results.push(object);
        Ok(())
    }
    pub fn result_count(&self) -> Result<usize> {
        Ok(self.lock()?.results.len())
    }
    pub fn take_results(&self) -> Result<Vec<Object>> {
        Ok(std::mem::take(&mut self.lock()?.results))
    }
}

impl Default for ResultSlots {
    fn default() -> Self {
        Self::new()
    }
}
