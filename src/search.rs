//! Dispatching searches and the handles they leave behind.
//!
//! A dispatch runs in a fixed order: translate the predicate, submit it to the
//! transport, validate the returned request id, release the constraint
//! buffers, and only then record the pending search in the registry. Failures
//! at any step leave the registry untouched, and the buffers are released
//! before the error reaches the caller.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::buffer::BufferAllocator;
use crate::datatype::Limit;
use crate::error::{ClientError, Result};
use crate::predicate::Predicate;
use crate::registry::{RequestId, RequestRegistry};
use crate::status::FailureClass;
use crate::translate::{ConstraintSet, ConstraintSummary, translate};
use crate::transport::{Object, ResultSlots, SearchCall, SortedSearchCall, Transport};

#[derive(Debug, Clone, PartialEq)]
pub enum SearchKind {
    Sorted {
        sort_by: String,
        limit: Limit,
        descending: bool,
    },
    Unsorted,
}

/// A search the transport accepted and has not completed yet.
#[derive(Debug)]
pub struct PendingSearch {
    id: RequestId,
    space: String,
    kind: SearchKind,
    constraints: ConstraintSummary,
    slots: ResultSlots,
}

impl PendingSearch {
    #[cfg(test)]
    pub(crate) fn unsorted(id: RequestId, space: &str) -> Self {
        PendingSearch {
            id,
            space: space.to_owned(),
            kind: SearchKind::Unsorted,
            constraints: ConstraintSummary::default(),
            slots: ResultSlots::new(),
        }
    }
    pub fn id(&self) -> RequestId {
        self.id
    }
    pub fn space(&self) -> &str {
        &self.space
    }
    pub fn kind(&self) -> &SearchKind {
        &self.kind
    }
    pub fn constraints(&self) -> &ConstraintSummary {
        &self.constraints
    }
    pub fn slots(&self) -> &ResultSlots {
        &self.slots
    }
    pub fn status(&self) -> Result<crate::status::Status> {
        self.slots.status()
    }
    pub fn result_count(&self) -> Result<usize> {
        self.slots.result_count()
    }
    pub fn take_results(&self) -> Result<Vec<Object>> {
        self.slots.take_results()
    }
}

pub(crate) struct Dispatcher<'c, T: Transport> {
    pub transport: &'c Mutex<T>,
    pub allocator: &'c Arc<dyn BufferAllocator>,
    pub registry: &'c Mutex<RequestRegistry>,
}

impl<T: Transport> Dispatcher<'_, T> {
    pub fn dispatch(&self, space: &str, predicate: &Predicate, kind: SearchKind) -> Result<Arc<PendingSearch>> {
        let constraints = translate(predicate, self.allocator)?;
        let slots = ResultSlots::new();
        // held until the entry is registered, so a completion cannot be
        // delivered for an id the registry does not know yet
        let mut transport = self.transport.lock()?;
        let raw = submit(&mut *transport, space, &constraints, &kind, &slots);

        let checked = check_request_id(raw, &slots, &constraints);
        let summary = constraints.summary();
        drop(constraints);
        let id = checked?;

        let op = Arc::new(PendingSearch {
            id,
            space: space.to_owned(),
            kind,
            constraints: summary,
            slots,
        });
        self.registry.lock()?.register(id, Arc::clone(&op))?;
        drop(transport);
        debug!(%id, space, "search dispatched");
        Ok(op)
    }
}

fn submit<T: Transport>(
    transport: &mut T,
    space: &str,
    constraints: &ConstraintSet,
    kind: &SearchKind,
    slots: &ResultSlots,
) -> i64 {
    match kind {
        SearchKind::Sorted {
            sort_by,
            limit,
            descending,
        } => {
            let call = SortedSearchCall {
                space,
                equalities: constraints.equalities(),
                ranges: constraints.ranges(),
                sort_by,
                limit,
                descending: *descending,
            };
            transport.sorted_search(&call, slots)
        }
        SearchKind::Unsorted => {
            let call = SearchCall {
                space,
                equalities: constraints.equalities(),
                ranges: constraints.ranges(),
            };
            transport.search(&call, slots)
        }
    }
}

/// Turns a non-positive id into the error its status calls for. A negative id
/// `-1 - i` with a type mismatch points at constraint `i`, counting the
/// equalities first and the ranges after them.
fn check_request_id(raw: i64, slots: &ResultSlots, constraints: &ConstraintSet) -> Result<RequestId> {
    if let Some(id) = RequestId::new(raw) {
        return Ok(id);
    }
    let status = slots.status()?;
    warn!(raw, %status, "search submission rejected");
    let err = match status.failure_class() {
        FailureClass::Value => ClientError::Value(format!("search rejected with {}", status)),
        FailureClass::Type => {
            let offending = (-1i64)
                .checked_sub(raw)
                .and_then(|i| usize::try_from(i).ok())
                .and_then(|i| constraints.attribute_at(i));
            match offending {
                Some(attribute) => {
                    ClientError::Type(format!("attribute '{}' has the wrong type", attribute))
                }
                None => ClientError::Type(format!(
                    "search rejected with {}: a constraint does not match the space's types",
                    status
                )),
            }
        }
        FailureClass::Memory => ClientError::Memory(format!("search rejected with {}", status)),
        FailureClass::Exception => ClientError::HyperClient { status },
    };
    Err(err)
}
