use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::hash::BuildHasherDefault;
use std::sync::Arc;

use seahash::SeaHasher;
use tracing::error;

use crate::error::{ClientError, Result};
use crate::search::PendingSearch;

pub type RequestHasher = BuildHasherDefault<SeaHasher>;

/// Identifier of an accepted request. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(i64);

impl RequestId {
    pub fn new(raw: i64) -> Option<RequestId> {
        (raw > 0).then_some(RequestId(raw))
    }
    pub fn get(&self) -> i64 {
        self.0
    }
}
impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pending searches of one client session, keyed by request id.
///
/// Entries are added by a dispatch that the transport accepted and removed by
/// whoever delivers the completion. The session keeps this behind a mutex.
#[derive(Debug, Default)]
pub struct RequestRegistry {
    ops: HashMap<RequestId, Arc<PendingSearch>, RequestHasher>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self {
            ops: HashMap::default(),
        }
    }
    /// Fails if the id is already pending, which means the transport handed
    /// out an id twice.
    pub fn register(&mut self, id: RequestId, op: Arc<PendingSearch>) -> Result<()> {
        match self.ops.entry(id) {
            Entry::Vacant(e) => {
                e.insert(op);
                Ok(())
            }
            Entry::Occupied(_) => {
                error!(%id, "request id registered twice");
                Err(ClientError::Invariant(format!("request {} is already pending", id)))
            }
        }
    }
    pub fn lookup(&self, id: RequestId) -> Option<Arc<PendingSearch>> {
        self.ops.get(&id).cloned()
    }
    pub fn remove(&mut self, id: RequestId) -> Option<Arc<PendingSearch>> {
        self.ops.remove(&id)
    }
    pub fn contains(&self, id: RequestId) -> bool {
        self.ops.contains_key(&id)
    }
    pub fn ids(&self) -> Vec<RequestId> {
        let mut ids: Vec<RequestId> = self.ops.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
    /// Drops every pending entry and returns how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.ops.len();
        self.ops.clear();
        count
    }
    pub fn len(&self) -> usize {
        self.ops.len()
    }
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
