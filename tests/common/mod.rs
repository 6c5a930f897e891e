#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use hyperclient::buffer::{BufferAllocator, BufferHandle, ConstraintKind};
use hyperclient::config::ClientConfig;
use hyperclient::datatype::Limit;
use hyperclient::status::Status;
use hyperclient::translate::{EqualityConstraint, RangeConstraint};
use hyperclient::transport::{ResultSlots, SearchCall, SortedSearchCall, Transport};
use hyperclient::{Client, ClientError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Allocated(BufferHandle),
    Released(BufferHandle),
}

/// Keeps every allocate/release it sees, and can be told to refuse one kind.
#[derive(Debug, Default)]
pub struct RecordingAllocator {
    events: Mutex<Vec<Event>>,
    next_id: Mutex<u64>,
    refuse: Mutex<Option<ConstraintKind>>,
}

impl RecordingAllocator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
    pub fn refusing(kind: ConstraintKind) -> Arc<Self> {
        let allocator = Self::default();
        *allocator.refuse.lock().unwrap() = Some(kind);
        Arc::new(allocator)
    }
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
    pub fn allocations(&self) -> Vec<BufferHandle> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Allocated(h) => Some(h),
                _ => None,
            })
            .collect()
    }
    pub fn releases(&self) -> Vec<BufferHandle> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Released(h) => Some(h),
                _ => None,
            })
            .collect()
    }
    pub fn outstanding(&self) -> usize {
        self.allocations().len() - self.releases().len()
    }
    /// Every allocated buffer released exactly once, nothing else released.
    pub fn assert_balanced(&self) {
        let mut counts: HashMap<u64, usize> = HashMap::new();
        for handle in self.releases() {
            *counts.entry(handle.id).or_default() += 1;
        }
        let allocated = self.allocations();
        for handle in &allocated {
            assert_eq!(counts.remove(&handle.id), Some(1), "buffer {:?} not released exactly once", handle);
        }
        assert!(counts.is_empty(), "released buffers that were never allocated: {:?}", counts);
    }
}

impl BufferAllocator for RecordingAllocator {
    fn allocate(&self, kind: ConstraintKind, capacity: usize) -> hyperclient::Result<BufferHandle> {
        if *self.refuse.lock().unwrap() == Some(kind) {
            return Err(ClientError::Memory(format!("refusing {} buffer", kind)));
        }
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let handle = BufferHandle { id: *next_id, kind, capacity };
        self.events.lock().unwrap().push(Event::Allocated(handle));
        Ok(handle)
    }
    fn release(&self, handle: BufferHandle) {
        self.events.lock().unwrap().push(Event::Released(handle));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub space: String,
    pub equalities: Vec<EqualityConstraint>,
    pub ranges: Vec<RangeConstraint>,
    pub sort_by: Option<String>,
    pub limit: Option<Limit>,
    pub descending: Option<bool>,
    /// buffers the allocator had out while the transport was reading them
    pub outstanding_during_call: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct Reply {
    pub id: i64,
    pub status: Status,
}

/// Replays scripted replies in order; once the script runs out it accepts
/// everything with increasing ids.
pub struct ScriptedTransport {
    pub calls: Vec<RecordedCall>,
    script: VecDeque<Reply>,
    next_id: i64,
    allocator: Arc<RecordingAllocator>,
}

impl ScriptedTransport {
    pub fn new(allocator: Arc<RecordingAllocator>) -> Self {
        Self {
            calls: Vec::new(),
            script: VecDeque::new(),
            next_id: 0,
            allocator,
        }
    }
    pub fn reply(mut self, id: i64, status: Status) -> Self {
        self.script.push_back(Reply { id, status });
        self
    }
    fn answer(&mut self, slots: &ResultSlots) -> i64 {
        match self.script.pop_front() {
            Some(reply) => {
                slots.set_status(reply.status).unwrap();
                reply.id
            }
            None => {
                self.next_id += 1;
                self.next_id
            }
        }
    }
}

impl Transport for ScriptedTransport {
    fn sorted_search(&mut self, call: &SortedSearchCall<'_>, slots: &ResultSlots) -> i64 {
        self.calls.push(RecordedCall {
            space: call.space.to_owned(),
            equalities: call.equalities.to_vec(),
            ranges: call.ranges.to_vec(),
            sort_by: Some(call.sort_by.to_owned()),
            limit: Some(call.limit.clone()),
            descending: Some(call.descending),
            outstanding_during_call: self.allocator.outstanding(),
        });
        self.answer(slots)
    }
    fn search(&mut self, call: &SearchCall<'_>, slots: &ResultSlots) -> i64 {
        self.calls.push(RecordedCall {
            space: call.space.to_owned(),
            equalities: call.equalities.to_vec(),
            ranges: call.ranges.to_vec(),
            sort_by: None,
            limit: None,
            descending: None,
            outstanding_during_call: self.allocator.outstanding(),
        });
        self.answer(slots)
    }
}

pub fn client_with(transport: ScriptedTransport, allocator: Arc<RecordingAllocator>) -> Client<ScriptedTransport> {
    Client::with_allocator(transport, ClientConfig::defaults(), allocator)
}

/// A client whose transport accepts everything.
pub fn accepting_client() -> (Client<ScriptedTransport>, Arc<RecordingAllocator>) {
    let allocator = RecordingAllocator::new();
    let transport = ScriptedTransport::new(Arc::clone(&allocator));
    (client_with(transport, Arc::clone(&allocator)), allocator)
}

pub fn calls(client: &Client<ScriptedTransport>) -> Vec<RecordedCall> {
    client.with_transport(|t| t.calls.clone()).expect("transport lock")
}
