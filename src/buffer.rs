//! Constraint buffers and the allocator that backs them.
//!
//! A [`ConstraintBuffer`] is acquired from a [`BufferAllocator`] with a fixed
//! capacity and hands its allocation back when dropped. Every exit path of a
//! search, including early returns and unwinding, releases each acquired
//! buffer exactly once; a buffer that was never acquired has nothing to release.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tracing::trace;

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    Equality,
    Range,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConstraintKind::Equality => write!(f, "equality"),
            ConstraintKind::Range => write!(f, "range"),
        }
    }
}

/// Identifies one allocation for the allocator that made it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle {
    pub id: u64,
    pub kind: ConstraintKind,
    pub capacity: usize,
}

/// The allocation/free pair constraint buffers are drawn from.
pub trait BufferAllocator: Send + Sync {
    fn allocate(&self, kind: ConstraintKind, capacity: usize) -> Result<BufferHandle>;
    fn release(&self, handle: BufferHandle);
}

/// Default allocator. Buffers live on the heap; this only numbers them and
/// keeps count of the ones not yet released.
#[derive(Debug, Default)]
pub struct SystemAllocator {
    next_id: AtomicU64,
    outstanding: AtomicUsize,
}

impl SystemAllocator {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }
}

impl BufferAllocator for SystemAllocator {
    fn allocate(&self, kind: ConstraintKind, capacity: usize) -> Result<BufferHandle> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        Ok(BufferHandle { id, kind, capacity })
    }
    fn release(&self, _handle: BufferHandle) {
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Something that can be stored in a constraint buffer.
pub trait ConstraintEntry {
    const KIND: ConstraintKind;
    fn attribute(&self) -> &str;
}

pub struct ConstraintBuffer<T: ConstraintEntry> {
    items: Vec<T>,
    handle: BufferHandle,
    allocator: Arc<dyn BufferAllocator>,
}

impl<T: ConstraintEntry> ConstraintBuffer<T> {
    pub fn allocate(allocator: &Arc<dyn BufferAllocator>, capacity: usize) -> Result<Self> {
        let handle = allocator.allocate(T::KIND, capacity)?;
        let mut items = Vec::new();
        if let Err(e) = items.try_reserve_exact(capacity) {
            allocator.release(handle);
            return Err(ClientError::Memory(format!(
                "cannot allocate {} {} constraints: {}",
                capacity,
                T::KIND,
                e
            )));
        }
        trace!(id = handle.id, kind = %T::KIND, capacity, "constraint buffer allocated");
        Ok(Self {
            items,
            handle,
            allocator: Arc::clone(allocator),
        })
    }
    pub fn push(&mut self, item: T) -> Result<()> {
        if self.items.len() == self.handle.capacity {
            return Err(ClientError::Invariant(format!(
                "{} buffer {} is full at {} entries, no room for '{}'",
                T::KIND,
                self.handle.id,
                self.handle.capacity,
                item.attribute()
            )));
        }
        self.items.push(item);
        Ok(())
    }
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
    pub fn len(&self) -> usize {
        self.items.len()
    }
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.handle.capacity
    }
    pub fn handle(&self) -> BufferHandle {
        self.handle
    }
}

impl<T: ConstraintEntry> Drop for ConstraintBuffer<T> {
    fn drop(&mut self) {
        self.items.clear();
        self.allocator.release(self.handle);
        trace!(id = self.handle.id, kind = %T::KIND, "constraint buffer released");
    }
}

impl<T: ConstraintEntry + fmt::Debug> fmt::Debug for ConstraintBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ConstraintBuffer")
            .field("handle", &self.handle)
            .field("items", &self.items)
            .finish()
    }
}
