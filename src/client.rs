use std::sync::{Arc, Mutex};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use crate::buffer::{BufferAllocator, SystemAllocator};
use crate::config::ClientConfig;
use crate::datatype::Limit;
use crate::error::{ClientError, Result};
use crate::predicate::Predicate;
use crate::registry::{RequestId, RequestRegistry};
use crate::search::{Dispatcher, PendingSearch, SearchKind};
use crate::transport::Transport;

lazy_static! {
    static ref SPACE_NAME: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref ATTRIBUTE_NAME: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").unwrap();
}

/// A client session. Owns the transport, the allocator constraint buffers are
/// drawn from, and the registry of pending searches, which lives exactly as
/// long as the session.
pub struct Client<T: Transport> {
    config: ClientConfig,
    transport: Mutex<T>,
    allocator: Arc<dyn BufferAllocator>,
    registry: Arc<Mutex<RequestRegistry>>,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self::with_allocator(transport, config, Arc::new(SystemAllocator::new()))
    }
    pub fn with_allocator(transport: T, config: ClientConfig, allocator: Arc<dyn BufferAllocator>) -> Self {
        debug!(coordinator = %config.coordinator_address(), "client session started");
        Self {
            config,
            transport: Mutex::new(transport),
            allocator,
            registry: Arc::new(Mutex::new(RequestRegistry::new())),
        }
    }
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
    pub fn registry(&self) -> Arc<Mutex<RequestRegistry>> {
        Arc::clone(&self.registry)
    }
    /// Runs `f` with exclusive access to the transport.
    pub fn with_transport<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let mut transport = self.transport.lock()?;
        Ok(f(&mut *transport))
    }

    /// Starts a search for objects in `space` matching `predicate`, returning
    /// at most `limit` of them ordered by `sort_by`.
    pub fn sorted_search(
        &self,
        space: &str,
        predicate: &Predicate,
        sort_by: &str,
        limit: impl Into<Limit>,
        descending: bool,
    ) -> Result<Arc<PendingSearch>> {
        check_space(space)?;
        check_attributes(predicate)?;
        check_attribute(sort_by)?;
        let kind = SearchKind::Sorted {
            sort_by: sort_by.to_owned(),
            limit: limit.into(),
            descending,
        };
        self.dispatcher().dispatch(space, predicate, kind)
    }

    /// Same as [`Client::sorted_search`] with the predicate given as JSON.
    pub fn sorted_search_json(
        &self,
        space: &str,
        predicate: &serde_json::Value,
        sort_by: &str,
        limit: impl Into<Limit>,
        descending: bool,
    ) -> Result<Arc<PendingSearch>> {
        let predicate = Predicate::from_json(predicate)?;
        self.sorted_search(space, &predicate, sort_by, limit, descending)
    }

    /// Starts an unsorted search for every object in `space` matching `predicate`.
    pub fn search(&self, space: &str, predicate: &Predicate) -> Result<Arc<PendingSearch>> {
        check_space(space)?;
        check_attributes(predicate)?;
        self.dispatcher().dispatch(space, predicate, SearchKind::Unsorted)
    }

    pub fn search_json(&self, space: &str, predicate: &serde_json::Value) -> Result<Arc<PendingSearch>> {
        let predicate = Predicate::from_json(predicate)?;
        self.search(space, &predicate)
    }

    pub fn lookup(&self, id: RequestId) -> Result<Option<Arc<PendingSearch>>> {
        Ok(self.registry.lock()?.lookup(id))
    }

    /// Called when the completion for `id` has been delivered; the entry
    /// leaves the registry here and nowhere else.
    pub fn complete(&self, id: RequestId) -> Result<Option<Arc<PendingSearch>>> {
        let op = self.registry.lock()?.remove(id);
        if op.is_none() {
            warn!(%id, "completion for a request that is not pending");
        }
        Ok(op)
    }

    pub fn pending(&self) -> Result<usize> {
        Ok(self.registry.lock()?.len())
    }

    fn dispatcher(&self) -> Dispatcher<'_, T> {
        Dispatcher {
            transport: &self.transport,
            allocator: &self.allocator,
            registry: &self.registry,
        }
    }
}

impl<T: Transport> Drop for Client<T> {
    fn drop(&mut self) {
        if let Ok(mut registry) = self.registry.lock() {
            let ids = registry.ids();
            let abandoned = registry.clear();
            if abandoned > 0 {
                warn!(abandoned, ?ids, "client session closed with searches pending");
            }
        }
    }
}

fn check_space(space: &str) -> Result<()> {
    if space.is_empty() {
        return Err(ClientError::Value("space name cannot be empty".into()));
    }
    if !SPACE_NAME.is_match(space) {
        return Err(ClientError::Value(format!("'{}' is not a valid space name", space)));
    }
    Ok(())
}

fn check_attribute(attribute: &str) -> Result<()> {
    if !ATTRIBUTE_NAME.is_match(attribute) {
        return Err(ClientError::Value(format!("'{}' is not a valid attribute name", attribute)));
    }
    Ok(())
}

fn check_attributes(predicate: &Predicate) -> Result<()> {
    predicate.iter().try_for_each(|(attribute, _)| check_attribute(attribute))
}
