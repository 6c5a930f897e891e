//! hyperclient – predicate-based searches for a HyperDex client session.
//!
//! A search starts from a [`predicate::Predicate`]: a mapping from attribute
//! name to either an equality or a range constraint. Dispatching one goes
//! through four steps:
//! * [`translate`] splits the predicate into an equality array and a range
//!   array, each held in a [`buffer::ConstraintBuffer`] drawn from a
//!   [`buffer::BufferAllocator`].
//! * [`search`] hands both arrays to the [`transport::Transport`], which
//!   answers with a request id and a status slot.
//! * The buffers are released once the transport has returned, whether or
//!   not it accepted the request.
//! * An accepted request is recorded in the session's
//!   [`registry::RequestRegistry`] until its completion is delivered.
//!
//! Rejections are reported as [`error::ClientError`]: `Value` for malformed
//! criteria, `Type` for values that do not fit the space, `Memory` for
//! allocation failures, and `HyperClient` carrying any other raw [`status::Status`].
//!
//! ## Quick Start
//! ```
//! use hyperclient::client::Client;
//! use hyperclient::config::ClientConfig;
//! use hyperclient::predicate::Predicate;
//! use hyperclient::transport::{ResultSlots, SearchCall, SortedSearchCall, Transport};
//!
//! struct Accepting(i64);
//! impl Transport for Accepting {
//!     fn sorted_search(&mut self, _: &SortedSearchCall<'_>, _: &ResultSlots) -> i64 { self.0 += 1; self.0 }
//!     fn search(&mut self, _: &SearchCall<'_>, _: &ResultSlots) -> i64 { self.0 += 1; self.0 }
//! }
//!
//! let client = Client::new(Accepting(0), ClientConfig::defaults());
//! let predicate = Predicate::new().equals("age", 30);
//! let op = client.sorted_search("people", &predicate, "age", 10u64, false).unwrap();
//! assert_eq!(op.id().get(), 1);
//! assert_eq!(client.pending().unwrap(), 1);
//! ```
//!
//! The transport, the loop that delivers completions, and space management
//! are not part of this crate.

pub mod buffer;
pub mod client;
pub mod config;
pub mod datatype;
pub mod error;
pub mod predicate;
pub mod registry;
pub mod search;
pub mod status;
pub mod translate;
pub mod transport;

pub use client::Client;
pub use error::{ClientError, Result};
