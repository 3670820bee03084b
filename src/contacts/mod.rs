//! Per-user contact book
//!
//! - `types`: contact records and request bodies
//! - `scope`: ownership predicate applied to every query
//! - `storage`: storage trait and in-memory backend
//! - `service`: contact operations
//! - `api`: HTTP handlers and routes

pub mod api;
pub mod scope;
pub mod service;
pub mod storage;
pub mod types;

pub use scope::{ContactScope, OwnerScope};
pub use service::ContactService;
pub use storage::{ContactStorage, MemoryContactStorage};
pub use types::{Contact, ContactChanges, ContactFilter, NewContact};
