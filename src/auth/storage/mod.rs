//! User storage abstraction
//!
//! The trait is implemented in memory here and by the sqlite backend in
//! [`crate::storage`].

pub mod memory;
pub mod r#trait;

pub use memory::MemoryUserStorage;
pub use r#trait::UserStorage;
