//! Contact storage abstraction

pub mod memory;
pub mod r#trait;

pub use memory::MemoryContactStorage;
pub use r#trait::ContactStorage;
