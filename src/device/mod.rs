//! Page store abstraction
//!
//! This module provides the trait and implementations for the durable stores
//! fetched pages are persisted to.

mod traits;
mod file_device;
mod memory_device;

pub use traits::PageStore;
pub use file_device::{FileStore, SegmentedStore};
pub use memory_device::MemoryStore;
