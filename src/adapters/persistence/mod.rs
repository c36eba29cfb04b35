//! Persistence adapters. Snapshot storage for the user profile and device list.

pub mod json_file_store;
pub mod local_store;
pub mod memory_store;

pub use json_file_store::JsonFileStore;
pub use local_store::{DEVICES_KEY, LocalStore, USER_KEY};
pub use memory_store::MemoryStore;
