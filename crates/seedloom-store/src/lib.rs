//! Record store adapters.

pub mod error;
pub mod memory;
pub mod options;
pub mod pocketbase;

pub use error::{Result, StoreError};
pub use memory::{MemoryStore, new_record_id};
pub use options::{DEFAULT_AUTH_PATH, DEFAULT_URL, StoreOptions};
pub use pocketbase::PocketBaseStore;

pub use seedloom_core::RecordStore;
