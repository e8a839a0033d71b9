//! Persistent key-value storage
//!
//! The game only needs three keys: best score, unlocked achievements and
//! whether the tutorial was seen. Storage is an external collaborator with
//! get/set semantics; LocalStorage on the web, an in-memory map elsewhere.
//! Missing or corrupt values always fall back to defaults.

pub mod profile;
pub mod store;

pub use profile::Profile;
pub use store::{KeyValueStore, MemoryStore, StorageError};

#[cfg(target_arch = "wasm32")]
pub use store::LocalStore;
