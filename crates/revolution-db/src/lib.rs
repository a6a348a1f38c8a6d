//! Persistence for the Revolution narrative engine.
//!
//! Saves are JSON records `{ timestamp, state }` stored under
//! `animal_farm_save_<slot>` in a key-value store. There is no format
//! versioning: a record either parses into the current
//! [`revolution_types::GameSnapshot`] or the load fails and the caller's
//! state is left alone.
//!
//! # Modules
//!
//! - [`store`] -- [`SaveStore`] trait with memory and file backends
//! - [`slot`] -- [`SaveSlot`] validation (0 autosave, 1-5 manual, 9 emergency)
//! - [`manager`] -- [`SaveManager`], typed JSON records and slot listing
//! - [`error`] -- Shared error types

pub mod error;
pub mod manager;
pub mod slot;
pub mod store;

pub use error::DbError;
pub use manager::{DEFAULT_KEY_PREFIX, SaveManager, SaveRecord, SlotStatus, SlotSummary};
pub use slot::SaveSlot;
pub use store::{FileStore, MemoryStore, SaveStore};
