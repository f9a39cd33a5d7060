//! haiku-store: Storage layer for the haiku notes service
//!
//! This crate provides:
//! - PostgreSQL storage for users and notes
//! - Owner-scoped note reads, updates and deletes
//! - Migration management
//! - Type-safe database operations via sqlx
//!
//! # Usage
//!
//! ```rust,ignore
//! use haiku_store::{ReadScope, Store, StoreConfig};
//!
//! let config = StoreConfig::from_env()?;
//! let store = Store::connect(config).await?;
//!
//! let notes = store.list_notes(&user_id).await?;
//! let note = store.get_note(&user_id, &notes.notes[0], ReadScope::Owner).await?;
//! ```

pub mod error;
pub mod models;
pub mod schema;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use models::{NoteRow, UserRow};
pub use store::{ReadScope, Store, StoreConfig};

// Re-export haiku-core for downstream crates
pub use haiku_core;
