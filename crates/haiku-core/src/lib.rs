//! haiku-core: identifiers and domain types shared by the store and server.
//!
//! This crate provides:
//! - Fixed-length random identifiers (`UserId`, `NoteId`) and their generator
//! - The `User` and `Note` wire types and list wrappers

pub mod identity;
pub mod types;

pub use identity::{IdError, generate_id, random_token};
pub use types::{ID_LEN, Note, NoteDetailList, NoteId, NoteList, User, UserId, UserList, validate_id};
