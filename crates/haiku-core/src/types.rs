//! Core data types for the haiku notes service.
//!
//! Identifiers are opaque, fixed-length tokens. `UserId` and `NoteId` are
//! kept as separate types so that a note's owner can never be compared with
//! a note id by accident.
//!
//! All wire types derive `Serialize` and `Deserialize`; the JSON field names
//! are part of the HTTP contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::identity::{self, IdError};

// ============================================================================
// ID Types
// ============================================================================

/// Length in bytes of every identifier.
pub const ID_LEN: usize = 128;

/// Validate the textual form of an identifier.
///
/// An identifier is exactly [`ID_LEN`] ASCII hex digits.
pub fn validate_id(s: &str) -> Result<(), IdError> {
    if s.is_empty() {
        return Err(IdError::Empty);
    }
    if s.len() != ID_LEN {
        return Err(IdError::InvalidLength(s.len()));
    }
    if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(IdError::InvalidCharacter);
    }
    Ok(())
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn generate() -> Result<Self, IdError> {
                identity::generate_id().map(Self)
            }

            /// Returns the identifier text.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                validate_id(s)?;
                Ok(Self(s.to_string()))
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                validate_id(&s)?;
                Ok(Self(s))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

identifier! {
    /// Identifier of a user. Also used as the owner of a note.
    UserId
}

identifier! {
    /// Identifier of a note.
    NoteId
}

// ============================================================================
// Users
// ============================================================================

/// A user as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ids of all known users.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserList {
    pub users: Vec<UserId>,
}

// ============================================================================
// Notes
// ============================================================================

/// A note as returned by the API.
///
/// The owner is not part of the representation: notes are always addressed
/// through their owner's path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    /// Sort key among the owner's notes, ascending.
    pub order: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Note ids of a single user, in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteList {
    pub notes: Vec<NoteId>,
}

/// Full notes of a single user, in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteDetailList {
    pub notes: Vec<Note>,
}
