//! Database models for the storage layer.
//!
//! These types map directly to database rows and are used for sqlx
//! queries. They are converted into the `haiku-core` wire types before
//! leaving the store.

use chrono::{DateTime, Utc};
use haiku_core::{Note, NoteId, User, UserId};
use sqlx::FromRow;

use crate::error::{StoreError, StoreResult};

/// Database row for the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> StoreResult<Self> {
        Ok(Self {
            id: parse_column::<UserId>("users.id", row.id)?,
            username: row.username,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Database row for the `notes` table.
#[derive(Debug, Clone, FromRow)]
pub struct NoteRow {
    pub id: String,
    /// Note text.
    pub data: String,
    pub sort_order: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<NoteRow> for Note {
    type Error = StoreError;

    fn try_from(row: NoteRow) -> StoreResult<Self> {
        Ok(Self {
            id: parse_column::<NoteId>("notes.id", row.id)?,
            text: row.data,
            order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Parse an identifier column, reporting which column held a bad value.
pub(crate) fn parse_column<T>(column: &str, value: String) -> StoreResult<T>
where
    T: TryFrom<String, Error = haiku_core::IdError>,
{
    T::try_from(value).map_err(|e| StoreError::CorruptRow(format!("{}: {}", column, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_row(id: &str) -> NoteRow {
        let now = Utc::now();
        NoteRow {
            id: id.to_string(),
            data: "hello".to_string(),
            sort_order: 2.0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_note_row_into_note() {
        let row = note_row(&"a".repeat(128));
        let note = Note::try_from(row.clone()).unwrap();
        assert_eq!(note.id.as_str(), row.id);
        assert_eq!(note.text, "hello");
        assert_eq!(note.order, 2.0);
    }

    #[test]
    fn test_corrupt_note_row() {
        let err = Note::try_from(note_row("short")).unwrap_err();
        assert!(matches!(err, StoreError::CorruptRow(msg) if msg.starts_with("notes.id")));
    }

    #[test]
    fn test_user_row_into_user() {
        let now = Utc::now();
        let row = UserRow {
            id: "f".repeat(128),
            username: String::new(),
            email: String::new(),
            created_at: now,
            updated_at: now,
        };
        let user = User::try_from(row).unwrap();
        assert_eq!(user.id.as_str().len(), 128);
        assert_eq!(user.created_at, now);
    }
}
