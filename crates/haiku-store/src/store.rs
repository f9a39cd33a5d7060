//! Main store implementation for database operations.
//!
//! The `Store` type provides the CRUD operations for users and notes.
//! Ownership of a note is enforced in SQL: every statement that addresses a
//! single note for a user filters on both `id` and `owner_id`.

use haiku_core::{Note, NoteDetailList, NoteId, NoteList, User, UserId, UserList};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::error::{StoreError, StoreResult};
use crate::models::{NoteRow, UserRow, parse_column};
use crate::schema;

/// Configuration for connecting to the database.
#[derive(Clone)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Minimum number of connections to maintain.
    pub min_connections: u32,
    /// Run migrations on connect.
    pub run_migrations: bool,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("run_migrations", &self.run_migrations)
            .finish_non_exhaustive()
    }
}

impl StoreConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads:
    /// - `DB_HOST` - Optional, defaults to `localhost`
    /// - `DB_PORT` - Optional, defaults to 5432
    /// - `DB_DATABASE`, `DB_USER`, `DB_PASSWORD` - Required
    /// - `DB_MAX_CONNECTIONS` - Optional, defaults to 10
    /// - `DB_MIN_CONNECTIONS` - Optional, defaults to 1
    /// - `DB_RUN_MIGRATIONS` - Optional, defaults to true
    pub fn from_env() -> StoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> StoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let required = |key: &str| {
            non_empty(key).ok_or_else(|| {
                StoreError::Config(format!("{} environment variable not set", key))
            })
        };

        let host = non_empty("DB_HOST").unwrap_or_else(|| {
            tracing::info!("undefined db host, defaulting to localhost");
            "localhost".to_string()
        });

        let port = match non_empty("DB_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| StoreError::Config(format!("invalid DB_PORT: {}", raw)))?,
            None => {
                tracing::info!("undefined db port, defaulting to 5432");
                5432
            }
        };

        let database = required("DB_DATABASE")?;
        let user = required("DB_USER")?;
        let password = required("DB_PASSWORD")?;

        let max_connections = non_empty("DB_MAX_CONNECTIONS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        let min_connections = non_empty("DB_MIN_CONNECTIONS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);

        let run_migrations = non_empty("DB_RUN_MIGRATIONS")
            .map(|s| s.to_lowercase() != "false" && s != "0")
            .unwrap_or(true);

        Ok(Self {
            host,
            port,
            database,
            user,
            password,
            max_connections,
            min_connections,
            run_migrations,
        })
    }

    /// Connection options for the configured server.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
    }
}

/// Visibility of a single note read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadScope {
    /// Only the owner can read a note.
    #[default]
    Owner,
    /// Any user path can read any note by id.
    Any,
}

/// Database store for users and notes.
#[derive(Debug, Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Connect to the database with the given configuration.
    ///
    /// Optionally runs migrations if `config.run_migrations` is true.
    pub async fn connect(config: StoreConfig) -> StoreResult<Self> {
        tracing::info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "Connecting to database..."
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_with(config.connect_options())
            .await?;

        let store = Self { pool };
        store.ping().await?;
        tracing::info!("Connected to database");

        if config.run_migrations {
            schema::run_migrations(&store.pool).await?;
        } else if !schema::is_schema_initialized(&store.pool).await? {
            tracing::warn!("Migrations disabled and schema is not initialized");
        }

        Ok(store)
    }

    /// Create a store from an existing connection pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check that the database answers.
    pub async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ==================== User Operations ====================

    /// Insert a new user with a server-generated id.
    pub async fn create_user(&self, id: &UserId) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id)
            VALUES ($1)
            RETURNING id, username, email, created_at, updated_at
            "#,
        )
        .bind(id.as_str())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &UserId) -> StoreResult<User> {
        sqlx::query_as::<_, UserRow>(
            r#"SELECT id, username, email, created_at, updated_at FROM users WHERE id = $1"#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::UserNotFound(id.clone()))?
        .try_into()
    }

    /// List the ids of all users, oldest first.
    pub async fn list_users(&self) -> StoreResult<UserList> {
        let ids: Vec<String> = sqlx::query_scalar(r#"SELECT id FROM users ORDER BY created_at, id"#)
            .fetch_all(&self.pool)
            .await?;

        let users = ids
            .into_iter()
            .map(|id| parse_column("users.id", id))
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(UserList { users })
    }

    // ==================== Note Operations ====================

    /// List the ids of a user's notes, ordered by their sort key.
    pub async fn list_notes(&self, user: &UserId) -> StoreResult<NoteList> {
        let ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT n.id
            FROM notes AS n
            JOIN users AS u ON n.owner_id = u.id
            WHERE u.id = $1
            ORDER BY n.sort_order, n.created_at, n.id
            "#,
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await?;

        let notes = ids
            .into_iter()
            .map(|id| parse_column("notes.id", id))
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(NoteList { notes })
    }

    /// List a user's full notes, ordered by their sort key.
    pub async fn get_note_detail_list(&self, user: &UserId) -> StoreResult<NoteDetailList> {
        let rows = sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT n.id, n.data, n.sort_order, n.created_at, n.updated_at
            FROM notes AS n
            JOIN users AS u ON n.owner_id = u.id
            WHERE u.id = $1
            ORDER BY n.sort_order, n.created_at, n.id
            "#,
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await?;

        let notes = rows
            .into_iter()
            .map(Note::try_from)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(NoteDetailList { notes })
    }

    /// Get a single note.
    ///
    /// With [`ReadScope::Owner`] the note must belong to `user`; with
    /// [`ReadScope::Any`] the owner is not checked.
    pub async fn get_note(&self, user: &UserId, id: &NoteId, scope: ReadScope) -> StoreResult<Note> {
        let row = match scope {
            ReadScope::Owner => {
                sqlx::query_as::<_, NoteRow>(
                    r#"
                    SELECT id, data, sort_order, created_at, updated_at
                    FROM notes WHERE id = $1 AND owner_id = $2
                    "#,
                )
                .bind(id.as_str())
                .bind(user.as_str())
                .fetch_optional(&self.pool)
                .await?
            }
            ReadScope::Any => {
                sqlx::query_as::<_, NoteRow>(
                    r#"
                    SELECT id, data, sort_order, created_at, updated_at
                    FROM notes WHERE id = $1
                    "#,
                )
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await?
            }
        };

        row.ok_or_else(|| StoreError::NoteNotFound(id.clone()))?
            .try_into()
    }

    /// Insert a new note owned by `user`.
    pub async fn create_note(
        &self,
        user: &UserId,
        id: &NoteId,
        text: &str,
        order: f64,
    ) -> StoreResult<Note> {
        require_text(text)?;

        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            INSERT INTO notes (id, owner_id, data, sort_order)
            VALUES ($1, $2, $3, $4)
            RETURNING id, data, sort_order, created_at, updated_at
            "#,
        )
        .bind(id.as_str())
        .bind(user.as_str())
        .bind(text)
        .bind(order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                StoreError::UserNotFound(user.clone())
            }
            other => StoreError::from(other),
        })?;

        row.try_into()
    }

    /// Replace the text and order of a note owned by `user`.
    ///
    /// Fails with `NoteNotFound` without touching any row if the note does
    /// not exist or belongs to someone else.
    pub async fn update_note(
        &self,
        user: &UserId,
        id: &NoteId,
        text: &str,
        order: f64,
    ) -> StoreResult<()> {
        require_text(text)?;

        let result = sqlx::query(
            r#"
            UPDATE notes
            SET data = $1, sort_order = $2, updated_at = NOW()
            WHERE id = $3 AND owner_id = $4
            "#,
        )
        .bind(text)
        .bind(order)
        .bind(id.as_str())
        .bind(user.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NoteNotFound(id.clone()));
        }

        Ok(())
    }

    /// Delete a note owned by `user`.
    pub async fn delete_note(&self, user: &UserId, id: &NoteId) -> StoreResult<()> {
        let result = sqlx::query(r#"DELETE FROM notes WHERE id = $1 AND owner_id = $2"#)
            .bind(id.as_str())
            .bind(user.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NoteNotFound(id.clone()));
        }

        Ok(())
    }
}

fn require_text(text: &str) -> StoreResult<()> {
    if text.is_empty() {
        return Err(StoreError::InvalidArgument("text"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("DB_DATABASE", "haiku"),
        ("DB_USER", "haiku"),
        ("DB_PASSWORD", "secret"),
    ];

    #[test]
    fn test_config_defaults() {
        let config = StoreConfig::from_lookup(lookup(REQUIRED)).unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert!(config.run_migrations);
    }

    #[test]
    fn test_config_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
            ("DB_RUN_MIGRATIONS", "false"),
        ]);
        let config = StoreConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 6543);
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_config_requires_credentials() {
        for missing in ["DB_DATABASE", "DB_USER", "DB_PASSWORD"] {
            let vars: Vec<_> = REQUIRED
                .iter()
                .copied()
                .filter(|(k, _)| *k != missing)
                .collect();
            let err = StoreConfig::from_lookup(lookup(&vars)).unwrap_err();
            assert!(
                matches!(&err, StoreError::Config(msg) if msg.contains(missing)),
                "unexpected error for {}: {}",
                missing,
                err
            );
        }
    }

    #[test]
    fn test_config_rejects_bad_port() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("DB_PORT", "not-a-port"));
        assert!(StoreConfig::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_config_debug_hides_password() {
        let config = StoreConfig::from_lookup(lookup(REQUIRED)).unwrap();
        assert!(!format!("{:?}", config).contains("secret"));
    }

    #[test]
    fn test_require_text() {
        assert!(require_text("x").is_ok());
        assert!(matches!(
            require_text(""),
            Err(StoreError::InvalidArgument("text"))
        ));
    }

    #[test]
    fn test_read_scope_default_is_owner() {
        assert_eq!(ReadScope::default(), ReadScope::Owner);
    }
}
