use crate::users::directory::UserDirectory;
use crate::users::error::UserDirectoryError;
use crate::users::models::UserContact;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::task;
use tracing::{debug, error, info};
use uuid::Uuid;

/// A SQLite implementation of the UserDirectory trait
pub struct SqliteUserDirectory {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteUserDirectory {
    /// Open (or create) the users table in the database at `db_path`
    pub fn new(db_path: &str) -> Result<Self, UserDirectoryError> {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    error!("Failed to create directory {parent:?}: {e}");
                    UserDirectoryError::OpenError(format!("Failed to create directory: {e}"))
                })?;
            }
        }

        let connection = Connection::open(db_path).map_err(|e| {
            error!("Failed to open SQLite database at {db_path}: {e}");
            UserDirectoryError::OpenError(format!("Failed to open SQLite database: {e}"))
        })?;

        connection
            .execute(
                "CREATE TABLE IF NOT EXISTS users (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    email TEXT UNIQUE
                )",
                [],
            )
            .map_err(|e| {
                error!("Failed to create users table: {e}");
                UserDirectoryError::OpenError(format!("Failed to create users table: {e}"))
            })?;

        info!("SQLite user directory initialized at: {db_path}");
        Ok(SqliteUserDirectory {
            connection: Arc::new(Mutex::new(connection)),
        })
    }
}

#[async_trait]
impl UserDirectory for SqliteUserDirectory {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserContact>, UserDirectoryError> {
        let connection = Arc::clone(&self.connection);
        let id_str = id.to_string();

        task::spawn_blocking(move || {
            let conn = connection
                .lock()
                .map_err(|_| UserDirectoryError::Locked)?;

            conn.query_row(
                "SELECT name, email FROM users WHERE id = ?1",
                params![id_str],
                |row| {
                    Ok(UserContact {
                        id,
                        name: row.get(0)?,
                        email: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(|e| {
                error!("Failed to look up user {id_str}: {e}");
                UserDirectoryError::QueryError(format!("Failed to look up user: {e}"))
            })
        })
        .await
        .map_err(|e| UserDirectoryError::QueryError(format!("Task join error: {e}")))?
    }

    async fn add_user(&self, user: UserContact) -> Result<(), UserDirectoryError> {
        debug!("Adding user: id={}, name={}", user.id, user.name);
        let connection = Arc::clone(&self.connection);

        task::spawn_blocking(move || {
            let conn = connection
                .lock()
                .map_err(|_| UserDirectoryError::Locked)?;

            conn.execute(
                "INSERT INTO users (id, name, email) VALUES (?1, ?2, ?3)",
                params![user.id.to_string(), user.name, user.email],
            )
            .map_err(|e| {
                error!("Failed to insert user {}: {e}", user.id);
                UserDirectoryError::QueryError(format!("Failed to insert user: {e}"))
            })?;
            Ok(())
        })
        .await
        .map_err(|e| UserDirectoryError::QueryError(format!("Task join error: {e}")))?
    }
}
