//! SQLite-Implementierung des UserRepository

use async_trait::async_trait;
use chrono::Utc;
use lizenzserver_core::UserId;

use crate::error::DbError;
use crate::models::{BenutzerRecord, NeuerBenutzer};
use crate::repository::{DbResult, UserRepository};
use crate::sqlite::{parse_datetime, parse_user_id, pool::SqliteDb};

#[async_trait]
impl UserRepository for SqliteDb {
    async fn create(&self, data: NeuerBenutzer<'_>) -> DbResult<BenutzerRecord> {
        let id = UserId::new();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO users (id, username, password_hash, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(data.username)
        .bind(data.password_hash)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DbError::aus_insert(e, || {
                format!("Benutzername '{}' bereits vergeben", data.username)
            })
        })?;

        Ok(BenutzerRecord {
            id,
            username: data.username.to_string(),
            password_hash: data.password_hash.to_string(),
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: UserId) -> DbResult<Option<BenutzerRecord>> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn get_by_name(&self, username: &str) -> DbResult<Option<BenutzerRecord>> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn update_password_hash(&self, id: UserId, password_hash: &str) -> DbResult<()> {
        let affected = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(DbError::nicht_gefunden(format!("User {id}")));
        }
        Ok(())
    }
}

fn row_to_benutzer(row: &sqlx::sqlite::SqliteRow) -> DbResult<BenutzerRecord> {
    use sqlx::Row as _;

    let id_str: String = row.try_get("id")?;
    let created_at_str: String = row.try_get("created_at")?;

    Ok(BenutzerRecord {
        id: parse_user_id(&id_str)?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        created_at: parse_datetime("created_at", &created_at_str)?,
    })
}
