//! SQLite-Implementierung des TokenRepository

use async_trait::async_trait;
use lizenzserver_core::UserId;
use uuid::Uuid;

use crate::models::{NeuesToken, TokenRecord};
use crate::repository::{DbResult, TokenRepository};
use crate::sqlite::{parse_datetime, parse_user_id, parse_uuid, pool::SqliteDb};

#[async_trait]
impl TokenRepository for SqliteDb {
    async fn store(&self, data: NeuesToken<'_>) -> DbResult<TokenRecord> {
        let id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO user_tokens (id, user_id, secret, password_fingerprint, issued_at, expires_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(data.user_id.to_string())
        .bind(data.secret)
        .bind(data.password_fingerprint)
        .bind(data.issued_at.to_rfc3339())
        .bind(data.expires_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(TokenRecord {
            id,
            user_id: data.user_id,
            secret: data.secret.to_string(),
            password_fingerprint: data.password_fingerprint.to_string(),
            issued_at: data.issued_at,
            expires_at: data.expires_at,
        })
    }

    async fn get_by_secret(&self, secret: &str) -> DbResult<Option<TokenRecord>> {
        let row = sqlx::query(
            "SELECT id, user_id, secret, password_fingerprint, issued_at, expires_at
             FROM user_tokens WHERE secret = ?",
        )
        .bind(secret)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_token(&r)).transpose()
    }

    async fn delete_by_secret(&self, secret: &str) -> DbResult<bool> {
        let affected = sqlx::query("DELETE FROM user_tokens WHERE secret = ?")
            .bind(secret)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn delete_for_user(&self, user_id: UserId) -> DbResult<u64> {
        let affected = sqlx::query("DELETE FROM user_tokens WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected)
    }
}

fn row_to_token(row: &sqlx::sqlite::SqliteRow) -> DbResult<TokenRecord> {
    use sqlx::Row as _;

    let id_str: String = row.try_get("id")?;
    let user_id_str: String = row.try_get("user_id")?;
    let issued_at: String = row.try_get("issued_at")?;
    let expires_at: String = row.try_get("expires_at")?;

    Ok(TokenRecord {
        id: parse_uuid(&id_str)?,
        user_id: parse_user_id(&user_id_str)?,
        secret: row.try_get("secret")?,
        password_fingerprint: row.try_get("password_fingerprint")?,
        issued_at: parse_datetime("issued_at", &issued_at)?,
        expires_at: parse_datetime("expires_at", &expires_at)?,
    })
}
