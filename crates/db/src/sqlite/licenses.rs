//! SQLite-Implementierung des LicenseRepository

use async_trait::async_trait;
use chrono::Utc;
use lizenzserver_core::{ProductId, UserId};

use crate::error::DbError;
use crate::models::{LizenzSchluesselRecord, NeuerLizenzSchluessel};
use crate::repository::{DbResult, LicenseRepository};
use crate::sqlite::pool::SqliteDb;

#[async_trait]
impl LicenseRepository for SqliteDb {
    async fn entitled_key_ids(&self, user_id: UserId) -> DbResult<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT l.key_id
             FROM licenses l
             INNER JOIN user_purchases p ON p.product_id = l.product_id
             WHERE p.user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn key_material(&self, key_id: &str) -> DbResult<Option<String>> {
        let material: Option<String> =
            sqlx::query_scalar("SELECT encryption_key FROM licenses WHERE key_id = ?")
                .bind(key_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(material)
    }

    async fn add_license_key(
        &self,
        data: NeuerLizenzSchluessel<'_>,
    ) -> DbResult<LizenzSchluesselRecord> {
        let now = Utc::now();

        let ergebnis = sqlx::query(
            "INSERT INTO licenses (key_id, encryption_key, product_id, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(data.key_id)
        .bind(data.encryption_key)
        .bind(data.product_id.inner())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::aus_insert(e, || "Key-ID existiert bereits".to_string()))?;

        Ok(LizenzSchluesselRecord {
            id: ergebnis.last_insert_rowid(),
            key_id: data.key_id.to_string(),
            product_id: data.product_id,
            created_at: now,
        })
    }

    async fn grant_product(&self, user_id: UserId, product_id: ProductId) -> DbResult<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO user_purchases (user_id, product_id, purchased_at)
             VALUES (?, ?, ?)",
        )
        .bind(user_id.to_string())
        .bind(product_id.inner())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
