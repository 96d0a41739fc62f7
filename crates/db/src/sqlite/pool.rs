//! Oeffnen der SQLite-Datenbank
//!
//! Sperrwartezeit (`busy_timeout`) und Wartezeit auf eine freie Verbindung
//! richten sich nach dem Zeitlimit der Persistenz-Aufrufe. So kann ein
//! einzelner Aufruf nie laenger auf SQLite warten, als der Service ihm
//! zugesteht.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::DbResult;
use crate::repository::DatabaseConfig;

/// SQLite-Backend aller Repository-Traits
#[derive(Debug, Clone)]
pub struct SqliteDb {
    pub(crate) pool: SqlitePool,
}

impl SqliteDb {
    /// Oeffnet die Datenbank laut Konfiguration und fuehrt Migrationen aus
    pub async fn oeffnen(config: &DatabaseConfig) -> DbResult<Self> {
        let journal = if config.sqlite_wal {
            SqliteJournalMode::Wal
        } else {
            SqliteJournalMode::Delete
        };
        let optionen = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .journal_mode(journal)
            .foreign_keys(true)
            .busy_timeout(config.zeitlimit);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_verbindungen)
            .acquire_timeout(config.zeitlimit)
            .connect_with(optionen)
            .await?;

        info!(
            url = %config.url,
            wal = config.sqlite_wal,
            zeitlimit_ms = config.zeitlimit.as_millis() as u64,
            "SQLite-Datenbank geoeffnet"
        );

        Self::migriert(pool).await
    }

    /// In-Memory-Datenbank mit genau einer Verbindung (fuer Tests)
    pub async fn in_memory() -> DbResult<Self> {
        let optionen = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // Jede Verbindung haette sonst ihre eigene leere Datenbank
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .connect_with(optionen)
            .await?;

        Self::migriert(pool).await
    }

    async fn migriert(pool: SqlitePool) -> DbResult<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        debug!("Datenbank-Migrationen abgeschlossen");
        Ok(Self { pool })
    }

    /// Prueft ob die Datenbank erreichbar ist (fuer den Health-Check)
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
