//! Repository-Trait-Definitionen
//!
//! Das Repository-Pattern entkoppelt die Geschaeftslogik von der konkreten
//! Datenbank-Implementierung. Die Traits sind bewusst schmal: sie decken
//! genau die Zugriffe ab, die Auth- und Lizenzkern benoetigen.

use std::time::Duration;

use async_trait::async_trait;
use lizenzserver_core::{ProductId, UserId};

use crate::models::{
    BenutzerRecord, LizenzSchluesselRecord, NeuerBenutzer, NeuerLizenzSchluessel, NeuesToken,
    TokenRecord,
};

pub use crate::error::DbResult;

/// Konfiguration fuer die Datenbankverbindung
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Verbindungs-URL (z.B. "sqlite://lizenzserver.db")
    pub url: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen im Pool
    pub max_verbindungen: u32,
    /// Ob WAL-Modus bei SQLite aktiviert werden soll
    pub sqlite_wal: bool,
    /// Sperrwartezeit und Wartezeit auf eine freie Verbindung
    pub zeitlimit: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://lizenzserver.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
            zeitlimit: Duration::from_secs(5),
        }
    }
}

/// Repository fuer Benutzer und ihre Zugangsdaten
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Legt einen neuen Benutzer an. Vergebene Namen liefern `DbError::Eindeutigkeit`.
    async fn create(&self, data: NeuerBenutzer<'_>) -> DbResult<BenutzerRecord>;

    async fn get_by_id(&self, id: UserId) -> DbResult<Option<BenutzerRecord>>;

    /// Laedt die Zugangsdaten anhand des (eindeutigen) Benutzernamens
    async fn get_by_name(&self, username: &str) -> DbResult<Option<BenutzerRecord>>;

    async fn update_password_hash(&self, id: UserId, password_hash: &str) -> DbResult<()>;
}

/// Repository fuer Bearer-Tokens
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Speichert ein Token in einer einzelnen atomaren Operation
    async fn store(&self, data: NeuesToken<'_>) -> DbResult<TokenRecord>;

    /// Sucht ein Token per exaktem Vergleich. Ablauf wird NICHT geprueft.
    async fn get_by_secret(&self, secret: &str) -> DbResult<Option<TokenRecord>>;

    /// Loescht ein Token. Gibt `true` zurueck wenn ein Datensatz entfernt wurde.
    async fn delete_by_secret(&self, secret: &str) -> DbResult<bool>;

    /// Loescht alle Tokens eines Benutzers und gibt die Anzahl zurueck
    async fn delete_for_user(&self, user_id: UserId) -> DbResult<u64>;
}

/// Repository fuer Inhaltsschluessel und Produktbesitz
#[async_trait]
pub trait LicenseRepository: Send + Sync {
    /// Alle Key-IDs (Hex) deren Produkt der Benutzer besitzt
    async fn entitled_key_ids(&self, user_id: UserId) -> DbResult<Vec<String>>;

    /// Schluesselmaterial (Hex) zu einer Key-ID (Hex)
    async fn key_material(&self, key_id: &str) -> DbResult<Option<String>>;

    async fn add_license_key(
        &self,
        data: NeuerLizenzSchluessel<'_>,
    ) -> DbResult<LizenzSchluesselRecord>;

    /// Traegt den Besitz eines Produkts ein (idempotent)
    async fn grant_product(&self, user_id: UserId, product_id: ProductId) -> DbResult<()>;
}

/// Vollstaendige Persistenz-Schnittstelle des Lizenzservers
pub trait Persistenz: UserRepository + TokenRepository + LicenseRepository + 'static {}

impl<T> Persistenz for T where T: UserRepository + TokenRepository + LicenseRepository + 'static {}
