//! Datenbankmodelle fuer den Lizenzserver
//!
//! Diese Typen repraesentieren Datensaetze aus der Datenbank und dienen als
//! reine Datenuebertragungsobjekte zwischen Repository und Services.

use chrono::{DateTime, Utc};
use lizenzserver_core::{ProductId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Benutzer
// ---------------------------------------------------------------------------

/// Benutzer-Datensatz aus der Datenbank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenutzerRecord {
    pub id: UserId,
    pub username: String,
    /// Argon2id-PHC-String
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Daten zum Erstellen eines neuen Benutzers
#[derive(Debug, Clone)]
pub struct NeuerBenutzer<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Gespeichertes Bearer-Token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub id: Uuid,
    pub user_id: UserId,
    /// Opaker Token-Wert (64 Hex-Zeichen), wird nur per exaktem Vergleich gesucht
    pub secret: String,
    /// Fingerabdruck des Passwort-Hashes zum Ausstellungszeitpunkt
    pub password_fingerprint: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Abgelaufen sobald `expires_at <= jetzt`
    pub fn ist_abgelaufen(&self, jetzt: DateTime<Utc>) -> bool {
        self.expires_at <= jetzt
    }
}

/// Daten zum Speichern eines neuen Tokens
#[derive(Debug, Clone)]
pub struct NeuesToken<'a> {
    pub user_id: UserId,
    pub secret: &'a str,
    pub password_fingerprint: &'a str,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Lizenzschluessel
// ---------------------------------------------------------------------------

/// Metadaten eines gespeicherten Inhaltsschluessels (ohne Schluesselmaterial)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LizenzSchluesselRecord {
    pub id: i64,
    pub key_id: String,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
}

/// Daten zum Anlegen eines Inhaltsschluessels
///
/// `key_id` und `encryption_key` muessen bereits normalisiertes Hex sein.
#[derive(Debug, Clone)]
pub struct NeuerLizenzSchluessel<'a> {
    pub key_id: &'a str,
    pub encryption_key: &'a str,
    pub product_id: ProductId,
}
