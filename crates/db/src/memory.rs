//! In-Memory-Implementierung aller Repository-Traits
//!
//! Test-Double fuer Unit- und Integrationstests der Services und der
//! REST-Schicht. Verhaelt sich wie das SQLite-Backend (Eindeutigkeit von
//! Benutzernamen und Key-IDs, idempotenter Produktbesitz). Zusaetzlich
//! lassen sich Ausfaelle und langsame Antworten simulieren.

use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use lizenzserver_core::{ProductId, UserId};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{
    BenutzerRecord, LizenzSchluesselRecord, NeuerBenutzer, NeuerLizenzSchluessel, NeuesToken,
    TokenRecord,
};
use crate::repository::{LicenseRepository, TokenRepository, UserRepository};

#[derive(Debug)]
struct GespeicherterSchluessel {
    record: LizenzSchluesselRecord,
    material: String,
}

#[derive(Debug, Default)]
struct Zustand {
    benutzer: HashMap<UserId, BenutzerRecord>,
    /// secret -> Token
    tokens: HashMap<String, TokenRecord>,
    /// key_id -> Schluessel
    schluessel: HashMap<String, GespeicherterSchluessel>,
    besitz: HashSet<(UserId, ProductId)>,
    naechste_schluessel_id: i64,
}

/// In-Memory-Datenbank
#[derive(Debug, Default)]
pub struct MemoryDb {
    zustand: RwLock<Zustand>,
    ausfall: AtomicBool,
    verzoegerung_ms: AtomicU64,
}

impl MemoryDb {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Laesst alle folgenden Aufrufe mit einem Verbindungsfehler scheitern
    pub fn ausfall_simulieren(&self, aktiv: bool) {
        self.ausfall.store(aktiv, Ordering::SeqCst);
    }

    /// Verzoegert jeden folgenden Aufruf um `dauer`
    pub fn verzoegerung_setzen(&self, dauer: Duration) {
        self.verzoegerung_ms
            .store(dauer.as_millis() as u64, Ordering::SeqCst);
    }

    /// Anzahl gespeicherter Tokens (inklusive abgelaufener)
    pub fn anzahl_tokens(&self) -> usize {
        self.zustand.read().tokens.len()
    }

    async fn vorbereiten(&self) -> DbResult<()> {
        let ms = self.verzoegerung_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        if self.ausfall.load(Ordering::SeqCst) {
            return Err(DbError::intern("Verbindung zur Datenbank verloren (simuliert)"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryDb {
    async fn create(&self, data: NeuerBenutzer<'_>) -> DbResult<BenutzerRecord> {
        self.vorbereiten().await?;
        let mut zustand = self.zustand.write();

        if zustand.benutzer.values().any(|u| u.username == data.username) {
            return Err(DbError::Eindeutigkeit(format!(
                "Benutzername '{}' bereits vergeben",
                data.username
            )));
        }

        let record = BenutzerRecord {
            id: UserId::new(),
            username: data.username.to_string(),
            password_hash: data.password_hash.to_string(),
            created_at: Utc::now(),
        };
        zustand.benutzer.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_by_id(&self, id: UserId) -> DbResult<Option<BenutzerRecord>> {
        self.vorbereiten().await?;
        Ok(self.zustand.read().benutzer.get(&id).cloned())
    }

    async fn get_by_name(&self, username: &str) -> DbResult<Option<BenutzerRecord>> {
        self.vorbereiten().await?;
        Ok(self
            .zustand
            .read()
            .benutzer
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn update_password_hash(&self, id: UserId, password_hash: &str) -> DbResult<()> {
        self.vorbereiten().await?;
        let mut zustand = self.zustand.write();
        let benutzer = zustand
            .benutzer
            .get_mut(&id)
            .ok_or_else(|| DbError::nicht_gefunden(format!("User {id}")))?;
        benutzer.password_hash = password_hash.to_string();
        Ok(())
    }
}

#[async_trait]
impl TokenRepository for MemoryDb {
    async fn store(&self, data: NeuesToken<'_>) -> DbResult<TokenRecord> {
        self.vorbereiten().await?;
        let mut zustand = self.zustand.write();

        if !zustand.benutzer.contains_key(&data.user_id) {
            return Err(DbError::UngueltigeDaten(format!(
                "Token fuer unbekannten User {}",
                data.user_id
            )));
        }
        if zustand.tokens.contains_key(data.secret) {
            return Err(DbError::Eindeutigkeit("Token-Secret existiert bereits".into()));
        }

        let record = TokenRecord {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            secret: data.secret.to_string(),
            password_fingerprint: data.password_fingerprint.to_string(),
            issued_at: data.issued_at,
            expires_at: data.expires_at,
        };
        zustand.tokens.insert(record.secret.clone(), record.clone());
        Ok(record)
    }

    async fn get_by_secret(&self, secret: &str) -> DbResult<Option<TokenRecord>> {
        self.vorbereiten().await?;
        Ok(self.zustand.read().tokens.get(secret).cloned())
    }

    async fn delete_by_secret(&self, secret: &str) -> DbResult<bool> {
        self.vorbereiten().await?;
        Ok(self.zustand.write().tokens.remove(secret).is_some())
    }

    async fn delete_for_user(&self, user_id: UserId) -> DbResult<u64> {
        self.vorbereiten().await?;
        let mut zustand = self.zustand.write();
        let vorher = zustand.tokens.len();
        zustand.tokens.retain(|_, t| t.user_id != user_id);
        Ok((vorher - zustand.tokens.len()) as u64)
    }
}

#[async_trait]
impl LicenseRepository for MemoryDb {
    async fn entitled_key_ids(&self, user_id: UserId) -> DbResult<Vec<String>> {
        self.vorbereiten().await?;
        let zustand = self.zustand.read();
        Ok(zustand
            .schluessel
            .values()
            .filter(|s| zustand.besitz.contains(&(user_id, s.record.product_id)))
            .map(|s| s.record.key_id.clone())
            .collect())
    }

    async fn key_material(&self, key_id: &str) -> DbResult<Option<String>> {
        self.vorbereiten().await?;
        Ok(self
            .zustand
            .read()
            .schluessel
            .get(key_id)
            .map(|s| s.material.clone()))
    }

    async fn add_license_key(
        &self,
        data: NeuerLizenzSchluessel<'_>,
    ) -> DbResult<LizenzSchluesselRecord> {
        self.vorbereiten().await?;
        let mut zustand = self.zustand.write();

        if zustand.schluessel.contains_key(data.key_id) {
            return Err(DbError::Eindeutigkeit(format!(
                "Key-ID '{}' existiert bereits",
                data.key_id
            )));
        }

        zustand.naechste_schluessel_id += 1;
        let record = LizenzSchluesselRecord {
            id: zustand.naechste_schluessel_id,
            key_id: data.key_id.to_string(),
            product_id: data.product_id,
            created_at: Utc::now(),
        };
        zustand.schluessel.insert(
            record.key_id.clone(),
            GespeicherterSchluessel {
                record: record.clone(),
                material: data.encryption_key.to_string(),
            },
        );
        Ok(record)
    }

    async fn grant_product(&self, user_id: UserId, product_id: ProductId) -> DbResult<()> {
        self.vorbereiten().await?;
        let mut zustand = self.zustand.write();
        if !zustand.benutzer.contains_key(&user_id) {
            return Err(DbError::UngueltigeDaten(format!(
                "Besitz fuer unbekannten User {user_id}"
            )));
        }
        zustand.besitz.insert((user_id, product_id));
        Ok(())
    }
}
