//! Bearer-Token-Verwaltung
//!
//! Tokens sind opake 64-stellige Hex-Strings, die in der Datenbank gespeichert
//! und bei jeder Anfrage per exaktem Vergleich nachgeschlagen werden.
//!
//! Ablauf wird erst beim Nachschlagen geprueft, es gibt keinen Cleanup-Task.
//! Jedes Token traegt den Fingerabdruck des Passwort-Hashes zum
//! Ausstellungszeitpunkt; nach einem Passwortwechsel passt er nicht mehr und
//! das Token ist ungueltig.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use lizenzserver_core::UserId;
use lizenzserver_db::{
    models::{BenutzerRecord, NeuesToken, TokenRecord},
    zeitlimit::mit_zeitlimit,
    Persistenz, TokenRepository, UserRepository,
};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::error::{AuthError, AuthResult};

/// Standard-Gueltigkeit eines Tokens: 7 Tage
pub const STANDARD_GUELTIGKEIT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Stellt Tokens aus, prueft und widerruft sie
pub struct TokenService<P: Persistenz> {
    db: Arc<P>,
    gueltigkeit: chrono::Duration,
    zeitlimit: Duration,
}

impl<P: Persistenz> TokenService<P> {
    pub fn neu(db: Arc<P>, gueltigkeit: Duration, zeitlimit: Duration) -> AuthResult<Self> {
        let gueltigkeit = chrono::Duration::from_std(gueltigkeit)
            .map_err(|e| AuthError::intern(format!("Token-Gueltigkeit ungueltig: {e}")))?;
        Ok(Self {
            db,
            gueltigkeit,
            zeitlimit,
        })
    }

    /// Gueltigkeitsdauer eines neu ausgestellten Tokens
    pub fn gueltigkeit(&self) -> chrono::Duration {
        self.gueltigkeit
    }

    /// Stellt ein neues Token fuer `benutzer` aus
    ///
    /// Das Secret ist SHA-256(UserId ‖ Passwort-Hash ‖ 32 Zufallsbytes).
    pub async fn ausstellen(&self, benutzer: &BenutzerRecord) -> AuthResult<TokenRecord> {
        let secret = secret_erzeugen(benutzer.id, &benutzer.password_hash);
        let fingerabdruck = passwort_fingerabdruck(&benutzer.password_hash);
        let jetzt = Utc::now();

        let token = mit_zeitlimit(
            self.zeitlimit,
            self.db.store(NeuesToken {
                user_id: benutzer.id,
                secret: &secret,
                password_fingerprint: &fingerabdruck,
                issued_at: jetzt,
                expires_at: jetzt + self.gueltigkeit,
            }),
        )
        .await?;

        tracing::debug!(
            user_id = %benutzer.id,
            laeuft_ab_am = %token.expires_at,
            "Token ausgestellt"
        );

        Ok(token)
    }

    /// Loest ein Token zum zugehoerigen Benutzer auf
    ///
    /// Unbekannte, abgelaufene und durch Passwortwechsel entwertete Tokens
    /// sind nicht unterscheidbar: alle liefern `AuthError::TokenUngueltig`.
    /// Die Gueltigkeit wird nie verlaengert.
    pub async fn validieren(&self, secret: &str) -> AuthResult<BenutzerRecord> {
        let token = mit_zeitlimit(self.zeitlimit, self.db.get_by_secret(secret))
            .await?
            .ok_or(AuthError::TokenUngueltig)?;

        if token.ist_abgelaufen(Utc::now()) {
            tracing::debug!(user_id = %token.user_id, "Token abgelaufen");
            return Err(AuthError::TokenUngueltig);
        }

        let benutzer = mit_zeitlimit(self.zeitlimit, self.db.get_by_id(token.user_id))
            .await?
            .ok_or(AuthError::TokenUngueltig)?;

        if passwort_fingerabdruck(&benutzer.password_hash) != token.password_fingerprint {
            tracing::debug!(user_id = %benutzer.id, "Token nach Passwortwechsel verwendet");
            return Err(AuthError::TokenUngueltig);
        }

        Ok(benutzer)
    }

    /// Widerruft ein Token. War es nicht (mehr) vorhanden: `TokenUngueltig`.
    pub async fn widerrufen(&self, secret: &str) -> AuthResult<()> {
        let entfernt = mit_zeitlimit(self.zeitlimit, self.db.delete_by_secret(secret)).await?;
        if !entfernt {
            return Err(AuthError::TokenUngueltig);
        }
        Ok(())
    }

    /// Widerruft alle Tokens eines Benutzers
    pub async fn alle_widerrufen(&self, user_id: UserId) -> AuthResult<u64> {
        Ok(mit_zeitlimit(self.zeitlimit, self.db.delete_for_user(user_id)).await?)
    }
}

/// SHA-256-Fingerabdruck eines Passwort-Hashes (Hex)
pub fn passwort_fingerabdruck(password_hash: &str) -> String {
    hex::encode(Sha256::digest(password_hash.as_bytes()))
}

fn secret_erzeugen(user_id: UserId, password_hash: &str) -> String {
    let mut zufall = [0u8; 32];
    OsRng.fill_bytes(&mut zufall);

    let mut hasher = Sha256::new();
    hasher.update(user_id.inner().as_bytes());
    hasher.update(password_hash.as_bytes());
    hasher.update(zufall);
    hex::encode(hasher.finalize())
}
