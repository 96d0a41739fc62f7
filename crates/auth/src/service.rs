//! Auth-Service fuer den Lizenzserver
//!
//! Zentraler Einstiegspunkt fuer Registrierung, Login, Logout und
//! Passwortwechsel. Argon2-Berechnungen laufen auf dem Blocking-Pool von
//! tokio, Persistenz-Aufrufe mit Zeitlimit.

use std::{sync::Arc, time::Duration};

use lizenzserver_core::UserId;
use lizenzserver_db::{
    models::{BenutzerRecord, NeuerBenutzer, TokenRecord},
    zeitlimit::mit_zeitlimit,
    Persistenz, UserRepository,
};

use crate::{
    error::{AuthError, AuthResult},
    password::{passwort_verifizieren, PasswortHasher},
    token::TokenService,
};

/// Auth-Service – zentraler Einstiegspunkt fuer alle Authentifizierungsvorgaenge
pub struct AuthService<P: Persistenz> {
    db: Arc<P>,
    hasher: PasswortHasher,
    tokens: TokenService<P>,
    zeitlimit: Duration,
}

impl<P: Persistenz> AuthService<P> {
    /// Erstellt einen neuen AuthService
    pub fn neu(
        db: Arc<P>,
        hasher: PasswortHasher,
        token_gueltigkeit: Duration,
        zeitlimit: Duration,
    ) -> AuthResult<Self> {
        let tokens = TokenService::neu(Arc::clone(&db), token_gueltigkeit, zeitlimit)?;
        Ok(Self {
            db,
            hasher,
            tokens,
            zeitlimit,
        })
    }

    /// Zugriff auf den Token-Service (fuer das Auth-Gate)
    pub fn tokens(&self) -> &TokenService<P> {
        &self.tokens
    }

    /// Registriert einen neuen Benutzer und stellt direkt ein Token aus
    pub async fn registrieren(
        &self,
        username: &str,
        passwort: &str,
    ) -> AuthResult<(BenutzerRecord, TokenRecord)> {
        eingaben_pruefen(username, passwort)?;

        // Vorab-Pruefung spart das Hashing; die UNIQUE-Constraint entscheidet
        if mit_zeitlimit(self.zeitlimit, self.db.get_by_name(username))
            .await?
            .is_some()
        {
            return Err(AuthError::BenutzernameVergeben(username.to_string()));
        }

        let passwort_hash = self.hash_berechnen(passwort).await?;

        let benutzer = match mit_zeitlimit(
            self.zeitlimit,
            self.db.create(NeuerBenutzer {
                username,
                password_hash: &passwort_hash,
            }),
        )
        .await
        {
            Ok(b) => b,
            Err(e) if e.ist_eindeutigkeit() => {
                return Err(AuthError::BenutzernameVergeben(username.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let token = self.tokens.ausstellen(&benutzer).await?;

        tracing::info!(
            user_id = %benutzer.id,
            username = %benutzer.username,
            "Neuer Benutzer registriert"
        );

        Ok((benutzer, token))
    }

    /// Prueft Benutzername und Passwort
    ///
    /// Unbekannte Benutzer liefern `BenutzerNichtGefunden`, falsche
    /// Passwoerter `UngueltigeAnmeldedaten`. Ein beschaedigter Hash in der
    /// Datenbank wird wie ein falsches Passwort behandelt.
    pub async fn authentifizieren(
        &self,
        username: &str,
        passwort: &str,
    ) -> AuthResult<BenutzerRecord> {
        let benutzer = match mit_zeitlimit(self.zeitlimit, self.db.get_by_name(username)).await? {
            Some(b) => b,
            None => {
                // Gleiche Antwortzeit wie bei existierenden Benutzern
                let hasher = self.hasher.clone();
                let kandidat = passwort.to_owned();
                blockierend(move || {
                    hasher.dummy_verifizieren(&kandidat);
                    Ok(())
                })
                .await?;
                return Err(AuthError::BenutzerNichtGefunden(username.to_string()));
            }
        };

        let hash = benutzer.password_hash.clone();
        let kandidat = passwort.to_owned();
        match blockierend(move || passwort_verifizieren(&hash, &kandidat)).await {
            Ok(true) => Ok(benutzer),
            Ok(false) => {
                tracing::warn!(user_id = %benutzer.id, "Fehlgeschlagener Login-Versuch");
                Err(AuthError::UngueltigeAnmeldedaten)
            }
            Err(e @ (AuthError::UngueltigerHash(_) | AuthError::NichtUnterstuetzteVersion(_))) => {
                tracing::warn!(
                    user_id = %benutzer.id,
                    fehler = %e,
                    "Gespeicherter Passwort-Hash nicht verwendbar"
                );
                Err(AuthError::UngueltigeAnmeldedaten)
            }
            Err(e) => Err(e),
        }
    }

    /// Meldet einen Benutzer an und stellt ein neues Token aus
    pub async fn anmelden(
        &self,
        username: &str,
        passwort: &str,
    ) -> AuthResult<(BenutzerRecord, TokenRecord)> {
        eingaben_pruefen(username, passwort)?;
        let benutzer = self.authentifizieren(username, passwort).await?;
        let token = self.tokens.ausstellen(&benutzer).await?;

        tracing::info!(
            user_id = %benutzer.id,
            username = %benutzer.username,
            "Benutzer angemeldet"
        );

        Ok((benutzer, token))
    }

    /// Meldet ab, indem das verwendete Token widerrufen wird
    pub async fn abmelden(&self, secret: &str) -> AuthResult<()> {
        self.tokens.widerrufen(secret).await?;
        tracing::debug!("Token widerrufen (Abmeldung)");
        Ok(())
    }

    /// Loest ein Token zum Benutzer auf
    pub async fn token_validieren(&self, secret: &str) -> AuthResult<BenutzerRecord> {
        self.tokens.validieren(secret).await
    }

    /// Aendert das Passwort eines Benutzers
    ///
    /// Erfordert das alte Passwort. Bisherige Tokens werden durch den
    /// geaenderten Fingerabdruck ungueltig und zusaetzlich geloescht.
    pub async fn passwort_aendern(
        &self,
        user_id: UserId,
        altes_passwort: &str,
        neues_passwort: &str,
    ) -> AuthResult<()> {
        if neues_passwort.is_empty() {
            return Err(AuthError::UngueltigeEingabe(
                "Neues Passwort darf nicht leer sein".into(),
            ));
        }

        let benutzer = mit_zeitlimit(self.zeitlimit, self.db.get_by_id(user_id))
            .await?
            .ok_or_else(|| AuthError::BenutzerNichtGefunden(user_id.to_string()))?;

        let hash = benutzer.password_hash.clone();
        let kandidat = altes_passwort.to_owned();
        if !blockierend(move || passwort_verifizieren(&hash, &kandidat)).await? {
            return Err(AuthError::UngueltigeAnmeldedaten);
        }

        let neuer_hash = self.hash_berechnen(neues_passwort).await?;
        mit_zeitlimit(
            self.zeitlimit,
            self.db.update_password_hash(user_id, &neuer_hash),
        )
        .await?;

        let anzahl = self.tokens.alle_widerrufen(user_id).await?;
        tracing::info!(
            user_id = %user_id,
            widerrufene_tokens = anzahl,
            "Passwort geaendert, Tokens widerrufen"
        );

        Ok(())
    }

    async fn hash_berechnen(&self, passwort: &str) -> AuthResult<String> {
        let hasher = self.hasher.clone();
        let passwort = passwort.to_owned();
        blockierend(move || hasher.hashen(&passwort)).await
    }
}

fn eingaben_pruefen(username: &str, passwort: &str) -> AuthResult<()> {
    if username.trim().is_empty() || passwort.is_empty() {
        return Err(AuthError::UngueltigeEingabe(
            "Benutzername und Passwort duerfen nicht leer sein".into(),
        ));
    }
    Ok(())
}

/// Fuehrt rechenintensive Argon2-Arbeit auf dem Blocking-Pool aus
async fn blockierend<T, F>(f: F) -> AuthResult<T>
where
    F: FnOnce() -> AuthResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AuthError::intern(format!("Hashing-Task abgebrochen: {e}")))?
}
