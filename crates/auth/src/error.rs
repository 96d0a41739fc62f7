//! Fehlertypen fuer den Auth-Service

use lizenzserver_db::DbError;
use thiserror::Error;

/// Alle moeglichen Fehler im Auth-Service
#[derive(Debug, Error)]
pub enum AuthError {
    // --- Passwort ---
    #[error("Passwort-Hashing fehlgeschlagen: {0}")]
    PasswortHashing(String),

    #[error("Ungueltiger Passwort-Hash: {0}")]
    UngueltigerHash(String),

    #[error("Nicht unterstuetzte Argon2-Version: {0}")]
    NichtUnterstuetzteVersion(u32),

    // --- Authentifizierung ---
    #[error("Benutzer nicht gefunden: {0}")]
    BenutzerNichtGefunden(String),

    #[error("Benutzername oder Passwort falsch")]
    UngueltigeAnmeldedaten,

    // --- Token ---
    #[error("Token ungueltig oder abgelaufen")]
    TokenUngueltig,

    #[error("Nicht angemeldet")]
    NichtAngemeldet,

    // --- Benutzerverwaltung ---
    #[error("Ungueltige Eingabe: {0}")]
    UngueltigeEingabe(String),

    #[error("Benutzername bereits vergeben: {0}")]
    BenutzernameVergeben(String),

    // --- Datenbank ---
    #[error("Persistenz nicht verfuegbar: {0}")]
    PersistenzNichtVerfuegbar(#[from] DbError),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl AuthError {
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Fehler, die ein Client als "Anmeldung fehlgeschlagen" sehen soll
    pub fn ist_anmeldefehler(&self) -> bool {
        matches!(
            self,
            Self::UngueltigerHash(_)
                | Self::NichtUnterstuetzteVersion(_)
                | Self::BenutzerNichtGefunden(_)
                | Self::UngueltigeAnmeldedaten
                | Self::TokenUngueltig
                | Self::NichtAngemeldet
        )
    }
}

/// Result-Alias fuer den Auth-Service
pub type AuthResult<T> = Result<T, AuthError>;
