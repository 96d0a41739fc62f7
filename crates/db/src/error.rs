//! Fehlertypen fuer das Datenbank-Crate

use std::time::Duration;

use thiserror::Error;

/// Datenbank-Fehlertypen
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Datensatz nicht gefunden: {0}")]
    NichtGefunden(String),

    #[error("Eindeutigkeitsverletzung: {0}")]
    Eindeutigkeit(String),

    #[error("Ungueltige Daten: {0}")]
    UngueltigeDaten(String),

    #[error("Zeitlimit von {0:?} ueberschritten")]
    Zeitlimit(Duration),

    #[error("SQLx-Fehler: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration-Fehler: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Interner DB-Fehler: {0}")]
    Intern(String),
}

/// Result-Alias fuer das Datenbank-Crate
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    pub fn nicht_gefunden(msg: impl Into<String>) -> Self {
        Self::NichtGefunden(msg.into())
    }

    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Gibt true zurueck wenn es sich um einen Eindeutigkeitsfehler handelt
    pub fn ist_eindeutigkeit(&self) -> bool {
        match self {
            Self::Eindeutigkeit(_) => true,
            Self::Sqlx(e) => ist_unique_verletzung(e),
            _ => false,
        }
    }

    /// Uebersetzt eine UNIQUE-Verletzung in `Eindeutigkeit(meldung)`,
    /// alle anderen sqlx-Fehler bleiben `Sqlx`
    pub(crate) fn aus_insert(e: sqlx::Error, meldung: impl FnOnce() -> String) -> Self {
        if ist_unique_verletzung(&e) {
            Self::Eindeutigkeit(meldung())
        } else {
            Self::Sqlx(e)
        }
    }
}

fn ist_unique_verletzung(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eindeutigkeit_erkennung() {
        assert!(DbError::Eindeutigkeit("users.username".into()).ist_eindeutigkeit());
        assert!(!DbError::nicht_gefunden("x").ist_eindeutigkeit());
        assert!(!DbError::Zeitlimit(Duration::from_millis(5)).ist_eindeutigkeit());
    }

    #[test]
    fn insert_fehler_ohne_unique_bleibt_sqlx() {
        let e = DbError::aus_insert(sqlx::Error::RowNotFound, || "egal".into());
        assert!(matches!(e, DbError::Sqlx(sqlx::Error::RowNotFound)));
        assert!(!e.ist_eindeutigkeit());
    }

    #[test]
    fn zeitlimit_anzeige() {
        let e = DbError::Zeitlimit(Duration::from_millis(250));
        assert_eq!(e.to_string(), "Zeitlimit von 250ms ueberschritten");
    }
}
