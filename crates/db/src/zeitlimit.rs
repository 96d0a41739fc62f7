//! Zeitlimit fuer Persistenz-Aufrufe
//!
//! Persistenz-Aufrufe sind die einzigen Stellen, an denen der Kern wartet.
//! Jeder Aufruf bekommt ein Zeitlimit vom Aufrufer; wird es ueberschritten,
//! wird der Aufruf abgebrochen (die Future gedroppt) und `DbError::Zeitlimit`
//! gemeldet. Es gibt keine automatische Wiederholung.

use std::{future::Future, time::Duration};

use crate::error::{DbError, DbResult};

/// Fuehrt `fut` mit dem Zeitlimit `dauer` aus
pub async fn mit_zeitlimit<T, F>(dauer: Duration, fut: F) -> DbResult<T>
where
    F: Future<Output = DbResult<T>>,
{
    match tokio::time::timeout(dauer, fut).await {
        Ok(ergebnis) => ergebnis,
        Err(_) => {
            tracing::warn!(zeitlimit_ms = dauer.as_millis() as u64, "Persistenz-Aufruf abgebrochen");
            Err(DbError::Zeitlimit(dauer))
        }
    }
}
