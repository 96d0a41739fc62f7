//! SQLite-Backend-Implementierungen fuer alle Repository-Traits

pub mod licenses;
pub mod pool;
pub mod tokens;
pub mod users;

pub use pool::SqliteDb;

use chrono::{DateTime, Utc};
use lizenzserver_core::UserId;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

pub(crate) fn parse_uuid(wert: &str) -> DbResult<Uuid> {
    Uuid::parse_str(wert).map_err(|e| DbError::intern(format!("Ungueltige UUID '{wert}': {e}")))
}

pub(crate) fn parse_user_id(wert: &str) -> DbResult<UserId> {
    wert.parse()
        .map_err(|e| DbError::intern(format!("Ungueltige User-ID '{wert}': {e}")))
}

pub(crate) fn parse_datetime(feld: &str, wert: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(wert)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::intern(format!("Ungueltiges {feld} '{wert}': {e}")))
}
