//! lizenzserver-db – Persistenz-Schnittstelle
//!
//! Dieses Crate stellt das Repository-Pattern bereit, das die Auth- und
//! Lizenzlogik von der konkreten Datenbank entkoppelt:
//! - [`SqliteDb`]: Produktions-Backend (sqlx, WAL, Migrationen)
//! - [`MemoryDb`]: In-Memory-Backend fuer Tests
//!
//! Alle Aufrufe aus den Services laufen ueber [`zeitlimit::mit_zeitlimit`].

pub mod error;
pub mod memory;
pub mod models;
pub mod repository;
pub mod sqlite;
pub mod zeitlimit;

pub use error::{DbError, DbResult};
pub use memory::MemoryDb;
pub use repository::{
    DatabaseConfig, LicenseRepository, Persistenz, TokenRepository, UserRepository,
};
pub use sqlite::SqliteDb;
