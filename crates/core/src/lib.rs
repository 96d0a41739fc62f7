//! lizenzserver-core – Gemeinsame Typen
//!
//! Dieses Crate stellt die ID-Typen bereit, die von Persistenz, Auth und
//! Lizenzvergabe gemeinsam genutzt werden.

pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use types::{ProductId, UserId};
