//! lizenzserver-auth – Authentifizierungs- und Session-Kern
//!
//! Dieses Crate implementiert:
//! - Passwort-Hashing mit Argon2id (PHC-Strings)
//! - Opake Bearer-Tokens mit Ablauf und Bindung an den Passwort-Hash
//! - AuthService (Registrierung, Login, Logout, Passwortwechsel)

pub mod error;
pub mod password;
pub mod service;
pub mod token;

// Bequeme Re-Exporte
pub use error::{AuthError, AuthResult};
pub use password::{passwort_verifizieren, HashParameter, PasswortHasher};
pub use service::AuthService;
pub use token::{passwort_fingerabdruck, TokenService};
