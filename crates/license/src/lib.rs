//! lizenzserver-license – DRM-Lizenzkern
//!
//! - [`Verschluesselungsschluessel`]: verlustfreie Umwandlung zwischen Hex,
//!   Bytes und Base64
//! - [`LizenzService`]: entscheidet, welche Inhaltsschluessel ein Benutzer
//!   erhaelt, und baut die Lizenzantwort im ClearKey-Format

pub mod error;
pub mod key;
pub mod resolver;

pub use error::{CodecError, LizenzError, LizenzResult};
pub use key::{client_key_id_dekodieren, Verschluesselungsschluessel};
pub use resolver::{
    LizenzAnfrage, LizenzAntwort, LizenzSchluessel, LizenzService, LIZENZTYP_TEMPORAER,
};
