//! Passwort-Hashing mit Argon2id
//!
//! Hashes werden als PHC-String gespeichert
//! (`$argon2id$v=19$m=<kib>,t=<iter>,p=<par>$<salt>$<hash>`). Die Parameter
//! stehen immer im Hash selbst, die Verifikation braucht daher keine
//! Konfiguration.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Argon2id-Parameter fuer neue Hashes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashParameter {
    /// Speicherbedarf in KiB
    pub speicher_kib: u32,
    pub iterationen: u32,
    pub parallelitaet: u32,
    /// Laenge des Hash-Outputs in Bytes
    pub ausgabe_laenge: usize,
}

impl Default for HashParameter {
    fn default() -> Self {
        Self {
            speicher_kib: 64 * 1024,
            iterationen: 3,
            parallelitaet: 4,
            ausgabe_laenge: 32,
        }
    }
}

/// Erzeugt Argon2id-Hashes mit festen Parametern
#[derive(Clone)]
pub struct PasswortHasher {
    argon2: Argon2<'static>,
    /// Hash gegen den bei unbekannten Benutzern verifiziert wird
    dummy_hash: String,
}

impl std::fmt::Debug for PasswortHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswortHasher").finish_non_exhaustive()
    }
}

impl PasswortHasher {
    pub fn neu(parameter: &HashParameter) -> AuthResult<Self> {
        let params = Params::new(
            parameter.speicher_kib,
            parameter.iterationen,
            parameter.parallelitaet,
            Some(parameter.ausgabe_laenge),
        )
        .map_err(|e| AuthError::PasswortHashing(format!("Argon2-Parameter ungueltig: {e}")))?;

        let mut hasher = Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            dummy_hash: String::new(),
        };
        hasher.dummy_hash = hasher.hashen("lizenzserver-dummy-passwort")?;
        Ok(hasher)
    }

    /// Hasht ein Passwort mit einem zufaelligen 16-Byte-Salt
    pub fn hashen(&self, passwort: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(passwort.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswortHashing(e.to_string()))
    }

    /// Verifiziert `passwort` gegen einen gespeicherten PHC-Hash
    pub fn verifizieren(&self, hash: &str, passwort: &str) -> AuthResult<bool> {
        passwort_verifizieren(hash, passwort)
    }

    /// Verbraucht dieselbe Rechenzeit wie eine echte Verifikation
    pub fn dummy_verifizieren(&self, passwort: &str) {
        let _ = passwort_verifizieren(&self.dummy_hash, passwort);
    }
}

/// Verifiziert ein Passwort gegen einen gespeicherten PHC-Hash
///
/// Gibt `Ok(false)` zurueck wenn der Hash gueltig ist, aber nicht passt.
/// Der Vergleich der Hash-Ausgaben erfolgt in konstanter Zeit.
pub fn passwort_verifizieren(hash: &str, passwort: &str) -> AuthResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::UngueltigerHash(e.to_string()))?;

    if parsed.algorithm != argon2::ARGON2ID_IDENT {
        return Err(AuthError::UngueltigerHash(format!(
            "Algorithmus '{}' statt argon2id",
            parsed.algorithm
        )));
    }

    match parsed.version {
        Some(v) if v == Version::V0x13 as u32 => {}
        Some(v) => return Err(AuthError::NichtUnterstuetzteVersion(v)),
        None => return Err(AuthError::UngueltigerHash("Versionsfeld fehlt".into())),
    }

    if parsed.salt.is_none() || parsed.hash.is_none() {
        return Err(AuthError::UngueltigerHash("Salt oder Hash fehlt".into()));
    }

    match Argon2::default().verify_password(passwort.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::UngueltigerHash(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schneller_hasher() -> PasswortHasher {
        PasswortHasher::neu(&HashParameter {
            speicher_kib: 64,
            iterationen: 1,
            parallelitaet: 1,
            ausgabe_laenge: 32,
        })
        .unwrap()
    }

    #[test]
    fn passwort_hashen_und_verifizieren() {
        let hasher = schneller_hasher();
        let hash = hasher.hashen("correcthorse").expect("Hashing fehlgeschlagen");

        assert!(
            hash.starts_with("$argon2id$v=19$m=64,t=1,p=1$"),
            "Unerwartetes PHC-Format: {hash}"
        );
        assert!(passwort_verifizieren(&hash, "correcthorse").unwrap());
    }

    #[test]
    fn falsches_passwort_wird_abgelehnt() {
        let hasher = schneller_hasher();
        let hash = hasher.hashen("richtiges_passwort").unwrap();

        assert!(!hasher.verifizieren(&hash, "falsches_passwort").unwrap());
    }

    #[test]
    fn gleiche_passwoerter_unterschiedliche_hashes() {
        let hasher = schneller_hasher();
        let hash1 = hasher.hashen("gleich").unwrap();
        let hash2 = hasher.hashen("gleich").unwrap();

        assert_ne!(hash1, hash2, "Salt muss zufaellig sein");
        assert!(passwort_verifizieren(&hash1, "gleich").unwrap());
        assert!(passwort_verifizieren(&hash2, "gleich").unwrap());
    }

    #[test]
    fn standard_parameter() {
        let p = HashParameter::default();
        assert_eq!(p.speicher_kib, 65536);
        assert_eq!(p.iterationen, 3);
        assert_eq!(p.parallelitaet, 4);
        assert_eq!(p.ausgabe_laenge, 32);
    }

    #[test]
    fn ungueltiges_hash_format() {
        assert!(matches!(
            passwort_verifizieren("kein_gueltiger_hash", "passwort"),
            Err(AuthError::UngueltigerHash(_))
        ));
        assert!(matches!(
            passwort_verifizieren("$argon2id$v=19$m=64,t=1,p=1", "passwort"),
            Err(AuthError::UngueltigerHash(_))
        ));
    }

    #[test]
    fn anderer_algorithmus_ist_ungueltig() {
        let params = Params::new(64, 1, 1, None).unwrap();
        let argon2i = Argon2::new(Algorithm::Argon2i, Version::V0x13, params);
        let salt = SaltString::generate(&mut OsRng);
        let hash = argon2i.hash_password(b"pw", &salt).unwrap().to_string();

        assert!(matches!(
            passwort_verifizieren(&hash, "pw"),
            Err(AuthError::UngueltigerHash(_))
        ));
    }

    #[test]
    fn alte_version_wird_abgelehnt() {
        let params = Params::new(64, 1, 1, None).unwrap();
        let alt = Argon2::new(Algorithm::Argon2id, Version::V0x10, params);
        let salt = SaltString::generate(&mut OsRng);
        let hash = alt.hash_password(b"pw", &salt).unwrap().to_string();

        assert!(matches!(
            passwort_verifizieren(&hash, "pw"),
            Err(AuthError::NichtUnterstuetzteVersion(16))
        ));
    }

    #[test]
    fn ungueltige_parameter() {
        let ergebnis = PasswortHasher::neu(&HashParameter {
            speicher_kib: 1,
            iterationen: 1,
            parallelitaet: 1,
            ausgabe_laenge: 32,
        });
        assert!(matches!(ergebnis, Err(AuthError::PasswortHashing(_))));
    }
}
