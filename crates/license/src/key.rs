//! Codec fuer DRM-Inhaltsschluessel
//!
//! Ein Schluessel hat drei gleichwertige Darstellungen: rohe Bytes,
//! Hex (lowercase, so liegt er in der Datenbank) und Standard-Base64 (so
//! erwartet ihn der DRM-Client im Feld `k`). Intern werden nur die Bytes
//! gehalten; die Konstruktoren validieren, die Ausgaben koennen daher nicht
//! fehlschlagen.

use base64::{
    alphabet,
    engine::{general_purpose::STANDARD, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};

use crate::error::CodecError;

/// Standard-Alphabet, Padding optional
const STANDARD_TOLERANT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// URL-sicheres Alphabet, Padding optional
const URL_SAFE_TOLERANT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Symmetrischer Inhaltsschluessel
#[derive(Clone, PartialEq, Eq)]
pub struct Verschluesselungsschluessel {
    bytes: Vec<u8>,
}

// Schluesselmaterial erscheint nie in Debug-Ausgaben
impl std::fmt::Debug for Verschluesselungsschluessel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verschluesselungsschluessel")
            .field("laenge", &self.bytes.len())
            .finish()
    }
}

impl Verschluesselungsschluessel {
    /// Liest Hex ein. Grossbuchstaben sind erlaubt und werden normalisiert.
    pub fn aus_hex(hex_str: &str) -> Result<Self, CodecError> {
        hex::decode(hex_str)
            .map(|bytes| Self { bytes })
            .map_err(|e| CodecError::UngueltigesHex(e.to_string()))
    }

    pub fn aus_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Liest Standard-Base64 (mit Padding) ein
    pub fn aus_base64(b64: &str) -> Result<Self, CodecError> {
        STANDARD
            .decode(b64)
            .map(|bytes| Self { bytes })
            .map_err(|e| CodecError::UngueltigesBase64(e.to_string()))
    }

    pub fn als_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Kanonisches lowercase Hex
    pub fn als_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Standard-Base64 mit Padding
    pub fn als_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// Dekodiert eine vom Client gesendete Key-ID (Base64) zu lowercase Hex
///
/// Toleriert umgebende Leerzeichen, fehlendes Padding und das URL-sichere
/// Alphabet, das manche Player senden.
pub fn client_key_id_dekodieren(key_id: &str) -> Result<String, CodecError> {
    let key_id = key_id.trim();
    if key_id.is_empty() {
        return Err(CodecError::UngueltigesBase64("leere Key-ID".into()));
    }

    STANDARD_TOLERANT
        .decode(key_id)
        .or_else(|_| URL_SAFE_TOLERANT.decode(key_id))
        .map(hex::encode)
        .map_err(|e| CodecError::UngueltigesBase64(e.to_string()))
}
