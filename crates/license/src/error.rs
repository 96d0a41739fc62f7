//! Fehlertypen fuer Schluesselcodec und Lizenzaufloesung

use lizenzserver_db::DbError;
use thiserror::Error;

/// Fehler beim Umwandeln von Schluesseldarstellungen
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Ungueltiges Hex: {0}")]
    UngueltigesHex(String),

    #[error("Ungueltiges Base64: {0}")]
    UngueltigesBase64(String),
}

/// Fehler bei der Lizenzaufloesung
#[derive(Debug, Error)]
pub enum LizenzError {
    #[error("Nicht unterstuetzter Lizenztyp")]
    NichtUnterstuetzterTyp,

    #[error("Key-ID konnte nicht dekodiert werden: {0}")]
    UngueltigeAnfrage(#[source] CodecError),

    #[error("Kein Zugriff auf den angefragten Schluessel")]
    NichtBerechtigt,

    #[error("Schluessel nicht gefunden")]
    SchluesselNichtGefunden,

    #[error("Gespeichertes Schluesselmaterial ist ungueltig")]
    UngueltigesSchluesselmaterial(#[source] CodecError),

    #[error("Schluessel existiert bereits")]
    SchluesselExistiert,

    #[error("Ungueltiger Schluessel: {0}")]
    Codec(#[from] CodecError),

    #[error("Persistenz nicht verfuegbar: {0}")]
    PersistenzNichtVerfuegbar(#[from] DbError),
}

/// Result-Alias fuer den Lizenzkern
pub type LizenzResult<T> = Result<T, LizenzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehlermeldungen_enthalten_keine_key_ids() {
        let e = LizenzError::UngueltigeAnfrage(CodecError::UngueltigesBase64(
            "Invalid symbol 33, offset 0.".into(),
        ));
        assert_eq!(
            e.to_string(),
            "Key-ID konnte nicht dekodiert werden: Ungueltiges Base64: Invalid symbol 33, offset 0."
        );
        assert_eq!(
            LizenzError::NichtBerechtigt.to_string(),
            "Kein Zugriff auf den angefragten Schluessel"
        );
    }
}
