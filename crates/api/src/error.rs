//! Abbildung der Fachfehler auf HTTP-Antworten
//!
//! Die Meldungen an den Client sind bewusst knapp und verraten weder, ob ein
//! Benutzer existiert, noch welche Key-ID abgelehnt wurde.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use lizenzserver_auth::AuthError;
use lizenzserver_license::LizenzError;
use serde_json::json;
use thiserror::Error;

/// Fehler an der REST-Grenze
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Lizenz(#[from] LizenzError),

    /// Request-Body nicht lesbar oder unvollstaendig
    #[error("Ungueltige Anfrage: {0}")]
    UngueltigeAnfrage(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Auth(e) => match e {
                AuthError::UngueltigeEingabe(_) | AuthError::BenutzernameVergeben(_) => {
                    StatusCode::BAD_REQUEST
                }
                e if e.ist_anmeldefehler() => StatusCode::UNAUTHORIZED,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Lizenz(e) => match e {
                LizenzError::NichtUnterstuetzterTyp
                | LizenzError::UngueltigeAnfrage(_)
                | LizenzError::NichtBerechtigt
                | LizenzError::SchluesselNichtGefunden
                | LizenzError::Codec(_) => StatusCode::BAD_REQUEST,
                LizenzError::SchluesselExistiert => StatusCode::CONFLICT,
                LizenzError::UngueltigesSchluesselmaterial(_)
                | LizenzError::PersistenzNichtVerfuegbar(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::UngueltigeAnfrage(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Meldung fuer den Client
    pub fn nachricht(&self) -> String {
        match self {
            Self::Auth(e) => match e {
                AuthError::UngueltigeEingabe(_) => "Empty username or password",
                AuthError::BenutzernameVergeben(_) => "User already exists",
                AuthError::TokenUngueltig | AuthError::NichtAngemeldet => "Invalid token",
                e if e.ist_anmeldefehler() => "Invalid username or password",
                AuthError::PersistenzNichtVerfuegbar(_) => "Persistence unavailable",
                _ => "Internal server error",
            }
            .to_string(),
            Self::Lizenz(e) => match e {
                LizenzError::NichtUnterstuetzterTyp => "invalid license request type",
                LizenzError::UngueltigeAnfrage(_) => "couldn't decode key ID",
                LizenzError::NichtBerechtigt => "user does not have access to license key",
                LizenzError::SchluesselNichtGefunden
                | LizenzError::UngueltigesSchluesselmaterial(_) => "failed to get license key",
                LizenzError::SchluesselExistiert => "license key already exists",
                LizenzError::Codec(_) => "invalid license key",
                LizenzError::PersistenzNichtVerfuegbar(_) => "failed to get license keys",
            }
            .to_string(),
            Self::UngueltigeAnfrage(nachricht) => nachricht.clone(),
        }
    }

    /// Antwort im Format der Login- und Registrierungsrouten: `{token, error}`
    pub fn als_anmelde_antwort(self) -> Response {
        self.protokollieren();
        (
            self.status(),
            Json(json!({ "token": "", "error": self.nachricht() })),
        )
            .into_response()
    }

    fn protokollieren(&self) {
        if self.status().is_server_error() {
            tracing::error!(fehler = %self, "Anfrage mit internem Fehler beendet");
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.protokollieren();
        (self.status(), Json(json!({ "error": self.nachricht() }))).into_response()
    }
}

/// Result-Alias fuer Handler
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use lizenzserver_db::DbError;
    use lizenzserver_license::CodecError;

    #[test]
    fn anmeldefehler_sind_ununterscheidbar() {
        let unbekannt = ApiError::from(AuthError::BenutzerNichtGefunden("bob".into()));
        let falsch = ApiError::from(AuthError::UngueltigeAnmeldedaten);

        assert_eq!(unbekannt.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unbekannt.status(), falsch.status());
        assert_eq!(unbekannt.nachricht(), falsch.nachricht());
        assert!(!unbekannt.nachricht().contains("bob"));
    }

    #[test]
    fn lizenzfehler_status() {
        assert_eq!(
            ApiError::from(LizenzError::NichtBerechtigt).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(LizenzError::UngueltigeAnfrage(CodecError::UngueltigesBase64(
                "x".into()
            )))
            .nachricht(),
            "couldn't decode key ID"
        );
        assert_eq!(
            ApiError::from(LizenzError::UngueltigesSchluesselmaterial(
                CodecError::UngueltigesHex("x".into())
            ))
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn persistenzfehler_ist_500() {
        let e = ApiError::from(AuthError::from(DbError::intern("weg")));
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.nachricht(), "Persistence unavailable");

        let e = ApiError::from(LizenzError::from(DbError::intern("weg")));
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn eingabefehler_ist_400() {
        let e = ApiError::from(AuthError::BenutzernameVergeben("alice".into()));
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.nachricht(), "User already exists");
    }
}
