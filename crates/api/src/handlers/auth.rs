//! REST-Handler fuer Registrierung, Login und Session

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Json, Response},
    Extension,
};
use lizenzserver_auth::AuthError;
use lizenzserver_db::Persistenz;
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, gate::AngemeldeterBenutzer, state::ApiState};

#[derive(Debug, Deserialize)]
pub struct AnmeldeBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Antwort von Login und Registrierung
#[derive(Debug, Serialize, Deserialize)]
pub struct AnmeldeAntwort {
    pub token: String,
    pub error: String,
}

/// Antwort ohne Nutzdaten
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusAntwort {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IchAntwort {
    pub id: String,
    pub username: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswortBody {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// POST /api/auth/register
pub async fn registrieren<P: Persistenz>(
    State(state): State<ApiState<P>>,
    body: Result<Json<AnmeldeBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(_) => return ApiError::UngueltigeAnfrage("Invalid request".into()).als_anmelde_antwort(),
    };

    match state.auth.registrieren(&body.username, &body.password).await {
        Ok((_, token)) => {
            state.metriken.login_zaehlen("registriert");
            anmelde_erfolg(&state, token.secret)
        }
        Err(e) => {
            state.metriken.login_zaehlen("abgelehnt");
            ApiError::from(e).als_anmelde_antwort()
        }
    }
}

/// POST /api/auth/login
pub async fn anmelden<P: Persistenz>(
    State(state): State<ApiState<P>>,
    body: Result<Json<AnmeldeBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(_) => return ApiError::UngueltigeAnfrage("Invalid request".into()).als_anmelde_antwort(),
    };

    match state.auth.anmelden(&body.username, &body.password).await {
        Ok((_, token)) => {
            state.metriken.login_zaehlen("erfolg");
            anmelde_erfolg(&state, token.secret)
        }
        Err(e) => {
            state.metriken.login_zaehlen("fehlgeschlagen");
            ApiError::from(e).als_anmelde_antwort()
        }
    }
}

/// POST /api/auth/logout
pub async fn abmelden<P: Persistenz>(
    State(state): State<ApiState<P>>,
    Extension(angemeldet): Extension<AngemeldeterBenutzer>,
) -> Response {
    if let Err(e) = state.auth.abmelden(&angemeldet.token).await {
        return ApiError::from(e).into_response();
    }

    (
        cookie_header(&state.session_cookie_loeschen()),
        Json(StatusAntwort { error: String::new() }),
    )
        .into_response()
}

/// GET /api/auth/me
pub async fn ich(Extension(angemeldet): Extension<AngemeldeterBenutzer>) -> Json<IchAntwort> {
    let benutzer = angemeldet.benutzer;
    Json(IchAntwort {
        id: benutzer.id.to_string(),
        username: benutzer.username,
        created_at: benutzer.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    })
}

/// POST /api/auth/password
pub async fn passwort_aendern<P: Persistenz>(
    State(state): State<ApiState<P>>,
    Extension(angemeldet): Extension<AngemeldeterBenutzer>,
    body: Result<Json<PasswortBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(_) => return ApiError::UngueltigeAnfrage("Invalid request".into()).into_response(),
    };

    match state
        .auth
        .passwort_aendern(angemeldet.benutzer.id, &body.old_password, &body.new_password)
        .await
    {
        Ok(()) => (
            cookie_header(&state.session_cookie_loeschen()),
            Json(StatusAntwort { error: String::new() }),
        )
            .into_response(),
        Err(AuthError::UngueltigeEingabe(_)) => {
            ApiError::UngueltigeAnfrage("Empty password".into()).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

fn anmelde_erfolg<P: Persistenz>(state: &ApiState<P>, token: String) -> Response {
    (
        cookie_header(&state.session_cookie(&token)),
        Json(AnmeldeAntwort {
            token,
            error: String::new(),
        }),
    )
        .into_response()
}

fn cookie_header(cookie: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(cookie) {
        Ok(wert) => {
            headers.insert(header::SET_COOKIE, wert);
        }
        Err(_) => tracing::warn!("Session-Cookie nicht als Header darstellbar"),
    }
    headers
}
