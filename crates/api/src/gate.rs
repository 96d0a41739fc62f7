//! Auth-Gate fuer geschuetzte Routen
//!
//! Das Token kommt aus `Authorization: Bearer <token>` oder, falls der
//! Header fehlt, aus dem `authtoken`-Cookie. Ohne gueltiges Token endet die
//! Anfrage mit 401, bevor ein Handler laeuft.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use lizenzserver_auth::{AuthError, AuthResult, AuthService};
use lizenzserver_db::{models::BenutzerRecord, Persistenz};

use crate::error::ApiError;

/// Name des Session-Cookies
pub const COOKIE_NAME: &str = "authtoken";

/// Der angemeldete Benutzer einer Anfrage (als Extension gespeichert)
#[derive(Debug, Clone)]
pub struct AngemeldeterBenutzer {
    pub benutzer: BenutzerRecord,
    /// Das Token, mit dem sich die Anfrage ausgewiesen hat
    pub token: String,
}

/// Loest Tokens zu Benutzern auf; wird einmal beim Start gebaut
pub struct AuthGate<P: Persistenz> {
    auth: Arc<AuthService<P>>,
}

impl<P: Persistenz> AuthGate<P> {
    pub fn neu(auth: Arc<AuthService<P>>) -> Self {
        Self { auth }
    }

    /// Prueft die Header einer Anfrage
    pub async fn pruefen(&self, headers: &HeaderMap) -> AuthResult<AngemeldeterBenutzer> {
        let token = token_aus_headers(headers).ok_or(AuthError::NichtAngemeldet)?;
        let benutzer = self.auth.token_validieren(&token).await?;
        Ok(AngemeldeterBenutzer { benutzer, token })
    }
}

impl<P: Persistenz> Clone for AuthGate<P> {
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
        }
    }
}

/// Extrahiert das Token: zuerst Bearer-Header, dann Cookie
pub fn token_aus_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .filter_map(|paar| paar.trim().split_once('='))
        .find(|(name, wert)| *name == COOKIE_NAME && !wert.is_empty())
        .map(|(_, wert)| wert.to_string())
}

/// Axum-Middleware: laesst nur Anfragen mit gueltigem Token durch
///
/// Verwendung:
/// ```ignore
/// Router::new()
///     .route("/api/auth/me", get(handler))
///     .route_layer(axum::middleware::from_fn_with_state(gate, auth_gate::<P>))
/// ```
pub async fn auth_gate<P: Persistenz>(
    State(gate): State<AuthGate<P>>,
    mut req: Request,
    next: Next,
) -> Response {
    match gate.pruefen(req.headers()).await {
        Ok(angemeldet) => {
            tracing::debug!(user_id = %angemeldet.benutzer.id, "Anfrage authentifiziert");
            req.extensions_mut().insert(angemeldet);
            next.run(req).await
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_extrahieren() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer mein_token_123"),
        );
        assert_eq!(token_aus_headers(&headers).as_deref(), Some("mein_token_123"));
    }

    #[test]
    fn token_aus_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dunkel; authtoken=abc123; lang=de"),
        );
        assert_eq!(token_aus_headers(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn bearer_hat_vorrang_vor_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer aus_header"));
        headers.insert(header::COOKIE, HeaderValue::from_static("authtoken=aus_cookie"));
        assert_eq!(token_aus_headers(&headers).as_deref(), Some("aus_header"));
    }

    #[test]
    fn kein_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(token_aus_headers(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        headers.insert(header::COOKIE, HeaderValue::from_static("authtoken="));
        assert_eq!(token_aus_headers(&headers), None);
    }
}
