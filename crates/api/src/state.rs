//! Axum-State der REST-Schnittstelle

use std::sync::Arc;

use lizenzserver_auth::AuthService;
use lizenzserver_db::Persistenz;
use lizenzserver_license::LizenzService;
use lizenzserver_observability::LizenzMetriken;

/// Geteilter Zustand aller Handler
///
/// Die Services sind unveraenderlich; jede Anfrage arbeitet nur auf der
/// Persistenz.
pub struct ApiState<P: Persistenz> {
    pub auth: Arc<AuthService<P>>,
    pub lizenz: Arc<LizenzService<P>>,
    pub metriken: LizenzMetriken,
    /// Setzt das `Secure`-Attribut am Session-Cookie
    pub cookie_secure: bool,
}

impl<P: Persistenz> ApiState<P> {
    pub fn neu(
        auth: Arc<AuthService<P>>,
        lizenz: Arc<LizenzService<P>>,
        metriken: LizenzMetriken,
        cookie_secure: bool,
    ) -> Self {
        Self {
            auth,
            lizenz,
            metriken,
            cookie_secure,
        }
    }

    /// Baut den `Set-Cookie`-Wert fuer ein frisch ausgestelltes Token
    pub fn session_cookie(&self, token: &str) -> String {
        let max_age = self.auth.tokens().gueltigkeit().num_seconds();
        self.cookie(token, max_age)
    }

    /// Baut den `Set-Cookie`-Wert, der das Session-Cookie loescht
    pub fn session_cookie_loeschen(&self) -> String {
        self.cookie("", 0)
    }

    fn cookie(&self, wert: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={wert}; Max-Age={max_age}; Path=/; HttpOnly",
            crate::gate::COOKIE_NAME
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

// Manuell, damit `P` selbst nicht `Clone` sein muss
impl<P: Persistenz> Clone for ApiState<P> {
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
            lizenz: Arc::clone(&self.lizenz),
            metriken: self.metriken.clone(),
            cookie_secure: self.cookie_secure,
        }
    }
}
