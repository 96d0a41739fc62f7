//! Route-Definitionen fuer die REST-API (/api/...)

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use lizenzserver_db::Persistenz;

use crate::{
    gate::{auth_gate, AuthGate},
    handlers,
    state::ApiState,
};

/// Erstellt den vollstaendigen /api/-Router
///
/// Das Gate wird nur an die geschuetzten Routen gehaengt; Registrierung und
/// Login bleiben offen.
pub fn api_router<P: Persistenz>(state: ApiState<P>, gate: AuthGate<P>) -> Router {
    let offen = Router::new()
        .route("/api/auth/register", post(handlers::auth::registrieren::<P>))
        .route("/api/auth/login", post(handlers::auth::anmelden::<P>));

    let geschuetzt = Router::new()
        .route("/api/auth/logout", post(handlers::auth::abmelden::<P>))
        .route("/api/auth/me", get(handlers::auth::ich))
        .route("/api/auth/password", post(handlers::auth::passwort_aendern::<P>))
        // Lizenzen
        .route(
            "/api/licensing/keyserver/keyrequest",
            post(handlers::license::lizenz_anfrage::<P>),
        )
        .route_layer(middleware::from_fn_with_state(gate, auth_gate::<P>));

    offen.merge(geschuetzt).with_state(state)
}
