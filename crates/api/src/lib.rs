//! lizenzserver-api – REST-Schnittstelle des Lizenzservers
//!
//! Offene Routen fuer Registrierung und Login, alle weiteren Routen laufen
//! durch das [`AuthGate`]. Fehler der Fachcrates werden in [`ApiError`]
//! auf HTTP-Status und JSON-Antworten abgebildet.

pub mod error;
pub mod gate;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use gate::{auth_gate, token_aus_headers, AngemeldeterBenutzer, AuthGate, COOKIE_NAME};
pub use routes::api_router;
pub use server::{RestServer, RestServerKonfig};
pub use state::ApiState;
