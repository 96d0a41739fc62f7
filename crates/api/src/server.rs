//! Axum HTTP-Server fuer den Lizenzserver

use std::net::SocketAddr;

use anyhow::Result;
use axum::http::{HeaderValue, Method};
use axum::{middleware, Router};
use lizenzserver_db::Persistenz;
use lizenzserver_observability::{
    health_router, metriken_middleware, metrics_router, request_timing_layer, HealthState,
};
use tower_http::cors::CorsLayer;

use crate::{gate::AuthGate, routes::api_router, state::ApiState};

/// REST-Server-Konfiguration
#[derive(Debug, Clone)]
pub struct RestServerKonfig {
    pub bind_addr: SocketAddr,
    /// Erlaubte CORS-Origins. Leer = alle Origins erlaubt (nur fuer Entwicklung).
    pub cors_origins: Vec<String>,
}

impl Default for RestServerKonfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            cors_origins: vec![],
        }
    }
}

/// Axum HTTP-Server fuer API, Health und Metriken
pub struct RestServer {
    konfig: RestServerKonfig,
}

impl RestServer {
    pub fn neu(konfig: RestServerKonfig) -> Self {
        Self { konfig }
    }

    /// Baut die vollstaendige Anwendung mit allen Layern
    pub fn router<P: Persistenz>(
        &self,
        state: ApiState<P>,
        gate: AuthGate<P>,
        health: HealthState,
    ) -> Router {
        let metriken = state.metriken.clone();

        api_router(state, gate)
            .merge(health_router(health))
            .merge(metrics_router(metriken.clone()))
            .layer(middleware::from_fn_with_state(metriken, metriken_middleware))
            .layer(request_timing_layer())
            .layer(self.cors())
    }

    fn cors(&self) -> CorsLayer {
        // Entweder spezifische Origins oder Any
        if self.konfig.cors_origins.is_empty() {
            return CorsLayer::permissive();
        }

        let origins: Vec<HeaderValue> = self
            .konfig
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(tower_http::cors::Any)
    }

    /// Startet den Server und laeuft bis Ctrl-C
    pub async fn starten(self, app: Router) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.konfig.bind_addr).await?;
        tracing::info!(addr = %self.konfig.bind_addr, "REST-Server gestartet");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("REST-Server beendet");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown-Signal empfangen, Server wird beendet"),
        Err(e) => {
            tracing::error!("Shutdown-Signal nicht abfangbar: {e}");
            std::future::pending::<()>().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_konfig() {
        let konfig = RestServerKonfig::default();
        assert_eq!(konfig.bind_addr.port(), 8080);
        assert!(konfig.cors_origins.is_empty());
    }
}
