//! Health-Check-Endpunkt fuer den Lizenzserver
//!
//! Endpoint: `GET /health`
//! Response: JSON mit Status, Version, Uptime und DB-Verbindungsstatus

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::{
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Instant,
};

/// Funktor-Typ: prueft ob die Datenbank erreichbar ist
pub type DbPruefung =
    Arc<dyn Fn() -> Pin<Box<dyn Future<Output = bool> + Send>> + Send + Sync>;

/// Status des Health-Checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Antwort des Health-Check-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub db_connected: bool,
}

/// Geteilter Zustand fuer den Health-Check-Handler
#[derive(Clone)]
pub struct HealthState {
    start_time: Arc<Instant>,
    db_connected: Arc<AtomicBool>,
    db_pruefung: Option<DbPruefung>,
}

impl HealthState {
    /// Health-State ohne aktive DB-Pruefung (Status wird von aussen gesetzt)
    pub fn neu() -> Self {
        Self {
            start_time: Arc::new(Instant::now()),
            db_connected: Arc::new(AtomicBool::new(true)),
            db_pruefung: None,
        }
    }

    /// Health-State, der die Datenbank bei jedem Aufruf prueft
    pub fn mit_db_pruefung(pruefung: DbPruefung) -> Self {
        Self {
            db_pruefung: Some(pruefung),
            ..Self::neu()
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn db_verbunden(&self) -> bool {
        self.db_connected.load(Ordering::Relaxed)
    }

    pub fn db_status_setzen(&self, verbunden: bool) {
        self.db_connected.store(verbunden, Ordering::Relaxed);
    }

    async fn aktualisieren(&self) -> bool {
        if let Some(pruefung) = &self.db_pruefung {
            let verbunden = pruefung().await;
            self.db_status_setzen(verbunden);
        }
        self.db_verbunden()
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::neu()
    }
}

/// Axum-Router fuer den `/health`-Endpunkt
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

/// `GET /health` – gibt den Serverstatus zurueck
async fn health_handler(State(state): State<HealthState>) -> impl IntoResponse {
    let db_connected = state.aktualisieren().await;
    let status = if db_connected {
        HealthStatus::Healthy
    } else {
        tracing::warn!("Health-Check: Datenbank nicht erreichbar");
        HealthStatus::Degraded
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        db_connected,
    };

    // 200 auch bei degraded, der Health-Check soll nicht failen
    (StatusCode::OK, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn abfragen(state: HealthState) -> HealthResponse {
        let antwort = health_router(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(antwort.status(), StatusCode::OK);
        let body = axum::body::to_bytes(antwort.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn health_state_db_status_umschalten() {
        let state = HealthState::neu();
        assert!(state.db_verbunden());
        state.db_status_setzen(false);
        assert!(!state.db_verbunden());
        assert!(state.uptime_seconds() < 5);
    }

    #[tokio::test]
    async fn health_ohne_pruefung() {
        let antwort = abfragen(HealthState::neu()).await;
        assert_eq!(antwort.status, HealthStatus::Healthy);
        assert!(antwort.db_connected);
        assert_eq!(antwort.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn health_mit_fehlgeschlagener_pruefung() {
        let pruefung: DbPruefung = Arc::new(|| {
            Box::pin(async { false }) as Pin<Box<dyn Future<Output = bool> + Send>>
        });
        let antwort = abfragen(HealthState::mit_db_pruefung(pruefung)).await;
        assert_eq!(antwort.status, HealthStatus::Degraded);
        assert!(!antwort.db_connected);
    }

    #[test]
    fn health_response_serialisierung() {
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            version: "0.1.0".to_string(),
            uptime_seconds: 3600,
            db_connected: true,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"uptime_seconds\":3600"));
        assert!(json.contains("\"db_connected\":true"));
    }
}
