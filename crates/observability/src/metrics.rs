//! Prometheus-kompatible Metriken fuer den Lizenzserver
//!
//! Registrierte Metriken:
//! - `lizenzserver_logins_total` – Counter: Login-Versuche (ergebnis)
//! - `lizenzserver_lizenz_anfragen_total` – Counter: Lizenzanfragen (ergebnis)
//! - `lizenzserver_http_requests_total` – Counter: HTTP-Anfragen (method, status)
//! - `lizenzserver_http_request_duration_seconds` – Histogram: HTTP-Antwortzeit (method)
//!
//! Die Registry gehoert dem App-State; jede Instanz ist unabhaengig.

use anyhow::Result;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Alle Prometheus-Metriken des Lizenzservers
#[derive(Clone)]
pub struct LizenzMetriken {
    pub registry: Arc<Registry>,

    // Fachliche Metriken
    pub logins_total: IntCounterVec,
    pub lizenz_anfragen_total: IntCounterVec,

    // HTTP-Metriken
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,
}

impl LizenzMetriken {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        let logins_total = IntCounterVec::new(
            Opts::new("lizenzserver_logins_total", "Login-Versuche nach Ergebnis"),
            &["ergebnis"],
        )?;
        registry.register(Box::new(logins_total.clone()))?;

        let lizenz_anfragen_total = IntCounterVec::new(
            Opts::new(
                "lizenzserver_lizenz_anfragen_total",
                "Lizenzanfragen nach Ergebnis",
            ),
            &["ergebnis"],
        )?;
        registry.register(Box::new(lizenz_anfragen_total.clone()))?;

        let http_requests_total = IntCounterVec::new(
            Opts::new("lizenzserver_http_requests_total", "Gesamtanzahl HTTP-Anfragen"),
            &["method", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "lizenzserver_http_request_duration_seconds",
                "HTTP-Antwortzeit in Sekunden",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
            ]),
            &["method"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry: Arc::new(registry),
            logins_total,
            lizenz_anfragen_total,
            http_requests_total,
            http_request_duration_seconds,
        })
    }

    /// Zaehlt einen Login- oder Registrierungsversuch
    pub fn login_zaehlen(&self, ergebnis: &str) {
        self.logins_total.with_label_values(&[ergebnis]).inc();
    }

    /// Zaehlt eine Lizenzanfrage
    pub fn lizenz_anfrage_zaehlen(&self, ergebnis: &str) {
        self.lizenz_anfragen_total.with_label_values(&[ergebnis]).inc();
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Axum-Router fuer den `/metrics`-Endpunkt
pub fn metrics_router(metriken: LizenzMetriken) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metriken)
}

async fn metrics_handler(State(metriken): State<LizenzMetriken>) -> impl IntoResponse {
    match metriken.exportieren() {
        Ok(text) => (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Metriken-Export fehlgeschlagen: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[test]
    fn login_counter_mit_labels() {
        let metriken = LizenzMetriken::neu().unwrap();
        metriken.login_zaehlen("erfolg");
        metriken.login_zaehlen("erfolg");
        metriken.login_zaehlen("fehlgeschlagen");

        assert_eq!(metriken.logins_total.with_label_values(&["erfolg"]).get(), 2);
        assert_eq!(
            metriken.logins_total.with_label_values(&["fehlgeschlagen"]).get(),
            1
        );
    }

    #[test]
    fn instanzen_sind_unabhaengig() {
        let a = LizenzMetriken::neu().unwrap();
        let b = LizenzMetriken::neu().unwrap();
        a.lizenz_anfrage_zaehlen("erfolg");

        assert_eq!(a.lizenz_anfragen_total.with_label_values(&["erfolg"]).get(), 1);
        assert_eq!(b.lizenz_anfragen_total.with_label_values(&["erfolg"]).get(), 0);
    }

    #[test]
    fn metriken_export_prometheus_format() {
        let metriken = LizenzMetriken::neu().unwrap();
        metriken.lizenz_anfrage_zaehlen("abgelehnt");
        metriken
            .http_requests_total
            .with_label_values(&["POST", "200"])
            .inc();

        let output = metriken.exportieren().unwrap();
        assert!(output.contains("lizenzserver_lizenz_anfragen_total{ergebnis=\"abgelehnt\"} 1"));
        assert!(output.contains("lizenzserver_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[tokio::test]
    async fn metrics_endpunkt() {
        let metriken = LizenzMetriken::neu().unwrap();
        metriken.login_zaehlen("erfolg");

        let antwort = metrics_router(metriken)
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(antwort.status(), StatusCode::OK);

        let body = axum::body::to_bytes(antwort.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("lizenzserver_logins_total"));
    }
}
