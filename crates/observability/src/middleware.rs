//! Request-Metriken Middleware fuer Axum
//!
//! Misst die Antwortzeit jeder HTTP-Anfrage und traegt sie in die
//! Prometheus-Metriken ein. Das Request-Logging selbst uebernimmt der
//! `TraceLayer` von tower-http.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::TraceLayer,
};

use crate::metrics::LizenzMetriken;

/// Erstellt den TraceLayer fuer strukturiertes Request-Logging
pub fn request_timing_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

/// Axum-Middleware-Funktion: zaehlt Anfragen und misst die Antwortzeit
///
/// Verwendung:
/// ```ignore
/// Router::new()
///     .route("/", get(handler))
///     .layer(axum::middleware::from_fn_with_state(metriken, metriken_middleware))
/// ```
pub async fn metriken_middleware(
    State(metriken): State<LizenzMetriken>,
    req: Request,
    next: Next,
) -> Response {
    let methode = req.method().as_str().to_owned();
    let start = Instant::now();

    let response = next.run(req).await;

    let dauer = start.elapsed();
    let status = response.status().as_u16().to_string();

    metriken
        .http_requests_total
        .with_label_values(&[methode.as_str(), status.as_str()])
        .inc();
    metriken
        .http_request_duration_seconds
        .with_label_values(&[methode.as_str()])
        .observe(dauer.as_secs_f64());

    tracing::debug!(
        method = %methode,
        status = %status,
        duration_ms = dauer.as_millis() as u64,
        "HTTP-Anfrage abgeschlossen"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::get, Router};
    use tower::ServiceExt;

    #[tokio::test]
    async fn anfragen_werden_gezaehlt() {
        let metriken = LizenzMetriken::neu().unwrap();
        let app = Router::new()
            .route("/ok", get(|| async { "ok" }))
            .route("/kaputt", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .layer(axum::middleware::from_fn_with_state(
                metriken.clone(),
                metriken_middleware,
            ));

        for pfad in ["/ok", "/ok", "/kaputt"] {
            app.clone()
                .oneshot(
                    axum::http::Request::builder()
                        .uri(pfad)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
        }

        assert_eq!(
            metriken
                .http_requests_total
                .with_label_values(&["GET", "200"])
                .get(),
            2
        );
        assert_eq!(
            metriken
                .http_requests_total
                .with_label_values(&["GET", "500"])
                .get(),
            1
        );
        assert_eq!(
            metriken
                .http_request_duration_seconds
                .with_label_values(&["GET"])
                .get_sample_count(),
            3
        );
    }
}
