//! Prometheus-kompatible Metriken fuer advocall
//!
//! Registrierte Metriken:
//! - `advocall_connected_sessions` – Gauge: Aktuell gebundene Sessions
//! - `advocall_active_calls` – Gauge: Aktive Anrufe
//! - `advocall_registered_participants` – Gauge: Teilnehmer im Verzeichnis
//! - `advocall_events_total` – Counter: Eingehende Ereignisse (kind)
//! - `advocall_dropped_messages_total` – Counter: Verworfene Ereignisse (grund)
//! - `advocall_http_requests_total` – Counter: HTTP-Anfragen (method, path, status)
//! - `advocall_http_request_duration_seconds` – Histogram: HTTP-Antwortzeit

use anyhow::Result;
use axum::{extract::State, response::IntoResponse, routing::get, Router};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

use crate::health::KennzahlenQuelle;

/// Alle advocall-Prometheus-Metriken
#[derive(Clone)]
pub struct AdvocallMetrics {
    pub registry: Arc<Registry>,

    // Koordinator-Metriken
    pub connected_sessions: IntGauge,
    pub active_calls: IntGauge,
    pub registered_participants: IntGauge,
    pub events_total: IntCounterVec,
    pub dropped_messages_total: IntCounterVec,

    // HTTP-Metriken
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,
}

impl AdvocallMetrics {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        // --- Koordinator-Metriken ---
        let connected_sessions = IntGauge::with_opts(Opts::new(
            "advocall_connected_sessions",
            "Anzahl aktuell gebundener Sessions",
        ))?;
        registry.register(Box::new(connected_sessions.clone()))?;

        let active_calls = IntGauge::with_opts(Opts::new(
            "advocall_active_calls",
            "Anzahl aktiver Anrufe",
        ))?;
        registry.register(Box::new(active_calls.clone()))?;

        let registered_participants = IntGauge::with_opts(Opts::new(
            "advocall_registered_participants",
            "Anzahl registrierter Teilnehmer",
        ))?;
        registry.register(Box::new(registered_participants.clone()))?;

        let events_total = IntCounterVec::new(
            Opts::new("advocall_events_total", "Verarbeitete eingehende Ereignisse"),
            &["kind"],
        )?;
        registry.register(Box::new(events_total.clone()))?;

        let dropped_messages_total = IntCounterVec::new(
            Opts::new(
                "advocall_dropped_messages_total",
                "Verworfene ausgehende Ereignisse",
            ),
            &["grund"],
        )?;
        registry.register(Box::new(dropped_messages_total.clone()))?;

        // --- HTTP-Metriken ---
        let http_requests_total = IntCounterVec::new(
            Opts::new("advocall_http_requests_total", "Gesamtanzahl HTTP-Anfragen"),
            &["method", "path", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "advocall_http_request_duration_seconds",
                "HTTP-Antwortzeit in Sekunden",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
            ]),
            &["method", "path"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            connected_sessions,
            active_calls,
            registered_participants,
            events_total,
            dropped_messages_total,
            http_requests_total,
            http_request_duration_seconds,
        })
    }

    /// Uebernimmt die aktuellen Kennzahlen in die Gauges
    pub fn gauges_aktualisieren(&self, quelle: &dyn KennzahlenQuelle) {
        let k = quelle.kennzahlen();
        self.connected_sessions.set(k.sessions as i64);
        self.active_calls.set(k.aktive_anrufe as i64);
        self.registered_participants.set(k.teilnehmer as i64);
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

#[derive(Clone)]
struct MetrikState {
    metriken: AdvocallMetrics,
    quelle: Arc<dyn KennzahlenQuelle>,
}

/// Axum-Router fuer den `/metrics`-Endpunkt
///
/// Die Gauges werden bei jedem Scrape aus der Kennzahlen-Quelle gesetzt.
pub fn metrics_router(metriken: AdvocallMetrics, quelle: Arc<dyn KennzahlenQuelle>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(MetrikState { metriken, quelle })
}

async fn metrics_handler(State(state): State<MetrikState>) -> impl IntoResponse {
    state.metriken.gauges_aktualisieren(state.quelle.as_ref());

    match state.metriken.exportieren() {
        Ok(text) => (
            axum::http::StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4",
            )],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Metriken-Export fehlgeschlagen: {err}");
            axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
