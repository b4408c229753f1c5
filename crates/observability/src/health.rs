//! Health-Check-Endpunkt fuer advocall
//!
//! Endpoint: `GET /health`
//! Response: JSON mit Status, Version, Uptime, Sessions und aktiven Anrufen

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Status des Health-Checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Session-Limit erreicht, neue Kanaele werden abgewiesen
    Degraded,
}

/// Laufzeit-Kennzahlen des Koordinators
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Kennzahlen {
    pub sessions: usize,
    pub max_sessions: usize,
    pub aktive_anrufe: usize,
    pub teilnehmer: usize,
}

/// Liefert aktuelle Kennzahlen (implementiert vom Server)
pub trait KennzahlenQuelle: Send + Sync + 'static {
    fn kennzahlen(&self) -> Kennzahlen;
}

/// Antwort des Health-Check-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub sessions: usize,
    pub active_calls: usize,
}

/// Geteilter Zustand fuer den Health-Check-Handler
#[derive(Clone)]
pub struct HealthState {
    pub start_time: Arc<Instant>,
    quelle: Arc<dyn KennzahlenQuelle>,
}

impl HealthState {
    pub fn neu(quelle: Arc<dyn KennzahlenQuelle>) -> Self {
        Self {
            start_time: Arc::new(Instant::now()),
            quelle,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Baut die Antwort aus den aktuellen Kennzahlen
    pub fn antwort(&self) -> HealthResponse {
        let k = self.quelle.kennzahlen();
        let status = if k.max_sessions > 0 && k.sessions >= k.max_sessions {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.uptime_seconds(),
            sessions: k.sessions,
            active_calls: k.aktive_anrufe,
        }
    }
}

/// Axum-Router fuer den `/health`-Endpunkt
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

/// `GET /health` – gibt den Serverstatus zurueck
///
/// 200 auch bei degraded, die Probe soll nicht failen.
async fn health_handler(State(state): State<HealthState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.antwort()))
}
