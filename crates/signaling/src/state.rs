//! Gemeinsamer Zustand fuer den Signaling-Service
//!
//! Haelt Koordinator, Auth-Service und Konfiguration als Arc-Referenzen,
//! die sicher zwischen Verbindungs-Tasks geteilt werden koennen.

use std::sync::Arc;

use advocall_auth::AuthService;
use advocall_protocol::{codec::DEFAULT_MAX_NACHRICHT_BYTES, JsonCodec};
use tokio::sync::watch;

use crate::coordinator::Coordinator;
use crate::sessions::SEND_QUEUE_GROESSE;

/// Konfiguration fuer den Signaling-Service
#[derive(Debug, Clone)]
pub struct SignalingConfig {
    /// Maximale Anzahl gleichzeitig gebundener Sessions
    pub max_sessions: usize,
    /// Groesse der ausgehenden Queue pro Verbindung
    pub send_queue_groesse: usize,
    /// Keepalive-Intervall in Sekunden
    pub keepalive_sek: u64,
    /// Timeout fuer inaktive Verbindungen in Sekunden
    pub verbindungs_timeout_sek: u64,
    /// Maximale Groesse eines Text-Frames in Bytes
    pub max_nachricht_bytes: usize,
    /// `call-unavailable` an den Anrufer senden statt still zu verwerfen
    pub anruf_nicht_verfuegbar_melden: bool,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            max_sessions: 1024,
            send_queue_groesse: SEND_QUEUE_GROESSE,
            keepalive_sek: 30,
            verbindungs_timeout_sek: 90,
            max_nachricht_bytes: DEFAULT_MAX_NACHRICHT_BYTES,
            anruf_nicht_verfuegbar_melden: false,
        }
    }
}

/// Gemeinsamer Server-Zustand (thread-safe, Arc-geteilt)
pub struct SignalingState {
    pub config: Arc<SignalingConfig>,
    /// Koordinator (Directory, Sessions, Anrufe)
    pub coordinator: Coordinator,
    /// Token-Validierung fuer `authenticate`
    pub auth_service: AuthService<Coordinator>,
    pub codec: JsonCodec,
    shutdown_tx: watch::Sender<bool>,
}

impl SignalingState {
    /// Erstellt einen neuen SignalingState
    pub fn neu(
        config: Arc<SignalingConfig>,
        coordinator: Coordinator,
        auth_service: AuthService<Coordinator>,
    ) -> Arc<Self> {
        let (shutdown_tx, _) = watch::channel(false);
        Arc::new(Self {
            codec: JsonCodec::with_max_size(config.max_nachricht_bytes),
            config,
            coordinator,
            auth_service,
            shutdown_tx,
        })
    }

    /// Abonniert das Shutdown-Signal (pro Verbindung)
    pub fn shutdown_abonnieren(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Signalisiert allen Verbindungen das Herunterfahren
    pub fn herunterfahren(&self) {
        self.shutdown_tx.send_replace(true);
    }
}
