//! Signaling Router – Handler fuer alle eingehenden Ereignisse
//!
//! Jeder Handler arbeitet auf dem gesperrten Koordinator-Zustand und
//! bekommt die bereits authentifizierte Absender-ID. Fehlschlaege bleiben
//! auf das einzelne Ereignis beschraenkt: unerreichbare Ziele werden
//! verworfen und geloggt, nie an den Absender gemeldet.

pub mod call_handler;
pub mod chat_handler;
pub mod relay_handler;

use advocall_core::ParticipantId;
use advocall_protocol::ServerEvent;

use crate::coordinator::CoordinatorZustand;
use crate::error::SignalingError;
use crate::metrics::{grund, SignalingMetriken};
use crate::presence;
use crate::state::SignalingConfig;

/// Kontext eines Handler-Aufrufs (unter der Koordinator-Sperre)
pub(crate) struct RouterKontext<'a> {
    pub zustand: &'a mut CoordinatorZustand,
    pub config: &'a SignalingConfig,
    pub metriken: &'a dyn SignalingMetriken,
}

impl RouterKontext<'_> {
    /// Stellt ein Ereignis best-effort an die Session von `ziel` zu
    ///
    /// Gibt `true` zurueck wenn das Ereignis eingereiht wurde.
    pub fn zustellen(&self, ziel: ParticipantId, event: ServerEvent) -> bool {
        match self.zustand.sessions.senden(ziel, event) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(ziel = %ziel, fehler = %e, "Ereignis nicht zugestellt");
                self.metriken.verworfen(match e {
                    SignalingError::TargetUnreachable(_) => grund::ZIEL_NICHT_ERREICHBAR,
                    _ => grund::QUEUE_VOLL,
                });
                false
            }
        }
    }

    /// Verteilt die aktuellen Presence-Listen an alle Sessions
    pub fn presence_verteilen(&self) {
        let ergebnis = presence::broadcast(&self.zustand.verzeichnis, &self.zustand.sessions);
        for _ in 0..ergebnis.verworfen {
            self.metriken.verworfen(grund::PRESENCE);
        }
    }

    /// Identitaet eines Teilnehmers fuer ausgehende Ereignisse
    pub fn identitaet(&self, id: ParticipantId) -> String {
        self.zustand
            .verzeichnis
            .finden(id)
            .map(|p| p.identity.clone())
            .unwrap_or_default()
    }
}
