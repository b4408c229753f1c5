//! Message-Dispatcher – Routet eingehende Text-Frames
//!
//! Der Dispatcher dekodiert einen Frame, behandelt `authenticate` selbst
//! (Token-Pruefung ist asynchron) und reicht alle anderen Ereignisse an den
//! Koordinator weiter.
//!
//! ## Zustandspruefung
//! - `authenticate` ist immer erlaubt, auch erneut auf demselben Kanal
//! - alle anderen Ereignisse nur nach erfolgreicher Authentifizierung

use std::sync::Arc;

use advocall_core::{ConnectionId, ParticipantId};
use advocall_protocol::events::Authenticated;
use advocall_protocol::{ClientEvent, ErrorCode, ServerEvent};
use tokio::sync::mpsc;

use crate::error::SignalingError;
use crate::state::SignalingState;

/// Dispatcher-Kontext – Informationen ueber die aktuelle Verbindung
#[derive(Debug)]
pub struct DispatcherContext {
    pub connection_id: ConnectionId,
    /// Authentifizierter Teilnehmer (None wenn nicht authentifiziert)
    pub participant_id: Option<ParticipantId>,
    /// Queue-Seite des Kanals solange keine Session gebunden ist
    ///
    /// Nach dem Binden haelt nur noch die Session Registry den Sender, damit
    /// eine Ersetzung die Queue schliesst.
    ungebundene_queue: Option<mpsc::Sender<ServerEvent>>,
}

impl DispatcherContext {
    pub fn neu(connection_id: ConnectionId, queue: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            connection_id,
            participant_id: None,
            ungebundene_queue: Some(queue),
        }
    }
}

/// Zentraler Message-Dispatcher
pub struct MessageDispatcher {
    state: Arc<SignalingState>,
}

impl MessageDispatcher {
    pub fn neu(state: Arc<SignalingState>) -> Self {
        Self { state }
    }

    /// Verarbeitet einen Text-Frame und gibt eine direkte Antwort zurueck
    ///
    /// Direkte Antworten sind Fehler-Ereignisse; alles andere geht ueber die
    /// Session-Queue.
    pub async fn dispatch(&self, text: &str, ctx: &mut DispatcherContext) -> Option<ServerEvent> {
        let event = match self.state.codec.dekodieren(text) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(
                    connection_id = %ctx.connection_id,
                    fehler = %e,
                    "Ungueltiges Ereignis empfangen"
                );
                return Some(fehler_ereignis(&SignalingError::from(e)));
            }
        };

        match event {
            ClientEvent::Authenticate(req) => self.authentifizieren(&req.token, ctx).await,
            event => {
                let Some(participant_id) = ctx.participant_id else {
                    return Some(fehler_ereignis(&SignalingError::NichtAuthentifiziert));
                };
                self.state
                    .coordinator
                    .ereignis_verarbeiten(participant_id, ctx.connection_id, event);
                None
            }
        }
    }

    /// Prueft das Token und bindet den Kanal an den Teilnehmer
    async fn authentifizieren(
        &self,
        token: &str,
        ctx: &mut DispatcherContext,
    ) -> Option<ServerEvent> {
        let coordinator = &self.state.coordinator;
        coordinator.metriken().ereignis("authenticate");

        let teilnehmer = match self.state.auth_service.token_validieren(token).await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(
                    connection_id = %ctx.connection_id,
                    fehler = %e,
                    "Kanal-Authentifizierung fehlgeschlagen"
                );
                return Some(fehler_ereignis(&SignalingError::from(e)));
            }
        };

        // Gleicher Teilnehmer auf gleichem Kanal: Bindung bleibt bestehen
        if ctx.participant_id == Some(teilnehmer.id) {
            return coordinator
                .teilnehmer_info(teilnehmer.id)
                .map(|participant| ServerEvent::Authenticated(Authenticated { participant }));
        }

        // Anderer Teilnehmer: alte Bindung zuerst loesen
        let queue = match ctx.participant_id.take() {
            Some(alt) => coordinator.trennen(alt, ctx.connection_id),
            None => ctx.ungebundene_queue.take(),
        };
        let Some(queue) = queue else {
            return Some(ServerEvent::error(
                ErrorCode::SessionReplaced,
                "Verbindung wurde bereits ersetzt",
            ));
        };

        match coordinator.verbinden(teilnehmer.id, ctx.connection_id, queue) {
            Ok(_) => {
                ctx.participant_id = Some(teilnehmer.id);
                None
            }
            Err(abgelehnt) => {
                ctx.ungebundene_queue = Some(abgelehnt.tx);
                Some(fehler_ereignis(&abgelehnt.fehler))
            }
        }
    }

    /// Aufraeumen beim Verbindungsende
    pub fn verbindung_beendet(&self, ctx: &mut DispatcherContext) {
        if let Some(participant_id) = ctx.participant_id.take() {
            self.state
                .coordinator
                .trennen(participant_id, ctx.connection_id);
        }
        ctx.ungebundene_queue = None;
    }
}

/// Uebersetzt einen Fehler in ein `error`-Ereignis
pub fn fehler_ereignis(fehler: &SignalingError) -> ServerEvent {
    ServerEvent::error(fehler.fehler_code(), fehler.to_string())
}
