//! Coordinator – Besitzer von Directory, Session Registry und Call Table
//!
//! Alle Zustandsaenderungen laufen unter einer einzigen Sperre, damit zwei
//! gleichzeitig eintreffende Ereignisse auf verschiedenen Kanaelen nie um
//! denselben Teilnehmer konkurrieren. Innerhalb der Sperre wird nie gewartet:
//! ausgehende Ereignisse gehen per `try_send` in die Queues der Sessions.
//!
//! Clone teilt den inneren Zustand.

use std::sync::Arc;

use advocall_core::{
    ConnectionId, CoreError, Participant, ParticipantId, ParticipantInfo, ParticipantRepository,
    PresenceStatus, Role,
};
use advocall_protocol::events::Authenticated;
use advocall_protocol::{ClientEvent, ErrorCode, ServerEvent};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::calls::CallTable;
use crate::directory::Directory;
use crate::error::SignalingError;
use crate::handlers::relay_handler::SignalArt;
use crate::handlers::{call_handler, chat_handler, relay_handler, RouterKontext};
use crate::metrics::{KeineMetriken, SignalingMetriken};
use crate::sessions::{ClientSender, SessionRegistry};
use crate::state::SignalingConfig;

// ---------------------------------------------------------------------------
// Zustand
// ---------------------------------------------------------------------------

/// Der gesamte veraenderliche Zustand des Koordinators
#[derive(Debug, Default)]
pub struct CoordinatorZustand {
    pub(crate) verzeichnis: Directory,
    pub(crate) sessions: SessionRegistry,
    pub(crate) anrufe: CallTable,
}

/// Abgelehnte Bindung; die Queue geht an die Verbindung zurueck
#[derive(Debug)]
pub struct Abgelehnt {
    pub fehler: SignalingError,
    pub tx: mpsc::Sender<ServerEvent>,
}

/// Momentaufnahme fuer Health und Metriken
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistik {
    pub teilnehmer: usize,
    pub sessions: usize,
    pub aktive_anrufe: usize,
    pub online_anwaelte: usize,
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    zustand: Mutex<CoordinatorZustand>,
    config: Arc<SignalingConfig>,
    metriken: Arc<dyn SignalingMetriken>,
}

impl Coordinator {
    /// Erstellt einen neuen, leeren Koordinator
    pub fn neu(config: Arc<SignalingConfig>, metriken: Arc<dyn SignalingMetriken>) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                zustand: Mutex::new(CoordinatorZustand::default()),
                config,
                metriken,
            }),
        }
    }

    pub fn config(&self) -> &SignalingConfig {
        &self.inner.config
    }

    pub fn metriken(&self) -> &dyn SignalingMetriken {
        self.inner.metriken.as_ref()
    }

    /// Fuehrt `f` unter der Sperre mit einem Router-Kontext aus
    fn mit_kontext<T>(&self, f: impl FnOnce(&mut RouterKontext<'_>) -> T) -> T {
        let mut zustand = self.inner.zustand.lock();
        let mut ctx = RouterKontext {
            zustand: &mut *zustand,
            config: &self.inner.config,
            metriken: self.inner.metriken.as_ref(),
        };
        f(&mut ctx)
    }

    // -----------------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------------

    /// Bindet einen authentifizierten Kanal an den Teilnehmer
    ///
    /// Eine vorhandene Session wird ersetzt und erhaelt vor dem Schliessen
    /// ein `error`-Ereignis. Danach gehen `authenticated` an den neuen Kanal
    /// und die Presence-Listen an alle.
    pub fn verbinden(
        &self,
        participant_id: ParticipantId,
        connection_id: ConnectionId,
        tx: mpsc::Sender<ServerEvent>,
    ) -> Result<ParticipantInfo, Abgelehnt> {
        self.mit_kontext(|ctx| {
            let Some(teilnehmer) = ctx.zustand.verzeichnis.finden(participant_id).cloned() else {
                return Err(Abgelehnt {
                    fehler: SignalingError::AuthenticationFailed(
                        "Teilnehmer nicht im Verzeichnis".into(),
                    ),
                    tx,
                });
            };

            let sessions = &ctx.zustand.sessions;
            if !sessions.ist_gebunden(participant_id)
                && sessions.anzahl() >= ctx.config.max_sessions
            {
                tracing::warn!(
                    participant_id = %participant_id,
                    max = ctx.config.max_sessions,
                    "Maximale Session-Anzahl erreicht"
                );
                return Err(Abgelehnt {
                    fehler: SignalingError::ServerVoll,
                    tx,
                });
            }

            // LAWYER ohne Anruf ist nach der Authentifizierung ONLINE
            if teilnehmer.ist_anwalt() && !ctx.zustand.anrufe.ist_im_anruf(participant_id) {
                ctx.zustand
                    .verzeichnis
                    .status_setzen(participant_id, PresenceStatus::Online);
            }

            let sender = ClientSender::neu(participant_id, connection_id, tx);
            if let Some(alt) = ctx.zustand.sessions.binden(sender) {
                let _ = alt.senden(ServerEvent::error(
                    ErrorCode::SessionReplaced,
                    "Session durch neue Verbindung ersetzt",
                ));
            }

            let info = ctx
                .zustand
                .verzeichnis
                .finden(participant_id)
                .map(|p| p.info(true))
                .unwrap_or_else(|| teilnehmer.info(true));

            ctx.zustellen(
                participant_id,
                ServerEvent::Authenticated(Authenticated {
                    participant: info.clone(),
                }),
            );
            ctx.presence_verteilen();

            tracing::info!(
                participant_id = %participant_id,
                connection_id = %connection_id,
                role = %teilnehmer.role,
                "Session gebunden"
            );
            Ok(info)
        })
    }

    /// Trennt die Session eines geschlossenen Kanals
    ///
    /// Laeuft die Verbindung nicht mehr unter dieser Session (ersetzt oder
    /// entfernt), passiert nichts. Sonst wird ein aktiver Anruf beendet und
    /// die Presence-Listen verteilt. Gibt die Queue der Session zurueck.
    pub fn trennen(
        &self,
        participant_id: ParticipantId,
        connection_id: ConnectionId,
    ) -> Option<mpsc::Sender<ServerEvent>> {
        self.mit_kontext(|ctx| {
            let Some(sender) = ctx
                .zustand
                .sessions
                .loesen_fuer_verbindung(participant_id, connection_id)
            else {
                tracing::debug!(
                    participant_id = %participant_id,
                    connection_id = %connection_id,
                    "Ersetzte Verbindung getrennt, Session bleibt"
                );
                return None;
            };

            call_handler::anruf_aufraeumen(ctx, participant_id);
            ctx.presence_verteilen();

            tracing::info!(
                participant_id = %participant_id,
                connection_id = %connection_id,
                "Session getrennt"
            );
            Some(sender.into_tx())
        })
    }

    // -----------------------------------------------------------------------
    // Ereignisse
    // -----------------------------------------------------------------------

    /// Verarbeitet ein Ereignis eines authentifizierten Kanals
    ///
    /// Ereignisse einer nicht (mehr) gebundenen Verbindung werden verworfen.
    pub fn ereignis_verarbeiten(
        &self,
        absender: ParticipantId,
        connection_id: ConnectionId,
        event: ClientEvent,
    ) {
        let art = event.art();
        self.inner.metriken.ereignis(art);

        self.mit_kontext(|ctx| {
            let gebunden = ctx
                .zustand
                .sessions
                .lookup(absender)
                .is_some_and(|s| s.connection_id == connection_id);
            if !gebunden {
                tracing::debug!(
                    participant_id = %absender,
                    connection_id = %connection_id,
                    art,
                    "Ereignis einer ungebundenen Verbindung verworfen"
                );
                return;
            }

            match event {
                ClientEvent::Authenticate(_) => {
                    tracing::debug!("authenticate wird vom Dispatcher behandelt");
                }
                ClientEvent::Chat(req) => chat_handler::handle_chat(ctx, absender, req),
                ClientEvent::Offer(req) => {
                    relay_handler::handle_signal(ctx, absender, SignalArt::Offer, req)
                }
                ClientEvent::Answer(req) => {
                    relay_handler::handle_signal(ctx, absender, SignalArt::Answer, req)
                }
                ClientEvent::IceCandidate(req) => {
                    relay_handler::handle_signal(ctx, absender, SignalArt::IceCandidate, req)
                }
                ClientEvent::CallRequest(req) => {
                    call_handler::handle_call_request(ctx, absender, req)
                }
                ClientEvent::CallAccepted(req) => {
                    call_handler::handle_call_accepted(ctx, absender, req)
                }
                ClientEvent::CallRejected(req) => {
                    call_handler::handle_call_rejected(ctx, absender, req)
                }
                ClientEvent::CallEnd => call_handler::handle_call_end(ctx, absender),
            }
        })
    }

    // -----------------------------------------------------------------------
    // Verzeichnis
    // -----------------------------------------------------------------------

    /// Entfernt einen Teilnehmer vollstaendig
    ///
    /// Beendet einen aktiven Anruf (Peer erhaelt `call-ended`), schliesst die
    /// Session und verteilt die Presence-Listen.
    pub fn entfernen(&self, participant_id: ParticipantId) -> Option<Participant> {
        self.mit_kontext(|ctx| {
            ctx.zustand.verzeichnis.finden(participant_id)?;

            call_handler::anruf_aufraeumen(ctx, participant_id);
            if let Some(session) = ctx.zustand.sessions.loesen(participant_id) {
                let _ = session.senden(ServerEvent::error(
                    ErrorCode::ParticipantRemoved,
                    "Teilnehmer wurde entfernt",
                ));
            }
            let entfernt = ctx.zustand.verzeichnis.entfernen(participant_id);
            ctx.presence_verteilen();

            tracing::info!(participant_id = %participant_id, "Teilnehmer entfernt");
            entfernt
        })
    }

    pub fn teilnehmer_info(&self, id: ParticipantId) -> Option<ParticipantInfo> {
        let zustand = self.inner.zustand.lock();
        let verbunden = zustand.sessions.ist_gebunden(id);
        zustand.verzeichnis.finden(id).map(|p| p.info(verbunden))
    }

    /// Alle Teilnehmer (Schnappschuss)
    pub fn alle_teilnehmer(&self) -> Vec<ParticipantInfo> {
        let zustand = self.inner.zustand.lock();
        zustand
            .verzeichnis
            .alle()
            .iter()
            .map(|p| p.info(zustand.sessions.ist_gebunden(p.id)))
            .collect()
    }

    /// LAWYER mit Status ONLINE
    pub fn online_anwaelte(&self) -> Vec<ParticipantInfo> {
        let zustand = self.inner.zustand.lock();
        zustand
            .verzeichnis
            .online_anwaelte()
            .into_iter()
            .map(|p| p.info(zustand.sessions.ist_gebunden(p.id)))
            .collect()
    }

    pub fn status_von(&self, id: ParticipantId) -> Option<PresenceStatus> {
        self.inner.zustand.lock().verzeichnis.finden(id)?.status
    }

    // -----------------------------------------------------------------------
    // Anrufe / Sessions (lesend)
    // -----------------------------------------------------------------------

    pub fn peer_von(&self, id: ParticipantId) -> Option<ParticipantId> {
        self.inner.zustand.lock().anrufe.peer_von(id)
    }

    pub fn ist_gebunden(&self, id: ParticipantId) -> bool {
        self.inner.zustand.lock().sessions.ist_gebunden(id)
    }

    pub fn aktive_anrufe(&self) -> Vec<(ParticipantId, ParticipantId)> {
        self.inner.zustand.lock().anrufe.aktive_anrufe()
    }

    pub fn statistik(&self) -> Statistik {
        let zustand = self.inner.zustand.lock();
        Statistik {
            teilnehmer: zustand.verzeichnis.anzahl(),
            sessions: zustand.sessions.anzahl(),
            aktive_anrufe: zustand.anrufe.anzahl(),
            online_anwaelte: zustand.verzeichnis.online_anwaelte().len(),
        }
    }

    /// Prueft die Invarianten ueber alle drei Tabellen
    ///
    /// - Call Table symmetrisch
    /// - LAWYER ist BUSY genau dann wenn er im Anruf ist
    /// - CLIENT traegt keinen Status
    pub fn invarianten_pruefen(&self) -> bool {
        let zustand = self.inner.zustand.lock();
        zustand.anrufe.ist_symmetrisch()
            && zustand.verzeichnis.alle().iter().all(|p| {
                let im_anruf = zustand.anrufe.ist_im_anruf(p.id);
                match p.role {
                    Role::Lawyer => (p.status == Some(PresenceStatus::Busy)) == im_anruf,
                    Role::Client => p.status.is_none(),
                }
            })
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::neu(Arc::new(SignalingConfig::default()), Arc::new(KeineMetriken))
    }
}

// ---------------------------------------------------------------------------
// Verzeichnis-Zugriff fuer den Auth-Service
// ---------------------------------------------------------------------------

impl ParticipantRepository for Coordinator {
    fn registrieren(
        &self,
        identity: &str,
        credential_hash: &str,
        role: Role,
    ) -> advocall_core::Result<Participant> {
        let mut zustand = self.inner.zustand.lock();
        if zustand.verzeichnis.nach_identitaet(identity).is_some() {
            return Err(CoreError::IdentitaetVergeben(identity.to_string()));
        }
        Ok(zustand.verzeichnis.registrieren(identity, credential_hash, role))
    }

    fn finden(&self, id: ParticipantId) -> Option<Participant> {
        self.inner.zustand.lock().verzeichnis.finden(id).cloned()
    }

    fn nach_identitaet(&self, identity: &str) -> Option<Participant> {
        self.inner
            .zustand
            .lock()
            .verzeichnis
            .nach_identitaet(identity)
            .cloned()
    }
}
