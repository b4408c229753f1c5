//! Client-Connection – Verwaltet einen einzelnen WebSocket-Kanal
//!
//! Jeder Kanal bekommt eine `ClientConnection` in einem eigenen tokio-Task.
//! Ausgehende Ereignisse laufen ueber eine begrenzte Queue, deren Sender
//! nach der Authentifizierung in der Session Registry liegt.
//!
//! ## Lebenszyklus
//! ```text
//! Verbunden --authenticate--> Gebunden --Close | Timeout | Ersetzung--> Getrennt
//! ```
//!
//! ## Keepalive
//! - Server sendet alle `keepalive_sek` einen Ping-Frame
//! - Ohne eingehenden Frame fuer `verbindungs_timeout_sek` wird getrennt

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use advocall_core::ConnectionId;
use advocall_protocol::{ErrorCode, ServerEvent};
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::dispatcher::{DispatcherContext, MessageDispatcher};
use crate::state::SignalingState;

/// Verarbeitet einen einzelnen WebSocket-Kanal
pub struct ClientConnection {
    state: Arc<SignalingState>,
    peer_addr: Option<SocketAddr>,
}

impl ClientConnection {
    pub fn neu(state: Arc<SignalingState>, peer_addr: Option<SocketAddr>) -> Self {
        Self { state, peer_addr }
    }

    /// Startet die Verarbeitungsschleife
    ///
    /// Laeuft bis der Kanal geschlossen, ersetzt oder der Server
    /// heruntergefahren wird. Danach wird die Session synchron getrennt.
    pub async fn verarbeiten(self, socket: WebSocket) {
        let config = Arc::clone(&self.state.config);
        let connection_id = ConnectionId::new();
        let peer = self
            .peer_addr
            .map(|a| a.to_string())
            .unwrap_or_else(|| "unbekannt".into());

        let keepalive_intervall = Duration::from_secs(config.keepalive_sek.max(1));
        let timeout_dauer = Duration::from_secs(config.verbindungs_timeout_sek);

        tracing::info!(peer = %peer, connection_id = %connection_id, "Neue Verbindung");

        let (mut ws_tx, mut ws_rx) = socket.split();
        let (sende_tx, mut sende_rx) =
            mpsc::channel::<ServerEvent>(config.send_queue_groesse.max(1));

        let mut ctx = DispatcherContext::neu(connection_id, sende_tx);
        let dispatcher = MessageDispatcher::neu(Arc::clone(&self.state));
        let mut shutdown_rx = self.state.shutdown_abonnieren();

        let mut letzter_empfang = Instant::now();
        let mut keepalive = tokio::time::interval_at(
            Instant::now() + keepalive_intervall,
            keepalive_intervall,
        );

        loop {
            tokio::select! {
                // Eingehender Frame vom Teilnehmer
                frame = ws_rx.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            letzter_empfang = Instant::now();
                            tracing::trace!(connection_id = %connection_id, laenge = text.len(), "Frame empfangen");

                            if let Some(antwort) = dispatcher.dispatch(&text, &mut ctx).await {
                                if !self.ereignis_senden(&mut ws_tx, &antwort).await {
                                    break;
                                }
                            }
                        }
                        Some(Ok(Message::Binary(_))) => {
                            letzter_empfang = Instant::now();
                            let antwort = ServerEvent::error(
                                ErrorCode::InvalidEvent,
                                "Binaer-Frames werden nicht unterstuetzt",
                            );
                            if !self.ereignis_senden(&mut ws_tx, &antwort).await {
                                break;
                            }
                        }
                        Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                            letzter_empfang = Instant::now();
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            tracing::info!(connection_id = %connection_id, "Verbindung vom Teilnehmer geschlossen");
                            break;
                        }
                        Some(Err(e)) => {
                            tracing::warn!(connection_id = %connection_id, fehler = %e, "Frame-Lesefehler");
                            break;
                        }
                    }
                }

                // Ausgehendes Ereignis aus der Session-Queue
                ausgehend = sende_rx.recv() => {
                    match ausgehend {
                        Some(event) => {
                            if !self.ereignis_senden(&mut ws_tx, &event).await {
                                break;
                            }
                        }
                        None => {
                            tracing::info!(
                                connection_id = %connection_id,
                                "Session ersetzt oder entfernt, Verbindung wird geschlossen"
                            );
                            break;
                        }
                    }
                }

                // Keepalive und Idle-Timeout
                _ = keepalive.tick() => {
                    if letzter_empfang.elapsed() > timeout_dauer {
                        tracing::warn!(connection_id = %connection_id, "Verbindungs-Timeout");
                        break;
                    }
                    if let Err(e) = ws_tx.send(Message::Ping(Vec::new())).await {
                        tracing::warn!(connection_id = %connection_id, fehler = %e, "Ping-Senden fehlgeschlagen");
                        break;
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!(connection_id = %connection_id, "Shutdown-Signal, Verbindung wird getrennt");
                        let abschied = ServerEvent::error(
                            ErrorCode::InternalError,
                            "Server wird heruntergefahren",
                        );
                        self.ereignis_senden(&mut ws_tx, &abschied).await;
                        break;
                    }
                }
            }
        }

        // Session und Anruf synchron aufraeumen bevor der Kanal abgebaut ist
        dispatcher.verbindung_beendet(&mut ctx);
        let _ = ws_tx.close().await;

        tracing::info!(connection_id = %connection_id, "Verbindungs-Task beendet");
    }

    /// Kodiert und sendet ein Ereignis; `false` wenn der Kanal tot ist
    async fn ereignis_senden(
        &self,
        ws_tx: &mut SplitSink<WebSocket, Message>,
        event: &ServerEvent,
    ) -> bool {
        let text = match self.state.codec.kodieren(event) {
            Ok(text) => text,
            Err(e) => {
                // Nur dieses Ereignis ist betroffen
                tracing::error!(fehler = %e, "Ereignis konnte nicht kodiert werden");
                return true;
            }
        };

        match ws_tx.send(Message::Text(text)).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(fehler = %e, "Senden fehlgeschlagen");
                false
            }
        }
    }
}
