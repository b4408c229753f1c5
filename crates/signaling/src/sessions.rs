//! Session Registry – Teilnehmer -> aktueller Ausgangskanal
//!
//! Pro Teilnehmer ist hoechstens eine Session gebunden. Ein neues `binden`
//! ersetzt die vorherige Session; deren `ClientSender` wird an den Aufrufer
//! zurueckgegeben und beim Verwerfen schliesst sich die alte Queue.

use std::collections::HashMap;

use advocall_core::{ConnectionId, ParticipantId};
use advocall_protocol::ServerEvent;
use tokio::sync::mpsc;

use crate::error::{SignalingError, SignalingResult};

/// Standard-Groesse der Send-Queue pro Session
pub const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// ClientSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue einer verbundenen Session
#[derive(Debug)]
pub struct ClientSender {
    pub participant_id: ParticipantId,
    pub connection_id: ConnectionId,
    tx: mpsc::Sender<ServerEvent>,
}

impl ClientSender {
    pub fn neu(
        participant_id: ParticipantId,
        connection_id: ConnectionId,
        tx: mpsc::Sender<ServerEvent>,
    ) -> Self {
        Self {
            participant_id,
            connection_id,
            tx,
        }
    }

    /// Sendet ein Ereignis nicht-blockierend an die Session
    ///
    /// Eine volle Queue verwirft das Ereignis, der Koordinator wartet nie.
    pub fn senden(&self, event: ServerEvent) -> SignalingResult<()> {
        match self.tx.try_send(event) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(
                    participant_id = %self.participant_id,
                    "Send-Queue voll, Ereignis verworfen"
                );
                Err(SignalingError::SendFehler)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(
                    participant_id = %self.participant_id,
                    "Send-Queue geschlossen (Kanal getrennt)"
                );
                Err(SignalingError::SendFehler)
            }
        }
    }

    /// Gibt die Queue-Seite zurueck (z.B. fuer eine erneute Bindung)
    pub fn into_tx(self) -> mpsc::Sender<ServerEvent> {
        self.tx
    }
}

// ---------------------------------------------------------------------------
// SessionRegistry
// ---------------------------------------------------------------------------

/// Registry der gebundenen Sessions
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<ParticipantId, ClientSender>,
}

impl SessionRegistry {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Bindet eine Session und gibt eine ersetzte Session zurueck
    pub fn binden(&mut self, sender: ClientSender) -> Option<ClientSender> {
        let ersetzt = self.sessions.insert(sender.participant_id, sender);
        if let Some(ref alt) = ersetzt {
            tracing::info!(
                participant_id = %alt.participant_id,
                connection_id = %alt.connection_id,
                "Bestehende Session ersetzt"
            );
        }
        ersetzt
    }

    pub fn lookup(&self, id: ParticipantId) -> Option<&ClientSender> {
        self.sessions.get(&id)
    }

    /// Loest die Bindung; idempotent
    pub fn loesen(&mut self, id: ParticipantId) -> Option<ClientSender> {
        self.sessions.remove(&id)
    }

    /// Loest die Bindung nur wenn sie noch zu dieser Verbindung gehoert
    ///
    /// Eine ersetzte Verbindung darf die neuere Session nicht loesen.
    pub fn loesen_fuer_verbindung(
        &mut self,
        id: ParticipantId,
        connection_id: ConnectionId,
    ) -> Option<ClientSender> {
        match self.sessions.get(&id) {
            Some(s) if s.connection_id == connection_id => self.sessions.remove(&id),
            _ => None,
        }
    }

    pub fn ist_gebunden(&self, id: ParticipantId) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn anzahl(&self) -> usize {
        self.sessions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClientSender> {
        self.sessions.values()
    }

    /// Sendet an die Session eines Teilnehmers
    pub fn senden(&self, ziel: ParticipantId, event: ServerEvent) -> SignalingResult<()> {
        match self.sessions.get(&ziel) {
            Some(sender) => sender.senden(event),
            None => Err(SignalingError::TargetUnreachable(ziel)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender(pid: ParticipantId) -> (ClientSender, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(4);
        (ClientSender::neu(pid, ConnectionId::new(), tx), rx)
    }

    #[tokio::test]
    async fn binden_und_senden() {
        let mut reg = SessionRegistry::neu();
        let pid = ParticipantId::new();
        let (s, mut rx) = sender(pid);

        assert!(reg.binden(s).is_none());
        reg.senden(pid, ServerEvent::CallEnded).unwrap();
        assert!(matches!(rx.try_recv(), Ok(ServerEvent::CallEnded)));
    }

    #[tokio::test]
    async fn zweite_bindung_ersetzt_erste() {
        let mut reg = SessionRegistry::neu();
        let pid = ParticipantId::new();
        let (s1, mut rx1) = sender(pid);
        let (s2, mut rx2) = sender(pid);

        reg.binden(s1);
        let alt = reg.binden(s2).expect("alte Session muss zurueckkommen");
        drop(alt);
        assert_eq!(reg.anzahl(), 1);

        // Alte Queue ist geschlossen, neue empfaengt
        assert!(matches!(
            rx1.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
        reg.senden(pid, ServerEvent::CallRejected).unwrap();
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn loesen_ist_idempotent() {
        let mut reg = SessionRegistry::neu();
        let pid = ParticipantId::new();
        let (s, _rx) = sender(pid);
        reg.binden(s);

        assert!(reg.loesen(pid).is_some());
        assert!(reg.loesen(pid).is_none());
        assert!(!reg.ist_gebunden(pid));
    }

    #[test]
    fn ersetzte_verbindung_loest_neue_session_nicht() {
        let mut reg = SessionRegistry::neu();
        let pid = ParticipantId::new();
        let (s1, _rx1) = sender(pid);
        let alte_verbindung = s1.connection_id;
        let (s2, _rx2) = sender(pid);

        reg.binden(s1);
        reg.binden(s2);

        assert!(reg.loesen_fuer_verbindung(pid, alte_verbindung).is_none());
        assert!(reg.ist_gebunden(pid));
    }

    #[test]
    fn senden_an_unbekannt() {
        let reg = SessionRegistry::neu();
        let ergebnis = reg.senden(ParticipantId::new(), ServerEvent::CallEnded);
        assert!(matches!(ergebnis, Err(SignalingError::TargetUnreachable(_))));
    }

    #[test]
    fn volle_queue_verwirft() {
        let pid = ParticipantId::new();
        let (tx, _rx) = mpsc::channel(1);
        let s = ClientSender::neu(pid, ConnectionId::new(), tx);

        assert!(s.senden(ServerEvent::CallEnded).is_ok());
        assert!(matches!(
            s.senden(ServerEvent::CallEnded),
            Err(SignalingError::SendFehler)
        ));
    }
}
