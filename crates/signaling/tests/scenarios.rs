//! Szenario-Tests fuer den Koordinator
//!
//! Kanaele werden durch `mpsc`-Queues ersetzt; die Tests lesen mit `try_recv`.

use std::sync::Arc;

use advocall_core::{ConnectionId, ParticipantId, ParticipantRepository, PresenceStatus, Role};
use advocall_protocol::events::{CallReply, CallRequest, ChatRequest, SignalRequest};
use advocall_protocol::{ClientEvent, ErrorCode, ServerEvent};
use advocall_signaling::{Coordinator, KeineMetriken, SignalingConfig};
use serde_json::json;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Hilfsfunktionen
// ---------------------------------------------------------------------------

struct Kanal {
    id: ParticipantId,
    conn: ConnectionId,
    rx: mpsc::Receiver<ServerEvent>,
}

impl Kanal {
    /// Alle wartenden Ereignisse ausser Presence-Listen
    fn ereignisse(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(e) = self.rx.try_recv() {
            if !matches!(e, ServerEvent::UserListUpdate(_)) {
                events.push(e);
            }
        }
        events
    }

    /// Alle wartenden Ereignisse inklusive Presence-Listen
    fn alle_ereignisse(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(e) = self.rx.try_recv() {
            events.push(e);
        }
        events
    }
}

fn registrieren(coord: &Coordinator, identity: &str, role: Role) -> ParticipantId {
    coord
        .registrieren(identity, "$argon2id$test", role)
        .expect("Registrierung fehlgeschlagen")
        .id
}

fn verbinden(coord: &Coordinator, id: ParticipantId) -> Kanal {
    let (tx, rx) = mpsc::channel(32);
    let conn = ConnectionId::new();
    coord
        .verbinden(id, conn, tx)
        .expect("Bindung fehlgeschlagen");
    let mut kanal = Kanal { id, conn, rx };
    kanal.alle_ereignisse();
    kanal
}

fn senden(coord: &Coordinator, kanal: &Kanal, event: ClientEvent) {
    coord.ereignis_verarbeiten(kanal.id, kanal.conn, event);
}

fn anruf(receiver_id: ParticipantId) -> ClientEvent {
    ClientEvent::CallRequest(CallRequest { receiver_id })
}

/// Anwalt L und Mandant C, beide verbunden
fn aufbau(coord: &Coordinator) -> (Kanal, Kanal) {
    let l = registrieren(coord, "kanzlei@example.com", Role::Lawyer);
    let c = registrieren(coord, "mandant@example.com", Role::Client);
    (verbinden(coord, l), verbinden(coord, c))
}

// ---------------------------------------------------------------------------
// Eigenschaften
// ---------------------------------------------------------------------------

#[tokio::test]
async fn hoechstens_eine_session_pro_teilnehmer() {
    let coord = Coordinator::default();
    let id = registrieren(&coord, "mandant", Role::Client);

    let mut erster = verbinden(&coord, id);
    let _zweiter = verbinden(&coord, id);

    assert_eq!(coord.statistik().sessions, 1);

    // Erster Kanal erhaelt den Hinweis und wird danach geschlossen
    let events = erster.alle_ereignisse();
    assert!(matches!(
        events.as_slice(),
        [ServerEvent::Error(e)] if e.code == ErrorCode::SessionReplaced
    ));
    assert!(matches!(
        erster.rx.try_recv(),
        Err(mpsc::error::TryRecvError::Disconnected)
    ));
}

#[tokio::test]
async fn ersetzte_verbindung_trennt_neue_session_nicht() {
    let coord = Coordinator::default();
    let (l, _c) = aufbau(&coord);
    let alte = l.conn;
    let _neu = verbinden(&coord, l.id);

    assert!(coord.trennen(l.id, alte).is_none());
    assert!(coord.ist_gebunden(l.id));
}

#[tokio::test]
async fn call_table_bleibt_symmetrisch_und_status_konsistent() {
    let coord = Coordinator::default();
    let (l, c) = aufbau(&coord);

    senden(&coord, &c, anruf(l.id));
    assert!(coord.invarianten_pruefen());
    assert_eq!(coord.peer_von(c.id), Some(l.id));
    assert_eq!(coord.peer_von(l.id), Some(c.id));
    assert_eq!(coord.status_von(l.id), Some(PresenceStatus::Busy));

    senden(&coord, &c, ClientEvent::CallEnd);
    assert!(coord.invarianten_pruefen());
    assert_eq!(coord.status_von(l.id), Some(PresenceStatus::Online));
}

#[tokio::test]
async fn call_end_ist_idempotent() {
    let coord = Coordinator::default();
    let (mut l, c) = aufbau(&coord);
    senden(&coord, &c, anruf(l.id));
    l.ereignisse();

    senden(&coord, &c, ClientEvent::CallEnd);
    assert!(matches!(l.ereignisse().as_slice(), [ServerEvent::CallEnded]));

    senden(&coord, &c, ClientEvent::CallEnd);
    assert!(l.ereignisse().is_empty());
    assert!(coord.aktive_anrufe().is_empty());
}

// ---------------------------------------------------------------------------
// Szenarien
// ---------------------------------------------------------------------------

#[tokio::test]
async fn vollstaendiger_anruf() {
    let coord = Coordinator::default();
    let (mut l, mut c) = aufbau(&coord);
    assert_eq!(coord.status_von(l.id), Some(PresenceStatus::Online));

    senden(&coord, &c, anruf(l.id));
    match l.ereignisse().as_slice() {
        [ServerEvent::IncomingCall(ic)] => {
            assert_eq!(ic.caller_id, c.id);
            assert_eq!(ic.caller_identity, "mandant@example.com");
        }
        andere => panic!("Erwartet incoming-call, erhalten {:?}", andere),
    }
    assert_eq!(coord.aktive_anrufe().len(), 1);
    assert_eq!(coord.status_von(l.id), Some(PresenceStatus::Busy));

    senden(
        &coord,
        &l,
        ClientEvent::CallAccepted(CallReply { caller_id: c.id }),
    );
    match c.ereignisse().as_slice() {
        [ServerEvent::CallAccepted(ca)] => {
            assert_eq!(ca.receiver_id, l.id);
            assert_eq!(ca.receiver_identity, "kanzlei@example.com");
        }
        andere => panic!("Erwartet call-accepted, erhalten {:?}", andere),
    }

    senden(&coord, &c, ClientEvent::CallEnd);
    assert!(matches!(l.ereignisse().as_slice(), [ServerEvent::CallEnded]));
    assert_eq!(coord.peer_von(l.id), None);
    assert_eq!(coord.peer_von(c.id), None);
    assert_eq!(coord.status_von(l.id), Some(PresenceStatus::Online));
}

#[tokio::test]
async fn anruf_an_besetzten_anwalt_wird_verworfen() {
    let coord = Coordinator::default();
    let (mut l, c) = aufbau(&coord);
    let c2_id = registrieren(&coord, "zweiter@example.com", Role::Client);
    let mut c2 = verbinden(&coord, c2_id);

    senden(&coord, &c, anruf(l.id));
    l.ereignisse();

    senden(&coord, &c2, anruf(l.id));
    assert!(l.ereignisse().is_empty(), "keine Zustellung an BUSY-Anwalt");
    assert!(c2.ereignisse().is_empty(), "kein Fehler an den Anrufer");
    assert_eq!(coord.peer_von(l.id), Some(c.id));
    assert_eq!(coord.peer_von(c2.id), None);
}

#[tokio::test]
async fn call_unavailable_wenn_konfiguriert() {
    let config = SignalingConfig {
        anruf_nicht_verfuegbar_melden: true,
        ..Default::default()
    };
    let coord = Coordinator::neu(Arc::new(config), Arc::new(KeineMetriken));
    let l = registrieren(&coord, "kanzlei", Role::Lawyer);
    let mut c = verbinden(&coord, registrieren(&coord, "mandant", Role::Client));

    // Anwalt ohne Session ist nicht erreichbar
    senden(&coord, &c, anruf(l));
    match c.ereignisse().as_slice() {
        [ServerEvent::CallUnavailable(cu)] => assert_eq!(cu.receiver_id, l),
        andere => panic!("Erwartet call-unavailable, erhalten {:?}", andere),
    }
    assert!(coord.aktive_anrufe().is_empty());
}

#[tokio::test]
async fn anwalt_trennt_waehrend_anruf() {
    let coord = Coordinator::default();
    let (l, mut c) = aufbau(&coord);
    senden(&coord, &c, anruf(l.id));

    coord.trennen(l.id, l.conn);

    assert!(matches!(c.ereignisse().as_slice(), [ServerEvent::CallEnded]));
    assert!(coord.aktive_anrufe().is_empty());
    assert!(!coord.ist_gebunden(l.id));
    assert_eq!(coord.status_von(l.id), Some(PresenceStatus::Online));
    assert!(coord.invarianten_pruefen());
}

#[tokio::test]
async fn chat_an_ungebundenen_empfaenger_wird_still_verworfen() {
    let coord = Coordinator::default();
    let offline = registrieren(&coord, "offline", Role::Lawyer);
    let mut c = verbinden(&coord, registrieren(&coord, "mandant", Role::Client));

    senden(
        &coord,
        &c,
        ClientEvent::Chat(ChatRequest {
            receiver_id: offline,
            message: "Hallo?".into(),
        }),
    );
    assert!(c.ereignisse().is_empty());

    // Auch voellig unbekannte IDs sind kein Fehler
    senden(
        &coord,
        &c,
        ClientEvent::Chat(ChatRequest {
            receiver_id: ParticipantId::new(),
            message: "Hallo?".into(),
        }),
    );
    assert!(c.ereignisse().is_empty());
}

#[tokio::test]
async fn chat_wird_mit_absender_zugestellt() {
    let coord = Coordinator::default();
    let (mut l, c) = aufbau(&coord);

    senden(
        &coord,
        &c,
        ClientEvent::Chat(ChatRequest {
            receiver_id: l.id,
            message: "Ich brauche Beratung".into(),
        }),
    );

    match l.ereignisse().as_slice() {
        [ServerEvent::Chat(chat)] => {
            assert_eq!(chat.sender_id, c.id);
            assert_eq!(chat.sender_identity, "mandant@example.com");
            assert_eq!(chat.message, "Ich brauche Beratung");
        }
        andere => panic!("Erwartet chat, erhalten {:?}", andere),
    }
}

#[tokio::test]
async fn signale_werden_unveraendert_weitergeleitet() {
    let coord = Coordinator::default();
    let (mut l, c) = aufbau(&coord);
    let sdp = json!({"type": "offer", "sdp": "v=0\r\no=- 1 1 IN IP4 0.0.0.0"});

    senden(
        &coord,
        &c,
        ClientEvent::Offer(SignalRequest {
            target_id: l.id,
            payload: sdp.clone(),
        }),
    );
    senden(
        &coord,
        &c,
        ClientEvent::IceCandidate(SignalRequest {
            target_id: l.id,
            payload: json!({"candidate": "candidate:1 1 udp 1 0.0.0.0 9 typ host"}),
        }),
    );

    let events = l.ereignisse();
    match events.as_slice() {
        [ServerEvent::Offer(o), ServerEvent::IceCandidate(ice)] => {
            assert_eq!(o.from_id, c.id);
            assert_eq!(o.target_id, l.id);
            assert_eq!(o.payload, sdp);
            assert_eq!(ice.from_id, c.id);
        }
        andere => panic!("Erwartet offer + ice-candidate, erhalten {:?}", andere),
    }
}

#[tokio::test]
async fn ablehnung_beendet_anruf() {
    let coord = Coordinator::default();
    let (mut l, mut c) = aufbau(&coord);
    senden(&coord, &c, anruf(l.id));
    l.ereignisse();

    senden(
        &coord,
        &l,
        ClientEvent::CallRejected(CallReply { caller_id: c.id }),
    );

    assert!(matches!(c.ereignisse().as_slice(), [ServerEvent::CallRejected]));
    assert!(coord.aktive_anrufe().is_empty());
    assert_eq!(coord.status_von(l.id), Some(PresenceStatus::Online));
}

#[tokio::test]
async fn annahme_ohne_passenden_anruf_wird_verworfen() {
    let coord = Coordinator::default();
    let (l, mut c) = aufbau(&coord);

    senden(
        &coord,
        &l,
        ClientEvent::CallAccepted(CallReply { caller_id: c.id }),
    );
    senden(
        &coord,
        &l,
        ClientEvent::CallRejected(CallReply { caller_id: c.id }),
    );
    assert!(c.ereignisse().is_empty());
}

#[tokio::test]
async fn anruf_an_sich_selbst_wird_verworfen() {
    let coord = Coordinator::default();
    let (mut l, _c) = aufbau(&coord);

    senden(&coord, &l, anruf(l.id));
    assert!(l.ereignisse().is_empty());
    assert!(coord.aktive_anrufe().is_empty());
}

#[tokio::test]
async fn presence_nach_anrufbeginn_zeigt_busy() {
    let coord = Coordinator::default();
    let (l, mut c) = aufbau(&coord);

    senden(&coord, &c, anruf(l.id));

    let listen: Vec<_> = c
        .alle_ereignisse()
        .into_iter()
        .filter_map(|e| match e {
            ServerEvent::UserListUpdate(u) => u.lawyers,
            _ => None,
        })
        .collect();
    let letzte = listen.last().expect("Mandant erhaelt eine Anwaltsliste");
    assert_eq!(letzte[0].status, Some(PresenceStatus::Busy));
}

#[tokio::test]
async fn anrufer_kann_eigenen_anruf_nicht_annehmen_oder_ablehnen() {
    let coord = Coordinator::default();
    let (mut l, c) = aufbau(&coord);
    senden(&coord, &c, anruf(l.id));
    l.ereignisse();

    // Anrufer gibt sich als Angerufener aus
    senden(
        &coord,
        &c,
        ClientEvent::CallAccepted(CallReply { caller_id: l.id }),
    );
    senden(
        &coord,
        &c,
        ClientEvent::CallRejected(CallReply { caller_id: l.id }),
    );

    assert!(l.ereignisse().is_empty());
    assert_eq!(coord.peer_von(l.id), Some(c.id));
    assert_eq!(coord.status_von(l.id), Some(PresenceStatus::Busy));
    assert!(coord.invarianten_pruefen());
}

#[tokio::test]
async fn anruf_wird_zurueckgenommen_wenn_incoming_call_nicht_zustellbar() {
    let coord = Coordinator::default();
    let l = registrieren(&coord, "kanzlei@example.com", Role::Lawyer);

    // Queue mit Platz fuer genau ein Ereignis: `authenticated` fuellt sie
    let (tx, _rx) = mpsc::channel(1);
    coord
        .verbinden(l, ConnectionId::new(), tx)
        .expect("Bindung fehlgeschlagen");
    let mut c = verbinden(&coord, registrieren(&coord, "mandant@example.com", Role::Client));

    senden(&coord, &c, anruf(l));

    assert!(coord.aktive_anrufe().is_empty());
    assert_eq!(coord.peer_von(c.id), None);
    assert_eq!(coord.status_von(l), Some(PresenceStatus::Online));
    assert!(coord.invarianten_pruefen());
    assert!(c.ereignisse().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn gleichzeitige_anrufe_ergeben_genau_eine_paarung() {
    let coord = Coordinator::default();
    let l = registrieren(&coord, "kanzlei@example.com", Role::Lawyer);
    let mut anwalt = verbinden(&coord, l);

    let mut mandanten = Vec::new();
    for i in 0..8 {
        let id = registrieren(&coord, &format!("mandant{i}@example.com"), Role::Client);
        mandanten.push(verbinden(&coord, id));
    }

    let start = Arc::new(tokio::sync::Barrier::new(mandanten.len()));
    let aufgaben: Vec<_> = mandanten
        .iter()
        .map(|m| {
            let coord = coord.clone();
            let start = start.clone();
            let (id, conn) = (m.id, m.conn);
            tokio::spawn(async move {
                start.wait().await;
                coord.ereignis_verarbeiten(id, conn, anruf(l));
            })
        })
        .collect();
    for aufgabe in aufgaben {
        aufgabe.await.expect("Aufgabe abgebrochen");
    }

    let anrufe = coord.aktive_anrufe();
    assert_eq!(anrufe.len(), 1);
    assert!(coord.invarianten_pruefen());
    assert_eq!(coord.status_von(l), Some(PresenceStatus::Busy));

    let anrufer = coord.peer_von(l).expect("Anwalt ist gepaart");
    assert!(mandanten.iter().any(|m| m.id == anrufer));
    match anwalt.ereignisse().as_slice() {
        [ServerEvent::IncomingCall(ic)] => assert_eq!(ic.caller_id, anrufer),
        andere => panic!("Erwartet genau ein incoming-call, erhalten {:?}", andere),
    }
}
