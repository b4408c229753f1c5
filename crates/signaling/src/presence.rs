//! Presence Broadcaster – rollen-partitionierte Teilnehmerlisten
//!
//! Nach jedem Ereignis das Status oder Erreichbarkeit aendert (Authentifizierung,
//! Trennung, Anrufbeginn/-ende) werden die Listen aus dem Verzeichnis neu
//! berechnet: CLIENT-Sessions erhalten die LAWYER-Liste, LAWYER-Sessions die
//! CLIENT-Liste. Zustellung ist best-effort ohne Wiederholung.

use advocall_core::Role;
use advocall_protocol::{ServerEvent, UserListUpdate};

use crate::directory::Directory;
use crate::sessions::SessionRegistry;

/// Ergebnis eines Presence-Broadcasts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresenceErgebnis {
    pub gesendet: usize,
    pub verworfen: usize,
}

/// Sendet die aktuellen Listen an alle gebundenen Sessions
pub fn broadcast(verzeichnis: &Directory, sessions: &SessionRegistry) -> PresenceErgebnis {
    let ist_verbunden = |id| sessions.ist_gebunden(id);
    let anwaelte = verzeichnis.infos_nach_rolle(Role::Lawyer, ist_verbunden);
    let mandanten = verzeichnis.infos_nach_rolle(Role::Client, ist_verbunden);

    let mut ergebnis = PresenceErgebnis::default();
    for session in sessions.iter() {
        let Some(teilnehmer) = verzeichnis.finden(session.participant_id) else {
            continue;
        };

        let update = match teilnehmer.role.gegenrolle() {
            Role::Lawyer => UserListUpdate::anwaelte(anwaelte.clone()),
            Role::Client => UserListUpdate::mandanten(mandanten.clone()),
        };

        match session.senden(ServerEvent::UserListUpdate(update)) {
            Ok(()) => ergebnis.gesendet += 1,
            Err(_) => ergebnis.verworfen += 1,
        }
    }

    tracing::debug!(
        gesendet = ergebnis.gesendet,
        verworfen = ergebnis.verworfen,
        "Presence-Listen verteilt"
    );
    ergebnis
}
