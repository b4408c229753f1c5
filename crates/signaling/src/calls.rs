//! Call Table – symmetrische Paarung aktiver Anrufe
//!
//! Jeder Anruf wird als zwei gerichtete Eintraege gespeichert (`A->B`, `B->A`),
//! damit beide Seiten ihren Peer in O(1) finden. Eintraege entstehen und
//! verschwinden immer paarweise. Zusaetzlich wird die Richtung gemerkt
//! (Empfaenger -> Anrufer), damit nur der Angerufene annehmen oder ablehnen
//! kann. Beteiligte LAWYER sind waehrend des Anrufs BUSY und danach wieder ONLINE.

use std::collections::HashMap;

use advocall_core::{ParticipantId, PresenceStatus};

use crate::directory::Directory;

/// Tabelle der aktiven Anrufe
#[derive(Debug, Default)]
pub struct CallTable {
    paare: HashMap<ParticipantId, ParticipantId>,
    /// Empfaenger -> Anrufer
    anrufer: HashMap<ParticipantId, ParticipantId>,
}

impl CallTable {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Startet einen Anruf zwischen `anrufer` und `empfaenger`
    ///
    /// Bestehende Anrufe beider Seiten werden vorher beendet, damit die
    /// Tabelle symmetrisch bleibt. Ob ein Anruf angeboten wird, entscheidet
    /// der Router ueber `ist_im_anruf`.
    pub fn starten(
        &mut self,
        anrufer: ParticipantId,
        empfaenger: ParticipantId,
        verzeichnis: &mut Directory,
    ) {
        for id in [anrufer, empfaenger] {
            if let Some(alter_peer) = self.beenden(id, verzeichnis) {
                tracing::debug!(
                    participant_id = %id,
                    peer_id = %alter_peer,
                    "Bestehender Anruf durch neuen Anruf ueberschrieben"
                );
            }
        }

        self.paare.insert(anrufer, empfaenger);
        self.paare.insert(empfaenger, anrufer);
        self.anrufer.insert(empfaenger, anrufer);

        for id in [anrufer, empfaenger] {
            status_fuer_anwalt(verzeichnis, id, PresenceStatus::Busy);
        }
    }

    /// Beendet den Anruf von `id` und gibt den Peer zurueck
    ///
    /// Idempotent: ohne aktiven Anruf wird `None` zurueckgegeben und nichts veraendert.
    pub fn beenden(
        &mut self,
        id: ParticipantId,
        verzeichnis: &mut Directory,
    ) -> Option<ParticipantId> {
        let peer = self.paare.remove(&id)?;
        self.paare.remove(&peer);
        self.anrufer.remove(&id);
        self.anrufer.remove(&peer);

        for beteiligter in [id, peer] {
            status_fuer_anwalt(verzeichnis, beteiligter, PresenceStatus::Online);
        }
        Some(peer)
    }

    pub fn peer_von(&self, id: ParticipantId) -> Option<ParticipantId> {
        self.paare.get(&id).copied()
    }

    /// Anrufer eines Anrufs, in dem `id` der Angerufene ist
    pub fn anrufer_von(&self, id: ParticipantId) -> Option<ParticipantId> {
        self.anrufer.get(&id).copied()
    }

    pub fn ist_im_anruf(&self, id: ParticipantId) -> bool {
        self.paare.contains_key(&id)
    }

    /// Schnappschuss aller aktiven Anrufe, jedes Paar genau einmal
    pub fn aktive_anrufe(&self) -> Vec<(ParticipantId, ParticipantId)> {
        let mut anrufe: Vec<_> = self
            .paare
            .iter()
            .filter(|(a, b)| a < b)
            .map(|(a, b)| (*a, *b))
            .collect();
        anrufe.sort();
        anrufe
    }

    pub fn anzahl(&self) -> usize {
        self.paare.len() / 2
    }

    /// Prueft die Symmetrie-Invariante
    pub fn ist_symmetrisch(&self) -> bool {
        self.paare
            .iter()
            .all(|(a, b)| self.paare.get(b) == Some(a) && a != b)
            && self.anrufer.len() * 2 == self.paare.len()
            && self
                .anrufer
                .iter()
                .all(|(empfaenger, anrufer)| self.paare.get(empfaenger) == Some(anrufer))
    }
}

/// Status nur fuer LAWYER setzen; CLIENT tragen keinen Status
fn status_fuer_anwalt(verzeichnis: &mut Directory, id: ParticipantId, status: PresenceStatus) {
    let ist_anwalt = verzeichnis.finden(id).is_some_and(|p| p.ist_anwalt());
    if ist_anwalt {
        verzeichnis.status_setzen(id, status);
    }
}
