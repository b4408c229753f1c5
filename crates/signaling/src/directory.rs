//! Directory – In-Memory-Verzeichnis aller registrierten Teilnehmer
//!
//! Haelt Identitaet, Rolle und Status. Der Status wird ausschliesslich vom
//! Koordinator veraendert (Anrufbeginn/-ende). Die Pruefung auf doppelte
//! Identitaeten erfolgt durch den Aufrufer unter derselben Sperre.

use std::collections::HashMap;

use advocall_core::{Participant, ParticipantId, ParticipantInfo, PresenceStatus, Role};

/// Teilnehmer-Verzeichnis
#[derive(Debug, Default)]
pub struct Directory {
    teilnehmer: HashMap<ParticipantId, Participant>,
    /// Registrierungsreihenfolge fuer stabile Listen
    reihenfolge: Vec<ParticipantId>,
}

impl Directory {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Legt einen Teilnehmer mit frischer ID an
    pub fn registrieren(&mut self, identity: &str, credential_hash: &str, role: Role) -> Participant {
        let teilnehmer = Participant::neu(identity, credential_hash, role);
        self.reihenfolge.push(teilnehmer.id);
        self.teilnehmer.insert(teilnehmer.id, teilnehmer.clone());
        teilnehmer
    }

    pub fn finden(&self, id: ParticipantId) -> Option<&Participant> {
        self.teilnehmer.get(&id)
    }

    /// Lineare Suche nach der Identitaet (eindeutig per Invariante)
    pub fn nach_identitaet(&self, identity: &str) -> Option<&Participant> {
        self.reihenfolge
            .iter()
            .filter_map(|id| self.teilnehmer.get(id))
            .find(|p| p.identity == identity)
    }

    /// Schnappschuss aller Teilnehmer in Registrierungsreihenfolge
    pub fn alle(&self) -> Vec<Participant> {
        self.iter().cloned().collect()
    }

    /// Alle Teilnehmer einer Rolle
    pub fn nach_rolle(&self, role: Role) -> impl Iterator<Item = &Participant> {
        self.iter().filter(move |p| p.role == role)
    }

    /// Setzt den Status; No-op wenn der Teilnehmer fehlt
    pub fn status_setzen(&mut self, id: ParticipantId, status: PresenceStatus) {
        if let Some(p) = self.teilnehmer.get_mut(&id) {
            p.status = Some(status);
        }
    }

    /// Entfernt einen Teilnehmer explizit
    pub fn entfernen(&mut self, id: ParticipantId) -> Option<Participant> {
        let entfernt = self.teilnehmer.remove(&id)?;
        self.reihenfolge.retain(|pid| *pid != id);
        Some(entfernt)
    }

    /// LAWYER mit Status ONLINE
    pub fn online_anwaelte(&self) -> Vec<&Participant> {
        self.nach_rolle(Role::Lawyer)
            .filter(|p| p.status == Some(PresenceStatus::Online))
            .collect()
    }

    /// Oeffentliche Sicht aller Teilnehmer einer Rolle
    pub fn infos_nach_rolle(
        &self,
        role: Role,
        ist_verbunden: impl Fn(ParticipantId) -> bool,
    ) -> Vec<ParticipantInfo> {
        self.nach_rolle(role)
            .map(|p| p.info(ist_verbunden(p.id)))
            .collect()
    }

    pub fn anzahl(&self) -> usize {
        self.teilnehmer.len()
    }

    fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.reihenfolge.iter().filter_map(|id| self.teilnehmer.get(id))
    }
}
