//! Repository-Schnittstelle des Teilnehmer-Verzeichnisses
//!
//! Der Auth-Service registriert und findet Teilnehmer ausschliesslich ueber
//! diesen Trait. Die einzige Implementierung ist der Koordinator im
//! Signaling-Crate, damit alle Mutationen unter derselben Sperre laufen.

use crate::error::Result;
use crate::participant::Participant;
use crate::types::{ParticipantId, Role};

/// Zugriff auf das Teilnehmer-Verzeichnis
pub trait ParticipantRepository: Send + Sync + 'static {
    /// Legt einen neuen Teilnehmer an
    ///
    /// Gibt `CoreError::IdentitaetVergeben` zurueck wenn die Identitaet existiert.
    fn registrieren(&self, identity: &str, credential_hash: &str, role: Role) -> Result<Participant>;

    /// Sucht einen Teilnehmer anhand seiner ID
    fn finden(&self, id: ParticipantId) -> Option<Participant>;

    /// Sucht einen Teilnehmer anhand seiner Identitaet (Login-Name)
    fn nach_identitaet(&self, identity: &str) -> Option<Participant>;
}
