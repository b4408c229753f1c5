//! Teilnehmer-Modell
//!
//! Ein `Participant` ist der vollstaendige Verzeichnis-Eintrag inklusive
//! Credential-Hash. Nach aussen (Presence-Listen, REST, `authenticated`)
//! wird ausschliesslich die `ParticipantInfo`-Sicht weitergegeben.

use serde::{Deserialize, Serialize};

use crate::types::{ParticipantId, PresenceStatus, Role};

/// Verzeichnis-Eintrag eines registrierten Teilnehmers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    /// Eindeutiger Login-Name (typischerweise die E-Mail-Adresse)
    pub identity: String,
    pub role: Role,
    /// Nur fuer `Role::Lawyer` gesetzt
    pub status: Option<PresenceStatus>,
    /// PHC-String des Passwort-Hashes
    pub credential_hash: String,
}

impl Participant {
    /// Erstellt einen neuen Teilnehmer mit frischer ID
    ///
    /// LAWYER starten mit Status ONLINE, CLIENT ohne Status.
    pub fn neu(identity: impl Into<String>, credential_hash: impl Into<String>, role: Role) -> Self {
        let status = match role {
            Role::Lawyer => Some(PresenceStatus::Online),
            Role::Client => None,
        };
        Self {
            id: ParticipantId::new(),
            identity: identity.into(),
            role,
            status,
            credential_hash: credential_hash.into(),
        }
    }

    pub fn ist_anwalt(&self) -> bool {
        self.role == Role::Lawyer
    }

    /// Oeffentliche Sicht ohne Credential-Hash
    pub fn info(&self, connected: bool) -> ParticipantInfo {
        ParticipantInfo {
            id: self.id,
            identity: self.identity.clone(),
            role: self.role,
            status: self.status,
            connected,
        }
    }
}

/// Oeffentliche Teilnehmer-Sicht (Presence-Listen, REST-Antworten)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    pub id: ParticipantId,
    pub identity: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PresenceStatus>,
    /// Ob aktuell eine Session gebunden ist
    #[serde(default)]
    pub connected: bool,
}
