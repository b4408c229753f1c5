//! advocall-core – Gemeinsame Typen, Traits und Fehlertypen
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen advocall-Crates gemeinsam genutzt werden: Identifikations-Typen,
//! das Teilnehmer-Modell und die Repository-Schnittstelle des Verzeichnisses.

pub mod error;
pub mod participant;
pub mod repository;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{CoreError, Result};
pub use participant::{Participant, ParticipantInfo};
pub use repository::ParticipantRepository;
pub use types::{ConnectionId, ParticipantId, PresenceStatus, Role};
