//! Fehlertypen fuer advocall-core
//!
//! Untermodule und abhaengige Crates konvertieren diese Fehler via `#[from]`.

use thiserror::Error;

/// Globaler Result-Alias fuer advocall-core
pub type Result<T> = std::result::Result<T, CoreError>;

/// Fehler die beim Zugriff auf das Teilnehmer-Verzeichnis auftreten koennen
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Identitaet (Benutzername / E-Mail) ist bereits registriert
    #[error("Identitaet bereits vergeben: {0}")]
    IdentitaetVergeben(String),

    /// Teilnehmer existiert nicht
    #[error("Teilnehmer nicht gefunden: {0}")]
    TeilnehmerNichtGefunden(String),

    /// Rolle ist weder CLIENT noch LAWYER
    #[error("Unbekannte Rolle: {0}")]
    UnbekannteRolle(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = CoreError::IdentitaetVergeben("anna@example.com".into());
        assert_eq!(e.to_string(), "Identitaet bereits vergeben: anna@example.com");
    }

    #[test]
    fn unbekannte_rolle_anzeige() {
        let e = CoreError::UnbekannteRolle("ADMIN".into());
        assert!(e.to_string().contains("ADMIN"));
    }
}
