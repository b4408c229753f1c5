//! Fehlertypen fuer den Auth-Service

use advocall_core::CoreError;
use thiserror::Error;

/// Alle moeglichen Fehler im Auth-Service
#[derive(Debug, Error)]
pub enum AuthError {
    // --- Passwort ---
    #[error("Passwort-Hashing fehlgeschlagen: {0}")]
    PasswortHashing(String),

    // --- Eingaben ---
    #[error("Ungueltige Eingabe: {0}")]
    UngueltigeEingabe(String),

    // --- Authentifizierung ---
    #[error("Identitaet oder Passwort falsch")]
    UngueltigeAnmeldedaten,

    // --- Token ---
    #[error("Token ungueltig")]
    TokenUngueltig,

    #[error("Token abgelaufen")]
    TokenAbgelaufen,

    // --- Verzeichnis ---
    #[error("Identitaet bereits vergeben: {0}")]
    IdentitaetVergeben(String),

    #[error("Teilnehmer nicht gefunden: {0}")]
    TeilnehmerNichtGefunden(String),

    #[error("Verzeichnisfehler: {0}")]
    Verzeichnis(#[from] CoreError),
}

impl AuthError {
    /// HTTP-Statuscode fuer die REST-Schnittstelle
    pub fn http_status(&self) -> u16 {
        match self {
            Self::UngueltigeEingabe(_) => 400,
            Self::Verzeichnis(CoreError::UnbekannteRolle(_)) => 400,
            Self::UngueltigeAnmeldedaten | Self::TokenUngueltig | Self::TokenAbgelaufen => 401,
            Self::TeilnehmerNichtGefunden(_) => 401,
            Self::Verzeichnis(CoreError::TeilnehmerNichtGefunden(_)) => 404,
            Self::IdentitaetVergeben(_) | Self::Verzeichnis(CoreError::IdentitaetVergeben(_)) => 409,
            Self::PasswortHashing(_) => 500,
        }
    }

    /// Gibt `true` zurueck wenn der Fehler eine fehlgeschlagene Token-Pruefung ist
    pub fn ist_token_fehler(&self) -> bool {
        matches!(
            self,
            Self::TokenUngueltig | Self::TokenAbgelaufen | Self::TeilnehmerNichtGefunden(_)
        )
    }
}

/// Result-Alias fuer den Auth-Service
pub type AuthResult<T> = Result<T, AuthError>;
