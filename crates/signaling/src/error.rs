//! Fehlertypen fuer den Signaling-Service

use advocall_auth::AuthError;
use advocall_core::{CoreError, ParticipantId};
use advocall_protocol::{ErrorCode, ProtocolError};
use thiserror::Error;

/// Fehlertyp fuer den Signaling-Service
///
/// Kein Fehler ist fatal fuer den Prozess: jeder Fehler betrifft genau ein
/// Ereignis auf genau einem Kanal.
#[derive(Debug, Error)]
pub enum SignalingError {
    /// Token fehlt, ist ungueltig oder abgelaufen
    #[error("Authentifizierung fehlgeschlagen: {0}")]
    AuthenticationFailed(String),

    /// Ziel unbekannt oder ohne gebundene Session
    #[error("Ziel nicht erreichbar: {0}")]
    TargetUnreachable(ParticipantId),

    /// Eingehendes Ereignis nicht parsebar
    #[error("Ungueltiges Ereignis: {0}")]
    InvalidEventShape(String),

    /// Identitaet bei der Registrierung bereits vergeben
    #[error("Identitaet bereits vergeben: {0}")]
    DuplicateIdentity(String),

    /// Kanal noch nicht authentifiziert
    #[error("Kanal nicht authentifiziert")]
    NichtAuthentifiziert,

    /// Maximale Anzahl gleichzeitiger Sessions erreicht
    #[error("Server ist voll")]
    ServerVoll,

    /// Ausgehende Queue voll oder geschlossen
    #[error("Senden fehlgeschlagen")]
    SendFehler,

    /// Interner Fehler
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl SignalingError {
    /// Erstellt einen internen Fehler
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Fehler-Code fuer das `error`-Ereignis an den Kanal
    pub fn fehler_code(&self) -> ErrorCode {
        match self {
            Self::AuthenticationFailed(_) => ErrorCode::AuthenticationFailed,
            Self::InvalidEventShape(_) => ErrorCode::InvalidEvent,
            Self::NichtAuthentifiziert => ErrorCode::NotAuthenticated,
            Self::ServerVoll => ErrorCode::ServerFull,
            Self::TargetUnreachable(_)
            | Self::DuplicateIdentity(_)
            | Self::SendFehler
            | Self::Intern(_) => ErrorCode::InternalError,
        }
    }
}

impl From<ProtocolError> for SignalingError {
    fn from(e: ProtocolError) -> Self {
        Self::InvalidEventShape(e.to_string())
    }
}

impl From<AuthError> for SignalingError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::IdentitaetVergeben(identity)
            | AuthError::Verzeichnis(CoreError::IdentitaetVergeben(identity)) => {
                Self::DuplicateIdentity(identity)
            }
            e if e.ist_token_fehler() => Self::AuthenticationFailed(e.to_string()),
            e => Self::Intern(e.to_string()),
        }
    }
}

impl From<CoreError> for SignalingError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::IdentitaetVergeben(identity) => Self::DuplicateIdentity(identity),
            e => Self::Intern(e.to_string()),
        }
    }
}

/// Result-Typ fuer den Signaling-Service
pub type SignalingResult<T> = Result<T, SignalingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_fehler_werden_zu_authentication_failed() {
        let e = SignalingError::from(AuthError::TokenAbgelaufen);
        assert!(matches!(e, SignalingError::AuthenticationFailed(_)));
        assert_eq!(e.fehler_code(), ErrorCode::AuthenticationFailed);
    }

    #[test]
    fn protokollfehler_wird_zu_invalid_event_shape() {
        let e = SignalingError::from(ProtocolError::UngueltigesEreignis("x".into()));
        assert_eq!(e.fehler_code(), ErrorCode::InvalidEvent);
    }

    #[test]
    fn duplikat_aus_verzeichnis() {
        let e = SignalingError::from(CoreError::IdentitaetVergeben("a@b".into()));
        assert!(matches!(e, SignalingError::DuplicateIdentity(ref i) if i == "a@b"));
    }
}
