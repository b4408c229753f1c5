//! Signaling-Ereignisse (WebSocket, JSON-Text-Frames)
//!
//! ## Design
//! - Jede Nachricht ist ein JSON-Objekt mit Diskriminator `type`
//!   (`chat`, `call-request`, `ice-candidate`, ...)
//! - Feldnamen in camelCase, kompatibel zu Browser-Clients
//! - Tagged Enums fuer typsichere Ereignisse in beide Richtungen
//! - SDP-/ICE-Inhalte bleiben opakes JSON und werden unveraendert weitergereicht

use advocall_core::{ParticipantId, ParticipantInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Fehler-Codes
// ---------------------------------------------------------------------------

/// Standardisierte Fehler-Codes fuer `error`-Ereignisse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Token fehlt, ist ungueltig oder abgelaufen
    AuthenticationFailed,
    /// Ereignis vor erfolgreicher Authentifizierung
    NotAuthenticated,
    /// Nachricht nicht parsebar oder unbekannter Typ
    InvalidEvent,
    /// Maximale Anzahl gleichzeitiger Sessions erreicht
    ServerFull,
    /// Session wurde durch eine neuere Verbindung ersetzt
    SessionReplaced,
    /// Teilnehmer wurde aus dem Verzeichnis entfernt
    ParticipantRemoved,
    InternalError,
}

// ---------------------------------------------------------------------------
// Eingehende Ereignisse (Teilnehmer -> Koordinator)
// ---------------------------------------------------------------------------

/// Authentifizierung eines Kanals mit einem Token aus `/api/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticateRequest {
    pub token: String,
}

/// Chat-Nachricht an einen anderen Teilnehmer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub receiver_id: ParticipantId,
    pub message: String,
}

/// WebRTC-Signal (offer / answer / ice-candidate)
///
/// Der Inhalt wird nicht interpretiert. Aeltere Clients senden ihn unter
/// `offer`, `answer` bzw. `candidate`, daher die Aliase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalRequest {
    pub target_id: ParticipantId,
    #[serde(alias = "offer", alias = "answer", alias = "candidate")]
    pub payload: serde_json::Value,
}

/// Anruf-Anfrage an einen Teilnehmer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    pub receiver_id: ParticipantId,
}

/// Antwort des Angerufenen (annehmen / ablehnen)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallReply {
    pub caller_id: ParticipantId,
}

/// Alle Ereignisse die ein Teilnehmer senden darf
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    Authenticate(AuthenticateRequest),
    Chat(ChatRequest),
    Offer(SignalRequest),
    Answer(SignalRequest),
    IceCandidate(SignalRequest),
    CallRequest(CallRequest),
    CallAccepted(CallReply),
    CallRejected(CallReply),
    CallEnd,
}

impl ClientEvent {
    /// Stabiler Name des Ereignistyps (fuer Logging und Metrik-Labels)
    pub fn art(&self) -> &'static str {
        match self {
            Self::Authenticate(_) => "authenticate",
            Self::Chat(_) => "chat",
            Self::Offer(_) => "offer",
            Self::Answer(_) => "answer",
            Self::IceCandidate(_) => "ice-candidate",
            Self::CallRequest(_) => "call-request",
            Self::CallAccepted(_) => "call-accepted",
            Self::CallRejected(_) => "call-rejected",
            Self::CallEnd => "call-end",
        }
    }
}

// ---------------------------------------------------------------------------
// Ausgehende Ereignisse (Koordinator -> Teilnehmer)
// ---------------------------------------------------------------------------

/// Bestaetigung einer erfolgreichen Kanal-Authentifizierung
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Authenticated {
    pub participant: ParticipantInfo,
}

/// Fehler-Ereignis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

/// Zugestellte Chat-Nachricht
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatDelivery {
    pub sender_id: ParticipantId,
    pub sender_identity: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Weitergeleitetes WebRTC-Signal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalForward {
    pub from_id: ParticipantId,
    pub target_id: ParticipantId,
    pub payload: serde_json::Value,
}

/// Eingehender Anruf
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingCall {
    pub caller_id: ParticipantId,
    pub caller_identity: String,
}

/// Anruf wurde vom Angerufenen angenommen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallAcceptedNotice {
    pub receiver_id: ParticipantId,
    pub receiver_identity: String,
}

/// Angerufener ist nicht erreichbar oder besetzt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallUnavailable {
    pub receiver_id: ParticipantId,
}

/// Rollen-partitionierte Presence-Liste
///
/// Genau eines der beiden Felder ist gesetzt: CLIENT-Sessions erhalten
/// `lawyers`, LAWYER-Sessions erhalten `clients`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserListUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lawyers: Option<Vec<ParticipantInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clients: Option<Vec<ParticipantInfo>>,
}

impl UserListUpdate {
    pub fn anwaelte(liste: Vec<ParticipantInfo>) -> Self {
        Self {
            lawyers: Some(liste),
            clients: None,
        }
    }

    pub fn mandanten(liste: Vec<ParticipantInfo>) -> Self {
        Self {
            lawyers: None,
            clients: Some(liste),
        }
    }
}

/// Alle Ereignisse die der Koordinator an einen Kanal sendet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    Authenticated(Authenticated),
    Error(ErrorResponse),
    Chat(ChatDelivery),
    Offer(SignalForward),
    Answer(SignalForward),
    IceCandidate(SignalForward),
    IncomingCall(IncomingCall),
    CallAccepted(CallAcceptedNotice),
    CallRejected,
    CallEnded,
    CallUnavailable(CallUnavailable),
    UserListUpdate(UserListUpdate),
}

impl ServerEvent {
    /// Erstellt ein Fehler-Ereignis
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error(ErrorResponse {
            code,
            message: message.into(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
