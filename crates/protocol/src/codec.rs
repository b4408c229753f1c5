//! JSON-Codec fuer WebSocket-Text-Frames
//!
//! Jeder Text-Frame enthaelt genau ein Ereignis als JSON-Objekt.
//! Die maximale Nachrichtengroesse ist konfigurierbar (Standard: 64 KiB),
//! SDP-Offers liegen typischerweise deutlich darunter.

use thiserror::Error;

use crate::events::{ClientEvent, ServerEvent};

// ---------------------------------------------------------------------------
// Konstanten
// ---------------------------------------------------------------------------

/// Standard-maximale Nachrichtengroesse (64 KiB)
pub const DEFAULT_MAX_NACHRICHT_BYTES: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Fehler
// ---------------------------------------------------------------------------

/// Fehler beim Kodieren / Dekodieren von Ereignissen
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Nachricht zu gross: {laenge} Bytes (Maximum: {maximum} Bytes)")]
    ZuGross { laenge: usize, maximum: usize },

    #[error("Ungueltiges Ereignis: {0}")]
    UngueltigesEreignis(String),

    #[error("Serialisierung fehlgeschlagen: {0}")]
    Serialisierung(String),
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// Kodiert `ServerEvent`s und dekodiert `ClientEvent`s
#[derive(Debug, Clone, Copy)]
pub struct JsonCodec {
    max_nachricht_bytes: usize,
}

impl JsonCodec {
    /// Erstellt einen neuen `JsonCodec` mit Standard-Limit
    pub fn new() -> Self {
        Self {
            max_nachricht_bytes: DEFAULT_MAX_NACHRICHT_BYTES,
        }
    }

    /// Erstellt einen `JsonCodec` mit benutzerdefinierter maximaler Nachrichtengroesse
    pub fn with_max_size(max_nachricht_bytes: usize) -> Self {
        Self {
            max_nachricht_bytes,
        }
    }

    pub fn max_nachricht_bytes(&self) -> usize {
        self.max_nachricht_bytes
    }

    /// Dekodiert einen eingehenden Text-Frame
    pub fn dekodieren(&self, text: &str) -> Result<ClientEvent, ProtocolError> {
        if text.len() > self.max_nachricht_bytes {
            return Err(ProtocolError::ZuGross {
                laenge: text.len(),
                maximum: self.max_nachricht_bytes,
            });
        }

        serde_json::from_str(text).map_err(|e| ProtocolError::UngueltigesEreignis(e.to_string()))
    }

    /// Kodiert ein ausgehendes Ereignis als Text-Frame
    pub fn kodieren(&self, event: &ServerEvent) -> Result<String, ProtocolError> {
        let json =
            serde_json::to_string(event).map_err(|e| ProtocolError::Serialisierung(e.to_string()))?;

        if json.len() > self.max_nachricht_bytes {
            return Err(ProtocolError::ZuGross {
                laenge: json.len(),
                maximum: self.max_nachricht_bytes,
            });
        }

        Ok(json)
    }
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ErrorCode;

    #[test]
    fn gueltiges_ereignis_dekodieren() {
        let codec = JsonCodec::new();
        let event = codec
            .dekodieren(r#"{"type":"authenticate","token":"abc"}"#)
            .unwrap();
        match event {
            ClientEvent::Authenticate(req) => assert_eq!(req.token, "abc"),
            andere => panic!("Erwartet Authenticate, erhalten {:?}", andere),
        }
    }

    #[test]
    fn kaputtes_json_ist_ungueltiges_ereignis() {
        let codec = JsonCodec::new();
        let ergebnis = codec.dekodieren("{nicht json");
        assert!(matches!(ergebnis, Err(ProtocolError::UngueltigesEreignis(_))));
    }

    #[test]
    fn fehlendes_feld_ist_ungueltiges_ereignis() {
        let codec = JsonCodec::new();
        let ergebnis = codec.dekodieren(r#"{"type":"chat","message":"ohne Empfaenger"}"#);
        assert!(matches!(ergebnis, Err(ProtocolError::UngueltigesEreignis(_))));
    }

    #[test]
    fn zu_grosse_nachricht_wird_abgelehnt() {
        let codec = JsonCodec::with_max_size(16);
        let ergebnis = codec.dekodieren(r#"{"type":"authenticate","token":"sehr-langer-token"}"#);
        assert!(matches!(ergebnis, Err(ProtocolError::ZuGross { maximum: 16, .. })));
    }

    #[test]
    fn kodieren_respektiert_limit() {
        let codec = JsonCodec::with_max_size(10);
        let ergebnis = codec.kodieren(&ServerEvent::error(ErrorCode::InternalError, "zu lang"));
        assert!(ergebnis.is_err());
    }

    #[test]
    fn kodieren_erzeugt_typ_feld() {
        let codec = JsonCodec::new();
        let text = codec.kodieren(&ServerEvent::CallRejected).unwrap();
        assert_eq!(text, r#"{"type":"call-rejected"}"#);
    }

    #[test]
    fn default_max_size() {
        assert_eq!(JsonCodec::new().max_nachricht_bytes(), DEFAULT_MAX_NACHRICHT_BYTES);
    }
}
