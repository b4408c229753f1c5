//! Relay-Handler – WebRTC-Signale (offer / answer / ice-candidate)
//!
//! Der Inhalt wird nicht interpretiert und unveraendert weitergereicht,
//! ergaenzt um die Absender-ID.

use advocall_core::ParticipantId;
use advocall_protocol::events::{SignalForward, SignalRequest};
use advocall_protocol::ServerEvent;

use super::RouterKontext;

/// Art des weitergeleiteten Signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalArt {
    Offer,
    Answer,
    IceCandidate,
}

impl SignalArt {
    fn ereignis(self, weiterleitung: SignalForward) -> ServerEvent {
        match self {
            Self::Offer => ServerEvent::Offer(weiterleitung),
            Self::Answer => ServerEvent::Answer(weiterleitung),
            Self::IceCandidate => ServerEvent::IceCandidate(weiterleitung),
        }
    }
}

/// Leitet ein Signal an die Session des Ziels weiter
pub(crate) fn handle_signal(
    ctx: &mut RouterKontext<'_>,
    absender: ParticipantId,
    art: SignalArt,
    req: SignalRequest,
) {
    let ziel = req.target_id;
    let weiterleitung = SignalForward {
        from_id: absender,
        target_id: ziel,
        payload: req.payload,
    };

    if ctx.zustellen(ziel, art.ereignis(weiterleitung)) {
        tracing::trace!(from_id = %absender, target_id = %ziel, art = ?art, "Signal weitergeleitet");
    }
}
