//! Chat-Handler – Textnachrichten zwischen Teilnehmern
//!
//! Fire-and-forget: keine Zustellgarantie, keine Zwischenspeicherung.

use advocall_core::ParticipantId;
use advocall_protocol::events::{ChatDelivery, ChatRequest};
use advocall_protocol::ServerEvent;
use chrono::Utc;

use super::RouterKontext;

/// Leitet eine Chat-Nachricht an die Session des Empfaengers weiter
pub(crate) fn handle_chat(ctx: &mut RouterKontext<'_>, absender: ParticipantId, req: ChatRequest) {
    let zustellung = ChatDelivery {
        sender_id: absender,
        sender_identity: ctx.identitaet(absender),
        message: req.message,
        timestamp: Utc::now(),
    };

    if ctx.zustellen(req.receiver_id, ServerEvent::Chat(zustellung)) {
        tracing::debug!(
            sender_id = %absender,
            receiver_id = %req.receiver_id,
            "Chat-Nachricht weitergeleitet"
        );
    }
}
