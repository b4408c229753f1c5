//! Call-Handler – Zustandsmaschine eines Anrufs
//!
//! ```text
//! IDLE --call-request--> AKTIV --call-end | call-rejected | Trennung--> IDLE
//! ```
//!
//! AKTIV wird nur ueber `CallTable::starten` erreicht, jeder Ausgang laeuft
//! ueber `CallTable::beenden`. Nach jeder Statusaenderung werden die
//! Presence-Listen verteilt.

use advocall_core::{ParticipantId, PresenceStatus};
use advocall_protocol::events::{
    CallAcceptedNotice, CallReply, CallRequest, CallUnavailable, IncomingCall,
};
use advocall_protocol::ServerEvent;

use super::RouterKontext;
use crate::metrics::grund;

/// `call-request`: startet einen Anruf wenn der Empfaenger verfuegbar ist
pub(crate) fn handle_call_request(
    ctx: &mut RouterKontext<'_>,
    absender: ParticipantId,
    req: CallRequest,
) {
    let empfaenger = req.receiver_id;

    if let Err(grund_text) = verfuegbarkeit_pruefen(ctx, absender, empfaenger) {
        tracing::debug!(
            caller_id = %absender,
            receiver_id = %empfaenger,
            grund = grund_text,
            "Anruf-Anfrage verworfen"
        );
        ctx.metriken.verworfen(grund::EMPFAENGER_NICHT_VERFUEGBAR);
        if ctx.config.anruf_nicht_verfuegbar_melden {
            ctx.zustellen(
                absender,
                ServerEvent::CallUnavailable(CallUnavailable {
                    receiver_id: empfaenger,
                }),
            );
        }
        return;
    }

    let zustand = &mut *ctx.zustand;
    zustand
        .anrufe
        .starten(absender, empfaenger, &mut zustand.verzeichnis);

    let anruf = IncomingCall {
        caller_id: absender,
        caller_identity: ctx.identitaet(absender),
    };
    if !ctx.zustellen(empfaenger, ServerEvent::IncomingCall(anruf)) {
        // Empfaenger hat die Anfrage nie gesehen: Anruf zuruecknehmen
        let zustand = &mut *ctx.zustand;
        zustand.anrufe.beenden(absender, &mut zustand.verzeichnis);
        return;
    }

    tracing::info!(caller_id = %absender, receiver_id = %empfaenger, "Anruf gestartet");
    ctx.presence_verteilen();
}

/// Prueft ob `empfaenger` von `absender` angerufen werden kann
fn verfuegbarkeit_pruefen(
    ctx: &RouterKontext<'_>,
    absender: ParticipantId,
    empfaenger: ParticipantId,
) -> Result<(), &'static str> {
    if absender == empfaenger {
        return Err("Anruf an sich selbst");
    }

    let zustand = &*ctx.zustand;
    let teilnehmer = zustand
        .verzeichnis
        .finden(empfaenger)
        .ok_or("Empfaenger unbekannt")?;

    if teilnehmer.ist_anwalt() && teilnehmer.status != Some(PresenceStatus::Online) {
        return Err("Anwalt nicht ONLINE");
    }
    if zustand.anrufe.ist_im_anruf(empfaenger) {
        return Err("Empfaenger bereits im Anruf");
    }
    if zustand.anrufe.ist_im_anruf(absender) {
        return Err("Anrufer bereits im Anruf");
    }
    if !zustand.sessions.ist_gebunden(empfaenger) {
        return Err("Empfaenger ohne Session");
    }
    Ok(())
}

/// `call-accepted`: benachrichtigt den Anrufer
///
/// Nur gueltig wenn der Absender der Angerufene eines Anrufs von `caller_id` ist.
pub(crate) fn handle_call_accepted(
    ctx: &mut RouterKontext<'_>,
    absender: ParticipantId,
    req: CallReply,
) {
    if ctx.zustand.anrufe.anrufer_von(absender) != Some(req.caller_id) {
        tracing::debug!(
            receiver_id = %absender,
            caller_id = %req.caller_id,
            "call-accepted ohne passenden Anruf verworfen"
        );
        ctx.metriken.verworfen(grund::KEIN_PASSENDER_ANRUF);
        return;
    }

    let notiz = CallAcceptedNotice {
        receiver_id: absender,
        receiver_identity: ctx.identitaet(absender),
    };
    if ctx.zustellen(req.caller_id, ServerEvent::CallAccepted(notiz)) {
        tracing::info!(caller_id = %req.caller_id, receiver_id = %absender, "Anruf angenommen");
    }
}

/// `call-rejected`: beendet den Anruf und benachrichtigt den Anrufer
///
/// Wie bei `call-accepted` darf nur der Angerufene ablehnen.
pub(crate) fn handle_call_rejected(
    ctx: &mut RouterKontext<'_>,
    absender: ParticipantId,
    req: CallReply,
) {
    if ctx.zustand.anrufe.anrufer_von(absender) != Some(req.caller_id) {
        tracing::debug!(
            receiver_id = %absender,
            caller_id = %req.caller_id,
            "call-rejected ohne passenden Anruf verworfen"
        );
        ctx.metriken.verworfen(grund::KEIN_PASSENDER_ANRUF);
        return;
    }

    let zustand = &mut *ctx.zustand;
    zustand.anrufe.beenden(req.caller_id, &mut zustand.verzeichnis);
    ctx.zustellen(req.caller_id, ServerEvent::CallRejected);

    tracing::info!(caller_id = %req.caller_id, receiver_id = %absender, "Anruf abgelehnt");
    ctx.presence_verteilen();
}

/// `call-end`: beendet den Anruf des Absenders; No-op ohne aktiven Anruf
pub(crate) fn handle_call_end(ctx: &mut RouterKontext<'_>, absender: ParticipantId) {
    if anruf_aufraeumen(ctx, absender) {
        ctx.presence_verteilen();
    }
}

/// Beendet einen eventuell aktiven Anruf und benachrichtigt den Peer
///
/// Gemeinsamer Pfad fuer `call-end`, Trennung und Entfernung.
/// Gibt `true` zurueck wenn ein Anruf beendet wurde.
pub(crate) fn anruf_aufraeumen(ctx: &mut RouterKontext<'_>, id: ParticipantId) -> bool {
    let zustand = &mut *ctx.zustand;
    let Some(peer) = zustand.anrufe.beenden(id, &mut zustand.verzeichnis) else {
        return false;
    };

    ctx.zustellen(peer, ServerEvent::CallEnded);
    tracing::info!(participant_id = %id, peer_id = %peer, "Anruf beendet");
    true
}
