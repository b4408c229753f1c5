//! REST-Schnittstelle fuer Registrierung, Login und Profil
//!
//! Endpunkte:
//! - `POST   /api/register`          – Teilnehmer anlegen
//! - `POST   /api/login`             – Token ausgeben
//! - `POST   /api/logout`            – Token invalidieren (Bearer)
//! - `POST   /api/getProfile`        – Eigenes Profil (Bearer)
//! - `GET    /api/lawyers/online`    – LAWYER mit Status ONLINE
//! - `DELETE /api/participants/me`   – Eigenen Teilnehmer entfernen (Bearer)

use std::str::FromStr;
use std::sync::Arc;

use advocall_auth::AuthError;
use advocall_core::{Participant, Role};
use advocall_signaling::SignalingState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

/// Axum-Router mit allen `/api`-Endpunkten
pub fn rest_router(state: Arc<SignalingState>) -> Router {
    Router::new()
        .route("/api/register", post(registrieren))
        .route("/api/login", post(anmelden))
        .route("/api/logout", post(abmelden))
        .route("/api/getProfile", post(profil))
        .route("/api/lawyers/online", get(online_anwaelte))
        .route("/api/participants/me", delete(selbst_entfernen))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Hilfsfunktionen
// ---------------------------------------------------------------------------

fn fehler_antwort(status: StatusCode, nachricht: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "error": { "code": status.as_u16(), "message": nachricht.into() }
        })),
    )
        .into_response()
}

fn auth_fehler_antwort(fehler: &AuthError) -> Response {
    let status =
        StatusCode::from_u16(fehler.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    fehler_antwort(status, fehler.to_string())
}

/// Extrahiert das Bearer-Token aus dem Authorization-Header
fn token_aus_headers(headers: &HeaderMap) -> Result<&str, Response> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| fehler_antwort(StatusCode::UNAUTHORIZED, "Authorization-Header fehlt"))
}

/// Validiert das Bearer-Token und liefert den Teilnehmer
async fn teilnehmer_aus_headers(
    state: &SignalingState,
    headers: &HeaderMap,
) -> Result<Participant, Response> {
    let token = token_aus_headers(headers)?;
    state
        .auth_service
        .token_validieren(token)
        .await
        .map_err(|e| auth_fehler_antwort(&e))
}

fn nicht_leer(wert: Option<String>) -> Option<String> {
    wert.filter(|w| !w.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RegistrierenBody {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

async fn registrieren(
    State(state): State<Arc<SignalingState>>,
    Json(body): Json<RegistrierenBody>,
) -> Response {
    let (Some(username), Some(password), Some(role)) = (
        nicht_leer(body.username),
        nicht_leer(body.password),
        nicht_leer(body.role),
    ) else {
        return fehler_antwort(
            StatusCode::BAD_REQUEST,
            "username, password und role sind Pflichtfelder",
        );
    };

    let role = match Role::from_str(&role) {
        Ok(r) => r,
        Err(e) => return fehler_antwort(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match state
        .auth_service
        .registrieren(&username, &password, role)
        .await
    {
        Ok(teilnehmer) => (
            StatusCode::OK,
            Json(json!({
                "message": "Registrierung erfolgreich",
                "response": teilnehmer.info(false),
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(identity = %username, fehler = %e, "Registrierung abgelehnt");
            auth_fehler_antwort(&e)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnmeldenBody {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

async fn anmelden(
    State(state): State<Arc<SignalingState>>,
    Json(body): Json<AnmeldenBody>,
) -> Response {
    let identity = nicht_leer(body.email).or_else(|| nicht_leer(body.username));
    let (Some(identity), Some(password)) = (identity, nicht_leer(body.password)) else {
        return fehler_antwort(StatusCode::BAD_REQUEST, "Identitaet und Passwort erforderlich");
    };

    match state.auth_service.anmelden(&identity, &password).await {
        Ok((_, eintrag)) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "msg": "Login erfolgreich",
                "token": eintrag.token,
            })),
        )
            .into_response(),
        Err(e) => auth_fehler_antwort(&e),
    }
}

async fn abmelden(State(state): State<Arc<SignalingState>>, headers: HeaderMap) -> Response {
    let token = match token_aus_headers(&headers) {
        Ok(t) => t,
        Err(r) => return r,
    };
    match state.auth_service.abmelden(token).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => auth_fehler_antwort(&e),
    }
}

async fn profil(State(state): State<Arc<SignalingState>>, headers: HeaderMap) -> Response {
    let teilnehmer = match teilnehmer_aus_headers(&state, &headers).await {
        Ok(t) => t,
        Err(r) => return r,
    };

    // Verbindungsstatus aus dem Koordinator, nicht aus dem Token-Schnappschuss
    let info = state
        .coordinator
        .teilnehmer_info(teilnehmer.id)
        .unwrap_or_else(|| teilnehmer.info(false));

    (StatusCode::OK, Json(json!({ "success": true, "data": info }))).into_response()
}

async fn online_anwaelte(State(state): State<Arc<SignalingState>>) -> Response {
    let anwaelte = state.coordinator.online_anwaelte();
    (StatusCode::OK, Json(json!({ "success": true, "data": anwaelte }))).into_response()
}

async fn selbst_entfernen(
    State(state): State<Arc<SignalingState>>,
    headers: HeaderMap,
) -> Response {
    let teilnehmer = match teilnehmer_aus_headers(&state, &headers).await {
        Ok(t) => t,
        Err(r) => return r,
    };

    if state.coordinator.entfernen(teilnehmer.id).is_none() {
        return fehler_antwort(StatusCode::NOT_FOUND, "Teilnehmer nicht gefunden");
    }
    state.auth_service.teilnehmer_entfernt(teilnehmer.id).await;

    (
        StatusCode::OK,
        Json(json!({ "success": true, "msg": "Teilnehmer entfernt" })),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
