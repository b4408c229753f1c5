//! advocall-server – Bibliotheks-Root
//!
//! Verdrahtet Koordinator, Auth-Service, REST-API, WebSocket-Endpunkt und
//! Observability zu einem lauffaehigen Server.

pub mod config;
pub mod metriken;
pub mod rest;

use std::net::SocketAddr;
use std::sync::Arc;

use advocall_auth::{AuthService, TokenStore};
use advocall_observability::{request_timing_layer, timing_middleware, AdvocallMetrics};
use advocall_signaling::{ws_router, Coordinator, SignalingState};
use anyhow::Result;
use axum::http::{HeaderValue, Method};
use axum::Router;
use config::{ServerConfig, Startkonto};
use metriken::{KoordinatorKennzahlen, PrometheusSignalingMetriken};
use tower_http::cors::CorsLayer;

/// Alle zur Laufzeit geteilten Dienste
pub struct Dienste {
    pub signaling: Arc<SignalingState>,
    pub tokens: Arc<TokenStore>,
    pub metriken: AdvocallMetrics,
}

impl Dienste {
    /// Baut Koordinator, Token-Store und Auth-Service aus der Konfiguration
    pub fn aufbauen(config: &ServerConfig) -> Result<Self> {
        let metriken = AdvocallMetrics::neu()?;
        let signaling_config = config.signaling_config();

        let coordinator = Coordinator::neu(
            Arc::clone(&signaling_config),
            Arc::new(PrometheusSignalingMetriken(metriken.clone())),
        );
        let tokens = Arc::new(TokenStore::mit_ttl(config.token_ttl()));
        let auth_service = AuthService::neu(Arc::new(coordinator.clone()), Arc::clone(&tokens))
            .mit_min_passwort_laenge(config.auth.min_passwort_laenge);

        let signaling = SignalingState::neu(signaling_config, coordinator, auth_service);

        Ok(Self {
            signaling,
            tokens,
            metriken,
        })
    }

    /// Registriert die konfigurierten Startkonten
    ///
    /// Fehlerhafte Eintraege werden protokolliert und uebersprungen.
    /// Gibt die Anzahl der angelegten Konten zurueck.
    pub async fn startkonten_anlegen(&self, konten: &[Startkonto]) -> usize {
        let mut angelegt = 0;
        for konto in konten {
            match self
                .signaling
                .auth_service
                .registrieren(&konto.identity, &konto.passwort, konto.role)
                .await
            {
                Ok(p) => {
                    tracing::info!(
                        participant_id = %p.id,
                        identity = %p.identity,
                        role = %p.role,
                        "Startkonto angelegt"
                    );
                    angelegt += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        identity = %konto.identity,
                        fehler = %e,
                        "Startkonto uebersprungen"
                    );
                }
            }
        }
        angelegt
    }

    /// HTTP-Anwendung: REST-API und `/ws`, mit Timing, Tracing und CORS
    pub fn app(&self, cors_origins: &[String]) -> Router {
        rest::rest_router(Arc::clone(&self.signaling))
            .merge(ws_router(Arc::clone(&self.signaling)))
            .layer(axum::middleware::from_fn_with_state(
                self.metriken.clone(),
                timing_middleware,
            ))
            .layer(request_timing_layer())
            .layer(cors_layer(cors_origins))
    }
}

/// CORS: entweder spezifische Origins oder alle
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
}

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Server-Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Koordinator, Token-Store und Auth-Service aufbauen
    /// 2. Startkonten registrieren
    /// 3. Token-Cleanup-Task starten
    /// 4. Observability-Server starten (falls aktiviert)
    /// 5. REST + WebSocket-Listener starten
    /// 6. Auf Ctrl-C warten, dann alle Kanaele schliessen
    pub async fn starten(self) -> Result<()> {
        let dienste = Dienste::aufbauen(&self.config)?;
        dienste
            .startkonten_anlegen(&self.config.server.startkonten)
            .await;
        let cleanup = TokenStore::cleanup_starten(&dienste.tokens);

        if self.config.observability.aktiviert {
            let addr: SocketAddr = self.config.observability_bind_adresse().parse()?;
            let metriken = dienste.metriken.clone();
            let quelle = Arc::new(KoordinatorKennzahlen(dienste.signaling.coordinator.clone()));
            tokio::spawn(async move {
                if let Err(e) =
                    advocall_observability::observability_server_starten(addr, metriken, quelle)
                        .await
                {
                    tracing::error!(fehler = %e, "Observability-Server beendet");
                }
            });
        }

        let http_addr: SocketAddr = self.config.http_bind_adresse().parse()?;
        let listener = tokio::net::TcpListener::bind(http_addr).await?;
        tracing::info!(
            server_name = %self.config.server.name,
            adresse = %http_addr,
            max_sessions = self.config.server.max_sessions,
            "Server laeuft. Warte auf Shutdown-Signal (Ctrl-C)..."
        );

        let app = dienste.app(&self.config.netzwerk.cors_origins);
        let signaling = Arc::clone(&dienste.signaling);
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(fehler = %e, "Ctrl-C-Handler fehlgeschlagen");
            }
            tracing::info!("Shutdown-Signal empfangen, Kanaele werden geschlossen");
            signaling.herunterfahren();
        })
        .await?;

        cleanup.abort();
        tracing::info!("Server beendet");
        Ok(())
    }
}
