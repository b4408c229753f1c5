//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use std::sync::Arc;

use advocall_core::Role;
use advocall_signaling::SignalingConfig;
use serde::{Deserialize, Serialize};

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Allgemeine Server-Einstellungen
    pub server: ServerEinstellungen,
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Registrierung und Tokens
    pub auth: AuthEinstellungen,
    /// Signaling-Kanaele
    pub signaling: SignalingEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
    /// Observability-Einstellungen (Metriken, Health)
    pub observability: ObservabilityEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename des Servers
    pub name: String,
    /// Maximale Anzahl gleichzeitig gebundener Sessions
    pub max_sessions: usize,
    /// Konten, die beim Start registriert werden
    pub startkonten: Vec<Startkonto>,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "advocall".into(),
            max_sessions: 1024,
            startkonten: vec![],
        }
    }
}

/// Vorab angelegtes Konto (`[[server.startkonten]]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Startkonto {
    pub identity: String,
    pub passwort: String,
    pub role: Role,
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer alle Listener
    pub bind_adresse: String,
    /// Port fuer REST-API und WebSocket (`/ws`)
    pub http_port: u16,
    /// Port fuer Metriken und Health
    pub observability_port: u16,
    /// Erlaubte CORS-Origins fuer die REST-API (leer = alle erlaubt)
    pub cors_origins: Vec<String>,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            http_port: 8080,
            observability_port: 9300,
            cors_origins: vec![],
        }
    }
}

/// Registrierung und Tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthEinstellungen {
    /// Gueltigkeitsdauer eines Login-Tokens in Sekunden
    pub token_ttl_sek: u64,
    /// Minimale Passwortlaenge bei der Registrierung
    pub min_passwort_laenge: usize,
}

impl Default for AuthEinstellungen {
    fn default() -> Self {
        Self {
            token_ttl_sek: 3600,
            min_passwort_laenge: 1,
        }
    }
}

/// Einstellungen der Signaling-Kanaele
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalingEinstellungen {
    /// Groesse der ausgehenden Queue pro Session
    pub send_queue_groesse: usize,
    /// Ping-Intervall in Sekunden
    pub keepalive_sek: u64,
    /// Kanal ohne eingehende Frames wird nach dieser Zeit geschlossen
    pub verbindungs_timeout_sek: u64,
    /// Maximale Groesse eines Text-Frames in Bytes
    pub max_nachricht_bytes: usize,
    /// Anrufer erhaelt `call-unavailable` statt stiller Verwerfung
    pub anruf_nicht_verfuegbar_melden: bool,
}

impl Default for SignalingEinstellungen {
    fn default() -> Self {
        let standard = SignalingConfig::default();
        Self {
            send_queue_groesse: standard.send_queue_groesse,
            keepalive_sek: standard.keepalive_sek,
            verbindungs_timeout_sek: standard.verbindungs_timeout_sek,
            max_nachricht_bytes: standard.max_nachricht_bytes,
            anruf_nicht_verfuegbar_melden: standard.anruf_nicht_verfuegbar_melden,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Observability-Einstellungen (Metriken + Health-Check)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityEinstellungen {
    /// Aktiviert den Observability-Server
    pub aktiviert: bool,
}

impl Default for ObservabilityEinstellungen {
    fn default() -> Self {
        Self { aktiviert: true }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        let config = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => toml::from_str::<Self>(&inhalt)
                .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Self::default()
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
                ))
            }
        };
        config.validieren()?;
        Ok(config)
    }

    /// Prueft Werte, die serde allein nicht abfangen kann
    pub fn validieren(&self) -> anyhow::Result<()> {
        use advocall_observability::logging::{log_format_gueltig, log_level_gueltig};

        if self.server.max_sessions == 0 {
            anyhow::bail!("server.max_sessions muss groesser als 0 sein");
        }
        if self.signaling.send_queue_groesse == 0 {
            anyhow::bail!("signaling.send_queue_groesse muss groesser als 0 sein");
        }
        if self.signaling.keepalive_sek == 0 {
            anyhow::bail!("signaling.keepalive_sek muss groesser als 0 sein");
        }
        if self.signaling.verbindungs_timeout_sek < self.signaling.keepalive_sek {
            anyhow::bail!(
                "signaling.verbindungs_timeout_sek ({}) ist kleiner als keepalive_sek ({})",
                self.signaling.verbindungs_timeout_sek,
                self.signaling.keepalive_sek
            );
        }
        if self.auth.token_ttl_sek == 0 {
            anyhow::bail!("auth.token_ttl_sek muss groesser als 0 sein");
        }
        if !log_level_gueltig(&self.logging.level) {
            anyhow::bail!("Unbekanntes Log-Level '{}'", self.logging.level);
        }
        if !log_format_gueltig(&self.logging.format) {
            anyhow::bail!("Unbekanntes Log-Format '{}'", self.logging.format);
        }
        Ok(())
    }

    /// Baut die Konfiguration fuer den Signaling-Crate
    pub fn signaling_config(&self) -> Arc<SignalingConfig> {
        Arc::new(SignalingConfig {
            max_sessions: self.server.max_sessions,
            send_queue_groesse: self.signaling.send_queue_groesse,
            keepalive_sek: self.signaling.keepalive_sek,
            verbindungs_timeout_sek: self.signaling.verbindungs_timeout_sek,
            max_nachricht_bytes: self.signaling.max_nachricht_bytes,
            anruf_nicht_verfuegbar_melden: self.signaling.anruf_nicht_verfuegbar_melden,
        })
    }

    /// Token-Gueltigkeit als Dauer
    pub fn token_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.auth.token_ttl_sek)
    }

    /// Gibt die Bind-Adresse fuer REST und WebSocket zurueck
    pub fn http_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.http_port)
    }

    /// Gibt die Bind-Adresse fuer den Observability-Server zurueck
    pub fn observability_bind_adresse(&self) -> String {
        format!(
            "{}:{}",
            self.netzwerk.bind_adresse, self.netzwerk.observability_port
        )
    }
}
