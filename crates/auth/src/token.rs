//! Token-Verwaltung fuer advocall
//!
//! Opake Zugangs-Tokens, ausgegeben bei `/api/login` und vorgelegt beim
//! `authenticate`-Ereignis eines WebSocket-Kanals. Tokens werden im Speicher
//! gehalten (HashMap mit TTL); ein Hintergrund-Task bereinigt abgelaufene.

use std::{collections::HashMap, sync::Arc, time::Duration};

use advocall_core::ParticipantId;
use base64::Engine;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::{AuthError, AuthResult};

/// Standard-Lebensdauer eines Tokens: 1 Stunde
pub const STANDARD_TTL: Duration = Duration::from_secs(60 * 60);

/// Intervall fuer den automatischen Cleanup-Task: 5 Minuten
const CLEANUP_INTERVALL: Duration = Duration::from_secs(5 * 60);

/// Ein ausgegebenes Zugangs-Token
#[derive(Debug, Clone)]
pub struct TokenEintrag {
    /// Der Token-String (URL-sicheres Base64)
    pub token: String,
    pub participant_id: ParticipantId,
    pub erstellt_am: DateTime<Utc>,
    pub laeuft_ab_am: DateTime<Utc>,
}

impl TokenEintrag {
    pub fn ist_gueltig(&self) -> bool {
        Utc::now() < self.laeuft_ab_am
    }
}

/// In-Memory Token-Store mit TTL
#[derive(Debug)]
pub struct TokenStore {
    /// token -> Eintrag
    tokens: RwLock<HashMap<String, TokenEintrag>>,
    ttl: chrono::Duration,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::mit_ttl(STANDARD_TTL)
    }
}

impl TokenStore {
    /// Erstellt einen neuen leeren Token-Store mit Standard-TTL
    pub fn neu() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Erstellt einen Token-Store mit eigener Lebensdauer
    pub fn mit_ttl(ttl: Duration) -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::hours(1)),
        }
    }

    /// Startet den Cleanup-Task fuer einen geteilten Store
    pub fn cleanup_starten(store: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let store_klon = Arc::clone(store);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(CLEANUP_INTERVALL).await;
                let entfernt = store_klon.cleanup_abgelaufene().await;
                if entfernt > 0 {
                    tracing::debug!(anzahl = entfernt, "Abgelaufene Tokens bereinigt");
                }
            }
        })
    }

    /// Gibt ein neues Token fuer den Teilnehmer aus
    pub async fn erstellen(&self, participant_id: ParticipantId) -> TokenEintrag {
        let jetzt = Utc::now();
        let eintrag = TokenEintrag {
            token: token_generieren(),
            participant_id,
            erstellt_am: jetzt,
            laeuft_ab_am: jetzt + self.ttl,
        };

        self.tokens
            .write()
            .await
            .insert(eintrag.token.clone(), eintrag.clone());
        tracing::debug!(participant_id = %participant_id, "Neues Token ausgegeben");
        eintrag
    }

    /// Validiert ein Token
    ///
    /// `TokenUngueltig` wenn unbekannt, `TokenAbgelaufen` wenn die TTL ueberschritten ist.
    pub async fn validieren(&self, token: &str) -> AuthResult<TokenEintrag> {
        let tokens = self.tokens.read().await;
        match tokens.get(token) {
            None => Err(AuthError::TokenUngueltig),
            Some(eintrag) if !eintrag.ist_gueltig() => Err(AuthError::TokenAbgelaufen),
            Some(eintrag) => Ok(eintrag.clone()),
        }
    }

    /// Invalidiert ein einzelnes Token
    pub async fn invalidieren(&self, token: &str) -> bool {
        self.tokens.write().await.remove(token).is_some()
    }

    /// Invalidiert alle Tokens eines Teilnehmers (z.B. bei Entfernung)
    pub async fn alle_invalidieren(&self, participant_id: ParticipantId) -> usize {
        let mut tokens = self.tokens.write().await;
        let vorher = tokens.len();
        tokens.retain(|_, e| e.participant_id != participant_id);
        vorher - tokens.len()
    }

    /// Bereinigt abgelaufene Tokens und gibt deren Anzahl zurueck
    pub async fn cleanup_abgelaufene(&self) -> usize {
        let jetzt = Utc::now();
        let mut tokens = self.tokens.write().await;
        let vorher = tokens.len();
        tokens.retain(|_, e| e.laeuft_ab_am > jetzt);
        vorher - tokens.len()
    }

    /// Anzahl der nicht abgelaufenen Tokens
    pub async fn anzahl_aktive(&self) -> usize {
        let jetzt = Utc::now();
        let tokens = self.tokens.read().await;
        tokens.values().filter(|e| e.laeuft_ab_am > jetzt).count()
    }
}

/// Generiert ein kryptografisch sicheres Token (32 Bytes, URL-sicheres Base64)
fn token_generieren() -> String {
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_erstellen_und_validieren() {
        let store = TokenStore::neu();
        let pid = ParticipantId::new();

        let eintrag = store.erstellen(pid).await;
        assert!(eintrag.ist_gueltig());
        assert_eq!(eintrag.token.len(), 43, "32 Bytes ohne Padding");

        let validiert = store.validieren(&eintrag.token).await.unwrap();
        assert_eq!(validiert.participant_id, pid);
    }

    #[tokio::test]
    async fn unbekanntes_token_ist_ungueltig() {
        let store = TokenStore::neu();
        let ergebnis = store.validieren("fake-jwt-token").await;
        assert!(matches!(ergebnis, Err(AuthError::TokenUngueltig)));
    }

    #[tokio::test]
    async fn abgelaufenes_token_wird_erkannt() {
        let store = TokenStore::mit_ttl(Duration::ZERO);
        let eintrag = store.erstellen(ParticipantId::new()).await;

        let ergebnis = store.validieren(&eintrag.token).await;
        assert!(matches!(ergebnis, Err(AuthError::TokenAbgelaufen)));
        assert_eq!(store.cleanup_abgelaufene().await, 1);
        assert_eq!(store.anzahl_aktive().await, 0);
    }

    #[tokio::test]
    async fn token_invalidieren() {
        let store = TokenStore::neu();
        let eintrag = store.erstellen(ParticipantId::new()).await;

        assert!(store.invalidieren(&eintrag.token).await);
        assert!(!store.invalidieren(&eintrag.token).await);
        assert!(matches!(
            store.validieren(&eintrag.token).await,
            Err(AuthError::TokenUngueltig)
        ));
    }

    #[tokio::test]
    async fn alle_tokens_eines_teilnehmers_invalidieren() {
        let store = TokenStore::neu();
        let pid = ParticipantId::new();

        store.erstellen(pid).await;
        store.erstellen(pid).await;
        store.erstellen(ParticipantId::new()).await;

        assert_eq!(store.alle_invalidieren(pid).await, 2);
        assert_eq!(store.anzahl_aktive().await, 1);
    }

    #[tokio::test]
    async fn tokens_sind_eindeutig() {
        let store = TokenStore::neu();
        let pid = ParticipantId::new();

        let t1 = store.erstellen(pid).await;
        let t2 = store.erstellen(pid).await;
        assert_ne!(t1.token, t2.token);
    }
}
