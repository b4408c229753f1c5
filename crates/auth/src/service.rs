//! Auth-Service fuer advocall
//!
//! Zentraler Service fuer Registrierung, Login, Token-Validierung und Logout.
//! Das Verzeichnis wird ueber den `ParticipantRepository`-Trait angesprochen.

use std::sync::Arc;

use advocall_core::{Participant, ParticipantId, ParticipantRepository, Role};

use crate::{
    error::{AuthError, AuthResult},
    password::{passwort_hashen, passwort_verifizieren},
    token::{TokenEintrag, TokenStore},
};

/// Standard-Mindestlaenge fuer Passwoerter
pub const STANDARD_MIN_PASSWORT_LAENGE: usize = 1;

/// Auth-Service – Einstiegspunkt fuer alle Authentifizierungsvorgaenge
pub struct AuthService<R: ParticipantRepository> {
    repo: Arc<R>,
    tokens: Arc<TokenStore>,
    min_passwort_laenge: usize,
}

impl<R: ParticipantRepository> Clone for AuthService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            tokens: Arc::clone(&self.tokens),
            min_passwort_laenge: self.min_passwort_laenge,
        }
    }
}

impl<R: ParticipantRepository> AuthService<R> {
    /// Erstellt einen neuen AuthService
    pub fn neu(repo: Arc<R>, tokens: Arc<TokenStore>) -> Self {
        Self {
            repo,
            tokens,
            min_passwort_laenge: STANDARD_MIN_PASSWORT_LAENGE,
        }
    }

    /// Setzt die minimale Passwortlaenge fuer Registrierungen
    pub fn mit_min_passwort_laenge(mut self, laenge: usize) -> Self {
        self.min_passwort_laenge = laenge.max(1);
        self
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Registriert einen neuen Teilnehmer
    ///
    /// Leere Identitaet oder zu kurzes Passwort ergeben `UngueltigeEingabe`,
    /// eine bereits vergebene Identitaet `IdentitaetVergeben`.
    pub async fn registrieren(
        &self,
        identity: &str,
        passwort: &str,
        role: Role,
    ) -> AuthResult<Participant> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(AuthError::UngueltigeEingabe("Identitaet fehlt".into()));
        }
        if passwort.chars().count() < self.min_passwort_laenge {
            return Err(AuthError::UngueltigeEingabe(format!(
                "Passwort muss mindestens {} Zeichen lang sein",
                self.min_passwort_laenge
            )));
        }

        // Vorab pruefen, damit kein Hash fuer einen Duplikat-Versuch berechnet wird
        if self.repo.nach_identitaet(identity).is_some() {
            return Err(AuthError::IdentitaetVergeben(identity.to_string()));
        }

        let hash = passwort_hashen(passwort)?;
        let teilnehmer = self.repo.registrieren(identity, &hash, role)?;

        tracing::info!(
            participant_id = %teilnehmer.id,
            identity = %teilnehmer.identity,
            role = %teilnehmer.role,
            "Neuer Teilnehmer registriert"
        );

        Ok(teilnehmer)
    }

    /// Meldet einen Teilnehmer an und gibt ein neues Token aus
    pub async fn anmelden(
        &self,
        identity: &str,
        passwort: &str,
    ) -> AuthResult<(Participant, TokenEintrag)> {
        let teilnehmer = self
            .repo
            .nach_identitaet(identity.trim())
            .ok_or(AuthError::UngueltigeAnmeldedaten)?;

        if !passwort_verifizieren(passwort, &teilnehmer.credential_hash)? {
            tracing::warn!(identity = %identity, "Fehlgeschlagener Login-Versuch");
            return Err(AuthError::UngueltigeAnmeldedaten);
        }

        let token = self.tokens.erstellen(teilnehmer.id).await;

        tracing::info!(
            participant_id = %teilnehmer.id,
            identity = %teilnehmer.identity,
            "Teilnehmer angemeldet"
        );

        Ok((teilnehmer, token))
    }

    /// Validiert ein Token und gibt den zugehoerigen Teilnehmer zurueck
    ///
    /// Ist der Teilnehmer nicht mehr im Verzeichnis, wird das Token verworfen.
    pub async fn token_validieren(&self, token: &str) -> AuthResult<Participant> {
        let eintrag = self.tokens.validieren(token).await?;

        match self.repo.finden(eintrag.participant_id) {
            Some(teilnehmer) => Ok(teilnehmer),
            None => {
                self.tokens.invalidieren(token).await;
                Err(AuthError::TeilnehmerNichtGefunden(
                    eintrag.participant_id.to_string(),
                ))
            }
        }
    }

    /// Meldet ab und invalidiert das Token
    pub async fn abmelden(&self, token: &str) -> AuthResult<()> {
        if !self.tokens.invalidieren(token).await {
            return Err(AuthError::TokenUngueltig);
        }
        tracing::debug!("Token invalidiert (Abmeldung)");
        Ok(())
    }

    /// Verwirft alle Tokens eines aus dem Verzeichnis entfernten Teilnehmers
    pub async fn teilnehmer_entfernt(&self, participant_id: ParticipantId) -> usize {
        let anzahl = self.tokens.alle_invalidieren(participant_id).await;
        tracing::info!(
            participant_id = %participant_id,
            invalidierte_tokens = anzahl,
            "Tokens eines entfernten Teilnehmers invalidiert"
        );
        anzahl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advocall_core::CoreError;
    use std::sync::Mutex;

    // Minimales In-Memory Verzeichnis fuer Tests
    #[derive(Default)]
    struct TestRepo {
        teilnehmer: Mutex<Vec<Participant>>,
    }

    impl TestRepo {
        fn entfernen(&self, id: ParticipantId) {
            self.teilnehmer.lock().unwrap().retain(|p| p.id != id);
        }
    }

    impl ParticipantRepository for TestRepo {
        fn registrieren(
            &self,
            identity: &str,
            credential_hash: &str,
            role: Role,
        ) -> advocall_core::Result<Participant> {
            let mut liste = self.teilnehmer.lock().unwrap();
            if liste.iter().any(|p| p.identity == identity) {
                return Err(CoreError::IdentitaetVergeben(identity.to_string()));
            }
            let p = Participant::neu(identity, credential_hash, role);
            liste.push(p.clone());
            Ok(p)
        }

        fn finden(&self, id: ParticipantId) -> Option<Participant> {
            self.teilnehmer.lock().unwrap().iter().find(|p| p.id == id).cloned()
        }

        fn nach_identitaet(&self, identity: &str) -> Option<Participant> {
            self.teilnehmer
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.identity == identity)
                .cloned()
        }
    }

    fn test_service() -> (AuthService<TestRepo>, Arc<TestRepo>) {
        let repo = Arc::new(TestRepo::default());
        (AuthService::neu(Arc::clone(&repo), TokenStore::neu()), repo)
    }

    #[tokio::test]
    async fn registrieren_und_anmelden() {
        let (service, _) = test_service();

        let p = service
            .registrieren("kanzlei@example.com", "sicheres_passwort!", Role::Lawyer)
            .await
            .expect("Registrierung fehlgeschlagen");
        assert_eq!(p.role, Role::Lawyer);
        assert!(p.credential_hash.starts_with("$argon2id$"));

        let (angemeldet, token) = service
            .anmelden("kanzlei@example.com", "sicheres_passwort!")
            .await
            .expect("Anmeldung fehlgeschlagen");
        assert_eq!(angemeldet.id, p.id);
        assert!(!token.token.is_empty());
    }

    #[tokio::test]
    async fn doppelte_registrierung_schlaegt_fehl() {
        let (service, _) = test_service();
        service
            .registrieren("duplikat", "passwort", Role::Client)
            .await
            .unwrap();
        let ergebnis = service.registrieren("duplikat", "anderes", Role::Lawyer).await;
        assert!(matches!(ergebnis, Err(AuthError::IdentitaetVergeben(_))));
    }

    #[tokio::test]
    async fn leere_eingaben_abgelehnt() {
        let (service, _) = test_service();
        let ergebnis = service.registrieren("  ", "passwort", Role::Client).await;
        assert!(matches!(ergebnis, Err(AuthError::UngueltigeEingabe(_))));

        let ergebnis = service.registrieren("mandant", "", Role::Client).await;
        assert!(matches!(ergebnis, Err(AuthError::UngueltigeEingabe(_))));
    }

    #[tokio::test]
    async fn min_passwort_laenge_wird_geprueft() {
        let (service, _) = test_service();
        let service = service.mit_min_passwort_laenge(8);
        let ergebnis = service.registrieren("mandant", "kurz", Role::Client).await;
        assert!(matches!(ergebnis, Err(AuthError::UngueltigeEingabe(_))));
    }

    #[tokio::test]
    async fn falsches_passwort_abgelehnt() {
        let (service, _) = test_service();
        service.registrieren("user", "richtig", Role::Client).await.unwrap();
        let ergebnis = service.anmelden("user", "falsch").await;
        assert!(matches!(ergebnis, Err(AuthError::UngueltigeAnmeldedaten)));

        let ergebnis = service.anmelden("unbekannt", "richtig").await;
        assert!(matches!(ergebnis, Err(AuthError::UngueltigeAnmeldedaten)));
    }

    #[tokio::test]
    async fn token_validierung() {
        let (service, _) = test_service();
        service
            .registrieren("mandant@example.com", "passwort", Role::Client)
            .await
            .unwrap();
        let (_, token) = service.anmelden("mandant@example.com", "passwort").await.unwrap();

        let p = service.token_validieren(&token.token).await.unwrap();
        assert_eq!(p.identity, "mandant@example.com");

        let ergebnis = service.token_validieren("fake-jwt-token").await;
        assert!(matches!(ergebnis, Err(AuthError::TokenUngueltig)));
    }

    #[tokio::test]
    async fn abmelden_invalidiert_token() {
        let (service, _) = test_service();
        service.registrieren("logout", "passwort", Role::Client).await.unwrap();
        let (_, token) = service.anmelden("logout", "passwort").await.unwrap();

        service.abmelden(&token.token).await.unwrap();
        let ergebnis = service.token_validieren(&token.token).await;
        assert!(matches!(ergebnis, Err(AuthError::TokenUngueltig)));
        assert!(service.abmelden(&token.token).await.is_err());
    }

    #[tokio::test]
    async fn token_eines_entfernten_teilnehmers_ist_wertlos() {
        let (service, repo) = test_service();
        let p = service.registrieren("weg", "passwort", Role::Lawyer).await.unwrap();
        let (_, token) = service.anmelden("weg", "passwort").await.unwrap();

        repo.entfernen(p.id);
        let ergebnis = service.token_validieren(&token.token).await;
        assert!(matches!(ergebnis, Err(AuthError::TeilnehmerNichtGefunden(_))));
        // Token wurde dabei verworfen
        assert_eq!(service.tokens().anzahl_aktive().await, 0);
    }

    #[tokio::test]
    async fn teilnehmer_entfernt_invalidiert_alle_tokens() {
        let (service, _) = test_service();
        let p = service.registrieren("multi", "passwort", Role::Client).await.unwrap();
        service.anmelden("multi", "passwort").await.unwrap();
        service.anmelden("multi", "passwort").await.unwrap();

        assert_eq!(service.teilnehmer_entfernt(p.id).await, 2);
    }
}
