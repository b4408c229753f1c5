//! advocall-auth – Authentifizierungs-Orakel fuer den Koordinator
//!
//! Dieses Crate implementiert:
//! - Passwort-Hashing mit Argon2id
//! - Token-Verwaltung (in-memory mit TTL)
//! - AuthService (Registrierung, Login, Token-Validierung, Logout)
//!
//! Der Koordinator sieht nur das Ergebnis: eine verifizierte Teilnehmer-Identitaet.

pub mod error;
pub mod password;
pub mod service;
pub mod token;

// Bequeme Re-Exporte
pub use error::{AuthError, AuthResult};
pub use password::{passwort_hashen, passwort_verifizieren};
pub use service::AuthService;
pub use token::{TokenEintrag, TokenStore};
