//! Credential-Hashing mit Argon2id
//!
//! Das Verzeichnis speichert ausschliesslich PHC-Strings; Klartext-Passwoerter
//! verlassen den Auth-Service nie.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::AuthError;

/// Argon2id-Parameter (OWASP-Mindestkonfiguration)
///
/// - Speicher: 19 MiB
/// - Iterationen: 2
/// - Parallelismus: 1
fn argon2_instanz() -> Result<Argon2<'static>, AuthError> {
    let params = Params::new(19 * 1024, 2, 1, None)
        .map_err(|e| AuthError::PasswortHashing(format!("Argon2-Parameter ungueltig: {e}")))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hasht ein Passwort mit Argon2id und einem zufaelligen Salt
///
/// Gibt den PHC-String zurueck (inkl. Algorithmus, Parameter und Salt).
pub fn passwort_hashen(passwort: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    argon2_instanz()?
        .hash_password(passwort.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswortHashing(e.to_string()))
}

/// Verifiziert ein Passwort gegen einen gespeicherten PHC-Hash
pub fn passwort_verifizieren(passwort: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AuthError::PasswortHashing(format!("Ungueltiges Hash-Format: {e}")))?;

    match argon2_instanz()?.verify_password(passwort.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::PasswortHashing(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passwort_hashen_und_verifizieren() {
        let hash = passwort_hashen("mandat-2024!").expect("Hashing fehlgeschlagen");

        assert!(
            hash.starts_with("$argon2id$"),
            "Hash muss mit $argon2id$ beginnen"
        );
        assert!(passwort_verifizieren("mandat-2024!", &hash).unwrap());
    }

    #[test]
    fn falsches_passwort_wird_abgelehnt() {
        let hash = passwort_hashen("richtig").unwrap();
        assert!(!passwort_verifizieren("falsch", &hash).unwrap());
    }

    #[test]
    fn gleiche_passwoerter_unterschiedliche_hashes() {
        let hash1 = passwort_hashen("gleich").unwrap();
        let hash2 = passwort_hashen("gleich").unwrap();
        assert_ne!(hash1, hash2, "Salt muss unterschiedliche Hashes erzeugen");
    }

    #[test]
    fn ungueltiges_hash_format_gibt_fehler() {
        // z.B. importierte bcrypt-Hashes aus Altbestaenden
        let ergebnis = passwort_verifizieren("passwort", "$2b$10$example.hash");
        assert!(matches!(ergebnis, Err(AuthError::PasswortHashing(_))));
    }
}
