use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString
    },
    Argon2
};

use crate::error::AppError;

// Hashear contraseña
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Hash(e.to_string()))
}

// Verificar contraseña; un hash corrupto cuenta como contraseña incorrecta
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(password_hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_y_verificacion() {
        let hash = hash_password("Secreto#2024").unwrap();
        assert_ne!(hash, "Secreto#2024");
        assert!(verify_password("Secreto#2024", &hash));
        assert!(!verify_password("otra", &hash));
    }

    #[test]
    fn hash_corrupto_no_verifica() {
        assert!(!verify_password("x", "no-es-un-hash"));
    }
}
