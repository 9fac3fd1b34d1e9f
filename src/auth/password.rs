use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hashes with a fresh random salt; the PHC string carries salt and params.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    Ok(argon2.hash_password(password.as_bytes(), &salt)?.to_string())
}

pub fn verify_password(password: &str, hashed: &str) -> Result<(), argon2::password_hash::Error> {
    let argon2 = Argon2::default();
    let parsed = PasswordHash::new(hashed)?;

    argon2.verify_password(password.as_bytes(), &parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hashed = hash_password("s3cret").unwrap();
        assert_ne!(hashed, "s3cret");
        assert!(hashed.starts_with("$argon2"));
        assert!(verify_password("s3cret", &hashed).is_ok());
        assert!(verify_password("wrong", &hashed).is_err());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        assert_ne!(hash_password("s3cret").unwrap(), hash_password("s3cret").unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error_not_a_panic() {
        assert!(verify_password("s3cret", "not-a-phc-string").is_err());
    }
}
