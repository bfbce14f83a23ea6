// Shared upload password, kept only as an argon2 hash.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| format!("Failed to hash password: {e}"))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, String> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| format!("Invalid password hash: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Gate in front of the photo upload flow.
#[derive(Debug, Clone, Default)]
pub struct UploadGate {
    hash: Option<String>,
}

impl UploadGate {
    /// Hash `password` once. An empty or missing password disables uploads.
    pub fn new(password: Option<&str>) -> Self {
        let hash = match password.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => match hash_password(p) {
                Ok(h) => Some(h),
                Err(e) => {
                    tracing::error!("{e}; uploads disabled");
                    None
                }
            },
            None => None,
        };
        Self { hash }
    }

    pub fn disabled() -> Self {
        Self { hash: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.hash.is_some()
    }

    /// Whether `attempt` is the upload password. Always false when disabled.
    pub fn check(&self, attempt: &str) -> bool {
        let Some(hash) = &self.hash else {
            return false;
        };
        match verify_password(attempt, hash) {
            Ok(ok) => ok,
            Err(e) => {
                tracing::error!("{e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(verify_password("x", "not-a-hash").is_err());
    }

    #[test]
    fn test_gate_accepts_only_password() {
        let gate = UploadGate::new(Some("secret"));
        assert!(gate.is_enabled());
        assert!(gate.check("secret"));
        assert!(!gate.check("Secret"));
        assert!(!gate.check(""));
    }

    #[test]
    fn test_gate_without_password_rejects_everything() {
        for gate in [UploadGate::new(None), UploadGate::new(Some("  ")), UploadGate::disabled()] {
            assert!(!gate.is_enabled());
            assert!(!gate.check(""));
            assert!(!gate.check("anything"));
        }
    }
}
