//! Credential vault for provider tokens at rest.
//!
//! Ciphertext layout is `base64(nonce || aes-256-gcm(plaintext))`. The key is
//! derived with Argon2 from the operator secret and a salt that is itself a
//! function of that secret, so the same secret always yields the same key.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::Argon2;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

const NONCE_SIZE: usize = 12;
const SALT_CONTEXT: &[u8] = b"interview-hub/token-vault/v1";

#[derive(Clone)]
pub struct TokenVault {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for TokenVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVault").finish_non_exhaustive()
    }
}

impl TokenVault {
    pub fn new(secret: &str) -> Result<Self> {
        if secret.is_empty() {
            return Err(Error::Config("token encryption key must not be empty".into()));
        }

        let mut hasher = Sha256::new();
        hasher.update(SALT_CONTEXT);
        hasher.update(secret.as_bytes());
        let salt = hasher.finalize();

        let mut key = [0u8; 32];
        Argon2::default()
            .hash_password_into(secret.as_bytes(), &salt[..16], &mut key)
            .map_err(|e| Error::Config(format!("token key derivation failed: {}", e)))?;

        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| Error::Config(format!("invalid token key: {}", e)))?;
        Ok(Self { cipher })
    }

    /// Absent input stays absent.
    pub fn encrypt(&self, plaintext: Option<&str>) -> Result<Option<String>> {
        plaintext.map(|value| self.seal(value)).transpose()
    }

    /// Absent input stays absent.
    pub fn decrypt(&self, ciphertext: Option<&str>) -> Result<Option<String>> {
        ciphertext.map(|value| self.open(value)).transpose()
    }

    pub fn seal(&self, plaintext: &str) -> Result<String> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);

        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|_| Error::Internal("token encryption failed".into()))?;

        let mut out = Vec::with_capacity(NONCE_SIZE + sealed.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&sealed);
        Ok(BASE64.encode(out))
    }

    pub fn open(&self, ciphertext: &str) -> Result<String> {
        let raw = BASE64
            .decode(ciphertext.trim())
            .map_err(|e| Error::Decryption(format!("ciphertext is not base64: {}", e)))?;
        if raw.len() <= NONCE_SIZE {
            return Err(Error::Decryption("ciphertext too short".into()));
        }

        let (nonce, sealed) = raw.split_at(NONCE_SIZE);
        let plain = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| Error::Decryption("wrong key or corrupted ciphertext".into()))?;

        String::from_utf8(plain).map_err(|e| Error::Decryption(e.to_string()))
    }
}
