//! Session codec.
//!
//! Encrypts JSON values for storage in a medium with no confidentiality of
//! its own (the browser's `localStorage`, or the CLI's storage file).
//!
//! # Scheme
//!
//! - Key: Argon2id over the configured secret and a fixed application salt,
//!   256-bit output, derived once per codec.
//! - Cipher: AES-256-GCM with a random 96-bit nonce per call.
//! - Encoding: standard base64 of `nonce || ciphertext`.
//!
//! # Security
//!
//! The secret ships with the client, so anyone holding the client can
//! reverse the blob. This is obfuscation of a convenience cache, not
//! confidentiality against a determined client-side attacker.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use argon2::{Algorithm, Argon2, Params, Version};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

/// Fixed application salt for key derivation.
const KDF_SALT: &[u8] = b"vtu-dashboard/session-codec/v1";
/// Argon2 iteration count.
const KDF_ITERATIONS: u32 = 3;
/// Argon2 memory cost in KiB.
const KDF_MEMORY_KIB: u32 = 19 * 1024;
/// Argon2 parallelism.
const KDF_LANES: u32 = 1;
/// Derived key length in bytes (AES-256).
const KEY_LENGTH: usize = 32;
/// AES-GCM nonce length in bytes.
const NONCE_LENGTH: usize = 12;

/// Errors that can occur while encoding or decoding a session blob.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The key derivation function rejected its inputs.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// The value could not be serialized, or the plaintext could not be
    /// deserialized into the requested type.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The cipher failed to encrypt.
    #[error("encryption failed")]
    Encrypt,

    /// The input was empty.
    #[error("ciphertext is empty")]
    Empty,

    /// The input is not valid base64.
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The input is too short to contain a nonce and tag.
    #[error("ciphertext is truncated")]
    Truncated,

    /// Authentication failed (wrong key or tampered ciphertext).
    #[error("decryption failed")]
    Decrypt,

    /// The plaintext is not valid UTF-8.
    #[error("plaintext is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Symmetric codec for session blobs.
///
/// Cheap to clone; the derived key is held by the cipher instance.
#[derive(Clone)]
pub struct SessionCodec {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec")
            .field("cipher", &"[REDACTED]")
            .finish()
    }
}

impl SessionCodec {
    /// Derive the codec key from a secret.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::KeyDerivation` if Argon2 rejects the parameters
    /// or the secret.
    pub fn new(secret: &SecretString) -> Result<Self, CodecError> {
        let params = Params::new(KDF_MEMORY_KIB, KDF_ITERATIONS, KDF_LANES, Some(KEY_LENGTH))
            .map_err(|e| CodecError::KeyDerivation(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut key = [0u8; KEY_LENGTH];
        argon2
            .hash_password_into(secret.expose_secret().as_bytes(), KDF_SALT, &mut key)
            .map_err(|e| CodecError::KeyDerivation(e.to_string()))?;

        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| CodecError::KeyDerivation(e.to_string()))?;

        Ok(Self { cipher })
    }

    /// Encrypt a JSON value, returning `None` on any failure.
    ///
    /// String values are encrypted as their raw text; everything else is
    /// serialized to JSON first.
    #[must_use]
    pub fn encode(&self, value: &Value) -> Option<String> {
        self.try_encode(value)
            .inspect_err(|e| tracing::debug!(error = %e, "session encode failed"))
            .ok()
    }

    /// Decrypt a blob produced by [`encode`](Self::encode), returning `None`
    /// for empty, corrupt, truncated or foreign input.
    ///
    /// If the plaintext parses as JSON the parsed value is returned,
    /// otherwise the raw text as a JSON string. A string that was itself
    /// valid JSON (e.g. `"42"`) therefore decodes to the parsed value.
    #[must_use]
    pub fn decode(&self, blob: &str) -> Option<Value> {
        self.try_decode(blob)
            .inspect_err(|e| tracing::debug!(error = %e, "session decode failed"))
            .ok()
    }

    /// Encrypt any serializable value.
    #[must_use]
    pub fn encode_as<T: Serialize>(&self, value: &T) -> Option<String> {
        serde_json::to_value(value)
            .inspect_err(|e| tracing::debug!(error = %e, "session encode failed"))
            .ok()
            .and_then(|value| self.encode(&value))
    }

    /// Decrypt a blob into a typed value, returning `None` if decryption or
    /// deserialization fails.
    #[must_use]
    pub fn decode_as<T: DeserializeOwned>(&self, blob: &str) -> Option<T> {
        self.decode(blob).and_then(|value| {
            serde_json::from_value(value)
                .inspect_err(|e| tracing::debug!(error = %e, "decoded session has wrong shape"))
                .ok()
        })
    }

    /// Encrypt a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or encryption fails.
    pub fn try_encode(&self, value: &Value) -> Result<String, CodecError> {
        let plaintext = match value {
            Value::String(text) => text.clone(),
            other => serde_json::to_string(other)?,
        };

        let mut nonce = [0u8; NONCE_LENGTH];
        rand::rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| CodecError::Encrypt)?;

        let mut blob = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(blob))
    }

    /// Decrypt a blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob is empty, not base64, truncated, fails
    /// authentication, or decrypts to invalid UTF-8.
    pub fn try_decode(&self, blob: &str) -> Result<Value, CodecError> {
        let blob = blob.trim();
        if blob.is_empty() {
            return Err(CodecError::Empty);
        }

        let bytes = STANDARD.decode(blob)?;
        if bytes.len() <= NONCE_LENGTH {
            return Err(CodecError::Truncated);
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LENGTH);

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CodecError::Decrypt)?;
        let text = String::from_utf8(plaintext)?;

        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}
