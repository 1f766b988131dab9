//! Payload encryption.
//!
//! Implements AES-256-CBC with PKCS#7 padding for response bodies that carry
//! sensitive data.
//!
//! # Envelope Format
//!
//! ```text
//! base64( IV (16 bytes) || ciphertext )
//! ```
//!
//! A fresh random IV is drawn for every call, so encrypting the same value
//! twice never yields the same envelope.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use serde::Serialize;

use crate::observability::metrics;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// The length of the encryption key in bytes (256 bits).
pub const KEY_LENGTH: usize = 32;

/// The length of the IV in bytes.
pub const IV_LENGTH: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("invalid encryption key: {0}")]
    InvalidKey(String),

    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("envelope is not valid base64")]
    Encoding,

    #[error("envelope too short: {0} bytes")]
    Truncated(usize),

    #[error("decryption failed")]
    Decrypt,

    #[error("plaintext is not valid UTF-8")]
    Utf8,
}

/// Symmetric cipher for response payloads.
#[derive(Clone)]
pub struct PayloadCipher {
    key: [u8; KEY_LENGTH],
}

impl PayloadCipher {
    pub fn new(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Build a cipher from a Base64-encoded 32-byte key.
    pub fn from_base64(key_base64: &str) -> Result<Self, CipherError> {
        let bytes = STANDARD
            .decode(key_base64.trim())
            .map_err(|e| CipherError::InvalidKey(format!("invalid base64: {}", e)))?;

        let key: [u8; KEY_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
            CipherError::InvalidKey(format!("expected {} bytes, got {}", KEY_LENGTH, bytes.len()))
        })?;
        Ok(Self::new(key))
    }

    /// Generate a random key, Base64-encoded.
    pub fn generate_key() -> String {
        let mut key = [0u8; KEY_LENGTH];
        rand::thread_rng().fill_bytes(&mut key);
        STANDARD.encode(key)
    }

    /// Serialize `value` to JSON and encrypt it.
    ///
    /// Returns `None` on failure after logging it; callers decide what to
    /// answer.
    pub fn encrypt<T: Serialize + ?Sized>(&self, value: &T) -> Option<String> {
        match self.try_encrypt(value) {
            Ok(envelope) => Some(envelope),
            Err(e) => {
                tracing::error!(error = %e, "Payload encryption failed");
                metrics::record_cipher_failure("encrypt");
                None
            }
        }
    }

    /// Decrypt an envelope back to its JSON text with every `"` removed.
    ///
    /// The quote stripping is kept for compatibility with existing clients.
    /// The result is not guaranteed to be valid JSON.
    pub fn decrypt(&self, envelope: &str) -> Option<String> {
        match self.try_decrypt(envelope) {
            Ok(text) => Some(text.replace('"', "")),
            Err(e) => {
                tracing::error!(error = %e, "Payload decryption failed");
                metrics::record_cipher_failure("decrypt");
                None
            }
        }
    }

    pub fn try_encrypt<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CipherError> {
        let plaintext = serde_json::to_string(value)?;
        self.encrypt_bytes(plaintext.as_bytes())
    }

    /// Decrypt an envelope to the exact serialized text.
    pub fn try_decrypt(&self, envelope: &str) -> Result<String, CipherError> {
        let plaintext = self.decrypt_bytes(envelope)?;
        String::from_utf8(plaintext).map_err(|_| CipherError::Utf8)
    }

    fn encrypt_bytes(&self, plaintext: &[u8]) -> Result<String, CipherError> {
        let mut iv = [0u8; IV_LENGTH];
        rand::thread_rng().fill_bytes(&mut iv);

        let cipher = Aes256CbcEnc::new_from_slices(&self.key, &iv)
            .map_err(|e| CipherError::InvalidKey(e.to_string()))?;
        let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        let mut combined = Vec::with_capacity(IV_LENGTH + ciphertext.len());
        combined.extend_from_slice(&iv);
        combined.extend_from_slice(&ciphertext);

        Ok(STANDARD.encode(combined))
    }

    fn decrypt_bytes(&self, envelope: &str) -> Result<Vec<u8>, CipherError> {
        let combined = STANDARD
            .decode(envelope.trim())
            .map_err(|_| CipherError::Encoding)?;

        if combined.len() <= IV_LENGTH {
            return Err(CipherError::Truncated(combined.len()));
        }
        let (iv, ciphertext) = combined.split_at(IV_LENGTH);

        let cipher = Aes256CbcDec::new_from_slices(&self.key, iv)
            .map_err(|e| CipherError::InvalidKey(e.to_string()))?;
        cipher
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CipherError::Decrypt)
    }
}

impl std::fmt::Debug for PayloadCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadCipher").finish_non_exhaustive()
    }
}
