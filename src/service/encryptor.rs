use crate::error::EncryptionError;
use base64::{Engine, engine::general_purpose::STANDARD};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::debug;

const KEY_LEN: usize = 32;

/// Encrypts one secret value into its stored string form.
///
/// Implementations must return output that `is_already_encoded` accepts,
/// otherwise a second migration run would encrypt the value again.
pub trait Encryptor: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError>;
}

/// ChaCha20-Poly1305 encryptor. Output is `base64(nonce || ciphertext || tag)`.
pub struct ChaChaEncryptor {
    key: Key,
}

impl ChaChaEncryptor {
    pub fn from_key_bytes(key_bytes: &[u8]) -> Result<Self, EncryptionError> {
        if key_bytes.len() != KEY_LEN {
            return Err(EncryptionError::InvalidKey(format!(
                "expected {KEY_LEN} bytes, got {}",
                key_bytes.len()
            )));
        }
        let mut key = Key::default();
        key.copy_from_slice(key_bytes);
        Ok(Self { key })
    }

    /// Build from a standard base64 encoded 32-byte key.
    pub fn from_base64_key(encoded: &str) -> Result<Self, EncryptionError> {
        let trimmed = encoded.trim();
        if trimmed.is_empty() {
            return Err(EncryptionError::InvalidKey(
                "no encryption key configured".to_string(),
            ));
        }
        let decoded = STANDARD
            .decode(trimmed.as_bytes())
            .map_err(|e| EncryptionError::InvalidKey(format!("base64 decoding failed: {e}")))?;
        Self::from_key_bytes(&decoded)
    }

    fn seal<R: RngCore>(&self, rng: &mut R, plaintext: &str) -> Result<String, EncryptionError> {
        let mut nonce = Nonce::default();
        rng.try_fill_bytes(&mut nonce)
            .map_err(|e| EncryptionError::Unavailable(format!("nonce source failed: {e}")))?;

        let cipher = ChaCha20Poly1305::new(&self.key);
        let sealed = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| EncryptionError::Rejected(e.to_string()))?;

        let mut envelope = Vec::with_capacity(nonce.len() + sealed.len());
        envelope.extend_from_slice(&nonce);
        envelope.extend_from_slice(&sealed);
        let encoded = STANDARD.encode(envelope);
        debug!(input_len = plaintext.len(), output_len = encoded.len(), "value encrypted");
        Ok(encoded)
    }
}

impl Encryptor for ChaChaEncryptor {
    fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        self.seal(&mut OsRng, plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::classifier::is_already_encoded;

    fn test_encryptor() -> ChaChaEncryptor {
        ChaChaEncryptor::from_key_bytes(&[7u8; KEY_LEN]).expect("valid key")
    }

    #[test]
    fn output_is_classified_as_encoded() {
        let enc = test_encryptor();
        for value in ["", "a", "plainSecret", "token with spaces", "ünïcödé"] {
            let out = enc.encrypt(value).expect("encrypt");
            assert!(is_already_encoded(&out), "{value:?} -> {out:?}");
        }
    }

    #[test]
    fn envelope_decrypts_back_to_plaintext() {
        let enc = test_encryptor();
        let out = enc.encrypt("plainSecret").expect("encrypt");
        let raw = STANDARD.decode(out).expect("base64");
        let (nonce, sealed) = raw.split_at(12);
        let cipher = ChaCha20Poly1305::new(&enc.key);
        let opened = cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .expect("decrypt");
        assert_eq!(opened, b"plainSecret");
    }

    #[test]
    fn nonces_differ_between_calls() {
        let enc = test_encryptor();
        assert_ne!(enc.encrypt("same").unwrap(), enc.encrypt("same").unwrap());
    }

    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, _dest: &mut [u8]) {}
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new("entropy source offline"))
        }
    }

    #[test]
    fn failing_nonce_source_is_unavailable() {
        let enc = test_encryptor();
        match enc.seal(&mut BrokenRng, "plainSecret") {
            Err(EncryptionError::Unavailable(msg)) => assert!(msg.contains("entropy source offline")),
            other => panic!("expected unavailable, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_keys() {
        assert!(matches!(
            ChaChaEncryptor::from_key_bytes(&[0u8; 16]),
            Err(EncryptionError::InvalidKey(_))
        ));
        assert!(matches!(
            ChaChaEncryptor::from_base64_key(""),
            Err(EncryptionError::InvalidKey(_))
        ));
        assert!(matches!(
            ChaChaEncryptor::from_base64_key("not base64!"),
            Err(EncryptionError::InvalidKey(_))
        ));
        let key = STANDARD.encode([1u8; KEY_LEN]);
        assert!(ChaChaEncryptor::from_base64_key(&key).is_ok());
    }
}
