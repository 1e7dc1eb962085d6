use std::collections::BTreeMap;
use std::path::Path;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{LedgerError, Result};
use crate::keys::{KeyCurve, PrivateKey, PublicKey};

const SALT_LEN: usize = 16;
const AES_NONCE_LEN: usize = 12;

/// A named private key, encrypted at rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyEntry {
    pub id: String,
    pub name: String,
    pub curve: KeyCurve,
    pub public_key: PublicKey,
    /// `salt || nonce || ciphertext`
    pub encrypted_key: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// Named keys that token configurations can reference instead of embedding
/// key material. Persisted as JSON; secrets are AES-256-GCM encrypted under a
/// password-derived key.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct KeyStore {
    keys: BTreeMap<String, KeyEntry>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encrypt and store `key` under `name`, replacing any previous entry.
    /// Returns the generated entry id.
    pub fn add_key(&mut self, name: &str, key: &PrivateKey, password: &str) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let entry = KeyEntry {
            id: id.clone(),
            name: name.to_string(),
            curve: key.curve(),
            public_key: key.public_key(),
            encrypted_key: encrypt_secret(&key.to_bytes_raw(), password)?,
            created_at: Utc::now(),
        };
        info!(key_name = %name, curve = %entry.curve, "key added to store");
        self.keys.insert(name.to_string(), entry);
        Ok(id)
    }

    pub fn remove_key(&mut self, name: &str) -> Option<KeyEntry> {
        let removed = self.keys.remove(name);
        if removed.is_some() {
            info!(key_name = %name, "key removed from store");
        }
        removed
    }

    pub fn get(&self, name: &str) -> Option<&KeyEntry> {
        self.keys.get(name)
    }

    /// Entries in name order.
    pub fn list(&self) -> Vec<&KeyEntry> {
        self.keys.values().collect()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Decrypt the key stored under `name`.
    pub fn decrypt_key(&self, name: &str, password: &str) -> Result<PrivateKey> {
        let entry = self
            .keys
            .get(name)
            .ok_or_else(|| LedgerError::KeyResolution(format!("no key named `{name}`")))?;
        let secret = decrypt_secret(&entry.encrypted_key, password)?;
        let key = PrivateKey::from_bytes(entry.curve, &secret)?;
        if key.public_key() != entry.public_key {
            return Err(LedgerError::KeyStore(format!(
                "decrypted key for `{name}` does not match its public key"
            )));
        }
        Ok(key)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;

        // Owner-only (0o600) on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        info!(path = %path.display(), count = self.keys.len(), "key store saved");
        Ok(())
    }

    /// Load a store from disk. A missing file yields an empty store.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "key store file not found, starting empty");
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)?;
        let store: Self = serde_json::from_str(&json)?;
        info!(path = %path.display(), count = store.keys.len(), "key store loaded");
        Ok(store)
    }
}

// ---------------------------------------------------------------------------
// Encryption helpers
// ---------------------------------------------------------------------------

/// Derive a 256-bit AES key from `password` with Argon2id
/// (m=19456 KiB, t=2, p=1).
fn derive_key(password: &str, salt: &[u8]) -> Result<[u8; 32]> {
    use argon2::{Algorithm, Argon2, Params, Version};

    let params = Params::new(19_456, 2, 1, Some(32))
        .map_err(|e| LedgerError::KeyStore(format!("argon2 params: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let mut key = [0u8; 32];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| LedgerError::KeyStore(format!("key derivation failed: {e}")))?;
    Ok(key)
}

/// Encrypt with AES-256-GCM under a fresh salt and nonce.
/// Output layout: `salt (16) || nonce (12) || ciphertext+tag`.
pub fn encrypt_secret(plaintext: &[u8], password: &str) -> Result<Vec<u8>> {
    let salt: [u8; SALT_LEN] = rand::random();
    let key_bytes = derive_key(password, &salt)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));

    let nonce_bytes: [u8; AES_NONCE_LEN] = rand::random();
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| LedgerError::KeyStore(format!("encryption failed: {e}")))?;

    let mut result = Vec::with_capacity(SALT_LEN + AES_NONCE_LEN + ciphertext.len());
    result.extend_from_slice(&salt);
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&ciphertext);
    Ok(result)
}

/// Inverse of [`encrypt_secret`].
pub fn decrypt_secret(data: &[u8], password: &str) -> Result<Vec<u8>> {
    if data.len() < SALT_LEN + AES_NONCE_LEN {
        return Err(LedgerError::KeyStore(format!(
            "ciphertext too short (expected at least {} bytes)",
            SALT_LEN + AES_NONCE_LEN
        )));
    }

    let (salt, rest) = data.split_at(SALT_LEN);
    let (nonce_bytes, encrypted) = rest.split_at(AES_NONCE_LEN);

    let key_bytes = derive_key(password, salt)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));

    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), encrypted)
        .map_err(|e| LedgerError::KeyStore(format!("decryption failed: {e}")))
}
