use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LedgerError, Result};
use crate::key_store::KeyStore;
use crate::keys::{KeyCurve, PrivateKey};

/// How a configuration names a key: inline hex material, or a reference to
/// a key held elsewhere (`{ "ref": "treasury" }`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyRef {
    Inline(String),
    Named {
        #[serde(rename = "ref")]
        name: String,
    },
}

impl KeyRef {
    pub fn inline(key: &PrivateKey) -> Self {
        Self::Inline(key.to_string_der())
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named { name: name.into() }
    }
}

impl fmt::Debug for KeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline(_) => f.write_str("KeyRef::Inline(<redacted>)"),
            Self::Named { name } => write!(f, "KeyRef::Named({name})"),
        }
    }
}

/// Turns a [`KeyRef`] into a usable signing key.
///
/// `curve` applies to inline raw keys only; DER-prefixed inline keys and
/// referenced keys carry their own curve.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    async fn resolve(&self, key: &KeyRef, curve: KeyCurve) -> Result<PrivateKey>;
}

#[async_trait]
impl<R: KeyResolver + ?Sized> KeyResolver for Arc<R> {
    async fn resolve(&self, key: &KeyRef, curve: KeyCurve) -> Result<PrivateKey> {
        (**self).resolve(key, curve).await
    }
}

/// Resolves inline keys only; every reference fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineKeyResolver;

#[async_trait]
impl KeyResolver for InlineKeyResolver {
    async fn resolve(&self, key: &KeyRef, curve: KeyCurve) -> Result<PrivateKey> {
        match key {
            KeyRef::Inline(raw) => PrivateKey::from_str_with_curve(raw, curve),
            KeyRef::Named { name } => Err(LedgerError::KeyResolution(format!(
                "`{name}` is a reference but no key store is configured"
            ))),
        }
    }
}

/// Resolves references against an encrypted [`KeyStore`].
pub struct KeyStoreResolver {
    store: KeyStore,
    password: String,
}

impl KeyStoreResolver {
    pub fn new(store: KeyStore, password: impl Into<String>) -> Self {
        Self {
            store,
            password: password.into(),
        }
    }

    pub fn store(&self) -> &KeyStore {
        &self.store
    }
}

impl fmt::Debug for KeyStoreResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStoreResolver")
            .field("keys", &self.store.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KeyResolver for KeyStoreResolver {
    async fn resolve(&self, key: &KeyRef, curve: KeyCurve) -> Result<PrivateKey> {
        match key {
            KeyRef::Inline(raw) => PrivateKey::from_str_with_curve(raw, curve),
            KeyRef::Named { name } => {
                debug!(key_name = %name, "resolving key from store");
                self.store.decrypt_key(name, &self.password)
            }
        }
    }
}
