use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{Signer as _, Verifier as _};
use secp256k1::{Message, SECP256K1};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::{LedgerError, Result};
use crate::ids::AccountId;

const ED25519_PRIVATE_DER_PREFIX: &str = "302e020100300506032b657004220420";
const ED25519_PUBLIC_DER_PREFIX: &str = "302a300506032b6570032100";
const ECDSA_PRIVATE_DER_PREFIX: &str = "3030020100300706052b8104000a04220420";
const ECDSA_PUBLIC_DER_PREFIX: &str = "302d300706052b8104000a032200";

const KEY_GEN_ATTEMPTS: usize = 8;

/// Signature scheme of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyCurve {
    Ed25519,
    #[serde(rename = "ecdsa", alias = "secp256k1")]
    EcdsaSecp256k1,
}

impl KeyCurve {
    pub fn label(&self) -> &'static str {
        match self {
            KeyCurve::Ed25519 => "ed25519",
            KeyCurve::EcdsaSecp256k1 => "ecdsa",
        }
    }
}

impl fmt::Display for KeyCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for KeyCurve {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ed25519" => Ok(KeyCurve::Ed25519),
            "ecdsa" | "secp256k1" | "ecdsa_secp256k1" => Ok(KeyCurve::EcdsaSecp256k1),
            other => Err(LedgerError::KeyParse(format!("unknown key curve `{other}`"))),
        }
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).map_err(|e| LedgerError::KeyParse(format!("not valid hex: {e}")))
}

fn to_array(bytes: &[u8]) -> Result<[u8; 32]> {
    bytes.try_into().map_err(|_| {
        LedgerError::KeyParse(format!("expected 32 key bytes, found {}", bytes.len()))
    })
}

fn sha256_digest(message: &[u8]) -> [u8; 32] {
    Sha256::digest(message).into()
}

// ---------------------------------------------------------------------------
// PrivateKey
// ---------------------------------------------------------------------------

/// A signing key on one of the supported curves.
#[derive(Clone)]
pub enum PrivateKey {
    Ed25519(ed25519_dalek::SigningKey),
    EcdsaSecp256k1(secp256k1::SecretKey),
}

impl PrivateKey {
    /// Generate a fresh random key.
    pub fn generate(curve: KeyCurve) -> Result<Self> {
        for _ in 0..KEY_GEN_ATTEMPTS {
            let bytes: [u8; 32] = rand::random();
            if let Ok(key) = Self::from_bytes(curve, &bytes) {
                return Ok(key);
            }
        }
        Err(LedgerError::KeyParse(format!(
            "could not generate a valid {curve} key"
        )))
    }

    /// Build a key from its raw 32-byte secret.
    pub fn from_bytes(curve: KeyCurve, bytes: &[u8]) -> Result<Self> {
        let raw = to_array(bytes)?;
        match curve {
            KeyCurve::Ed25519 => Ok(Self::Ed25519(ed25519_dalek::SigningKey::from_bytes(&raw))),
            KeyCurve::EcdsaSecp256k1 => secp256k1::SecretKey::from_slice(&raw)
                .map(Self::EcdsaSecp256k1)
                .map_err(|e| LedgerError::KeyParse(format!("invalid secp256k1 secret: {e}"))),
        }
    }

    /// Parse a hex-encoded key. DER-prefixed input determines its own curve;
    /// raw 32-byte input is interpreted on `curve`.
    pub fn from_str_with_curve(s: &str, curve: KeyCurve) -> Result<Self> {
        let bytes = decode_hex(s)?;
        let encoded = hex::encode(&bytes);

        if let Some(raw) = encoded.strip_prefix(ED25519_PRIVATE_DER_PREFIX) {
            return Self::from_bytes(KeyCurve::Ed25519, &decode_hex(raw)?);
        }
        if let Some(raw) = encoded.strip_prefix(ECDSA_PRIVATE_DER_PREFIX) {
            return Self::from_bytes(KeyCurve::EcdsaSecp256k1, &decode_hex(raw)?);
        }
        Self::from_bytes(curve, &bytes)
    }

    pub fn curve(&self) -> KeyCurve {
        match self {
            Self::Ed25519(_) => KeyCurve::Ed25519,
            Self::EcdsaSecp256k1(_) => KeyCurve::EcdsaSecp256k1,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        match self {
            Self::Ed25519(key) => PublicKey::Ed25519(key.verifying_key()),
            Self::EcdsaSecp256k1(key) => {
                PublicKey::EcdsaSecp256k1(secp256k1::PublicKey::from_secret_key_global(key))
            }
        }
    }

    /// Sign `message`. ECDSA signatures cover the SHA-256 digest of the
    /// message and are returned in 64-byte compact form.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Ed25519(key) => key.sign(message).to_bytes().to_vec(),
            Self::EcdsaSecp256k1(key) => {
                let msg = Message::from_digest(sha256_digest(message));
                SECP256K1.sign_ecdsa(&msg, key).serialize_compact().to_vec()
            }
        }
    }

    pub fn to_bytes_raw(&self) -> [u8; 32] {
        match self {
            Self::Ed25519(key) => key.to_bytes(),
            Self::EcdsaSecp256k1(key) => key.secret_bytes(),
        }
    }

    /// Hex string with the curve's DER prefix, accepted by
    /// [`PrivateKey::from_str_with_curve`] regardless of hint.
    pub fn to_string_der(&self) -> String {
        let prefix = match self {
            Self::Ed25519(_) => ED25519_PRIVATE_DER_PREFIX,
            Self::EcdsaSecp256k1(_) => ECDSA_PRIVATE_DER_PREFIX,
        };
        format!("{prefix}{}", hex::encode(self.to_bytes_raw()))
    }
}

impl FromStr for PrivateKey {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_str_with_curve(s, KeyCurve::Ed25519)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("curve", &self.curve())
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.curve() == other.curve() && self.to_bytes_raw() == other.to_bytes_raw()
    }
}

impl Eq for PrivateKey {}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// A verification key. Serialized as its DER hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicKey {
    Ed25519(ed25519_dalek::VerifyingKey),
    EcdsaSecp256k1(secp256k1::PublicKey),
}

impl PublicKey {
    pub fn curve(&self) -> KeyCurve {
        match self {
            Self::Ed25519(_) => KeyCurve::Ed25519,
            Self::EcdsaSecp256k1(_) => KeyCurve::EcdsaSecp256k1,
        }
    }

    /// 32 bytes for ED25519, 33 bytes (compressed) for ECDSA.
    pub fn to_bytes_raw(&self) -> Vec<u8> {
        match self {
            Self::Ed25519(key) => key.to_bytes().to_vec(),
            Self::EcdsaSecp256k1(key) => key.serialize().to_vec(),
        }
    }

    pub fn to_string_der(&self) -> String {
        let prefix = match self {
            Self::Ed25519(_) => ED25519_PUBLIC_DER_PREFIX,
            Self::EcdsaSecp256k1(_) => ECDSA_PUBLIC_DER_PREFIX,
        };
        format!("{prefix}{}", hex::encode(self.to_bytes_raw()))
    }

    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        match self {
            Self::Ed25519(key) => ed25519_dalek::Signature::from_slice(signature)
                .is_ok_and(|sig| key.verify(message, &sig).is_ok()),
            Self::EcdsaSecp256k1(key) => {
                let msg = Message::from_digest(sha256_digest(message));
                secp256k1::ecdsa::Signature::from_compact(signature)
                    .is_ok_and(|sig| SECP256K1.verify_ecdsa(&msg, &sig, key).is_ok())
            }
        }
    }

    /// The alias account identifier derived from this key.
    pub fn to_account_id(&self, shard: u64, realm: u64) -> AccountId {
        AccountId::from_alias(shard, realm, *self)
    }
}

impl FromStr for PublicKey {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = decode_hex(s)?;
        let encoded = hex::encode(&bytes);

        let (curve, raw) = if let Some(raw) = encoded.strip_prefix(ED25519_PUBLIC_DER_PREFIX) {
            (KeyCurve::Ed25519, decode_hex(raw)?)
        } else if let Some(raw) = encoded.strip_prefix(ECDSA_PUBLIC_DER_PREFIX) {
            (KeyCurve::EcdsaSecp256k1, decode_hex(raw)?)
        } else if bytes.len() == 33 {
            (KeyCurve::EcdsaSecp256k1, bytes)
        } else {
            (KeyCurve::Ed25519, bytes)
        };

        match curve {
            KeyCurve::Ed25519 => ed25519_dalek::VerifyingKey::from_bytes(&to_array(&raw)?)
                .map(Self::Ed25519)
                .map_err(|e| LedgerError::KeyParse(format!("invalid ed25519 public key: {e}"))),
            KeyCurve::EcdsaSecp256k1 => secp256k1::PublicKey::from_slice(&raw)
                .map(Self::EcdsaSecp256k1)
                .map_err(|e| LedgerError::KeyParse(format!("invalid secp256k1 public key: {e}"))),
        }
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_der())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_string_der())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_der())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "db484b828e64b2d8f12ce3c0a0e93a0b8cce7af1bb8f39c97732394482538e10";

    #[test]
    fn raw_hex_uses_curve_hint() {
        let ed = PrivateKey::from_str_with_curve(RAW, KeyCurve::Ed25519).unwrap();
        let ec = PrivateKey::from_str_with_curve(RAW, KeyCurve::EcdsaSecp256k1).unwrap();
        assert_eq!(ed.curve(), KeyCurve::Ed25519);
        assert_eq!(ec.curve(), KeyCurve::EcdsaSecp256k1);
        assert_eq!(ed.to_bytes_raw(), ec.to_bytes_raw());
        assert_ne!(ed.public_key(), ec.public_key());
    }

    #[test]
    fn der_prefix_overrides_curve_hint() {
        let ec = PrivateKey::from_str_with_curve(RAW, KeyCurve::EcdsaSecp256k1).unwrap();
        let der = ec.to_string_der();
        assert!(der.starts_with(ECDSA_PRIVATE_DER_PREFIX));

        let parsed = PrivateKey::from_str_with_curve(&der, KeyCurve::Ed25519).unwrap();
        assert_eq!(parsed, ec);
    }

    #[test]
    fn accepts_0x_prefix() {
        let key: PrivateKey = format!("0x{RAW}").parse().unwrap();
        assert_eq!(hex::encode(key.to_bytes_raw()), RAW);
    }

    #[test]
    fn rejects_bad_input() {
        assert!("zz".parse::<PrivateKey>().is_err());
        assert!("abcd".parse::<PrivateKey>().is_err());
        // Zero is not a valid secp256k1 scalar.
        assert!(PrivateKey::from_bytes(KeyCurve::EcdsaSecp256k1, &[0u8; 32]).is_err());
    }

    #[test]
    fn sign_and_verify_both_curves() {
        for curve in [KeyCurve::Ed25519, KeyCurve::EcdsaSecp256k1] {
            let key = PrivateKey::generate(curve).unwrap();
            let sig = key.sign(b"body bytes");
            assert!(key.public_key().verify(b"body bytes", &sig));
            assert!(!key.public_key().verify(b"other bytes", &sig));
        }
    }

    #[test]
    fn public_key_der_round_trip() {
        for curve in [KeyCurve::Ed25519, KeyCurve::EcdsaSecp256k1] {
            let public = PrivateKey::generate(curve).unwrap().public_key();
            let parsed: PublicKey = public.to_string_der().parse().unwrap();
            assert_eq!(parsed, public);
        }
    }

    #[test]
    fn debug_output_hides_secret() {
        let key: PrivateKey = RAW.parse().unwrap();
        let rendered = format!("{key:?}");
        assert!(!rendered.contains(RAW));
        assert!(rendered.contains("Ed25519"));
    }

    #[test]
    fn curve_from_str() {
        assert_eq!("ED25519".parse::<KeyCurve>().unwrap(), KeyCurve::Ed25519);
        assert_eq!("secp256k1".parse::<KeyCurve>().unwrap(), KeyCurve::EcdsaSecp256k1);
        assert!("rsa".parse::<KeyCurve>().is_err());
    }
}
