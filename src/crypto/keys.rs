//! secp256k1 key pairs and hex encodings

use crate::{Error, Result};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Secret key length in bytes
pub const SECRET_KEY_LEN: usize = 32;
/// Uncompressed SEC1 public key length in bytes
pub const PUBLIC_KEY_LEN: usize = 65;

fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let digits = s.trim().strip_prefix("0x").unwrap_or(s.trim());
    hex::decode(digits).map_err(|e| Error::InvalidKey(format!("bad hex: {}", e)))
}

/// A recipient key pair
#[derive(Clone)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secret = SecretKey::random(&mut OsRng);
        let public = secret.public_key();
        KeyPair { secret, public }
    }

    /// Create a key pair from a hex-encoded secret key
    pub fn from_secret_hex(secret_hex: &str) -> Result<Self> {
        let bytes = decode_hex(secret_hex)?;
        if bytes.len() != SECRET_KEY_LEN {
            return Err(Error::InvalidKey(format!(
                "secret key must be {} bytes, got {}",
                SECRET_KEY_LEN,
                bytes.len()
            )));
        }
        let secret = SecretKey::from_slice(&bytes)
            .map_err(|_| Error::InvalidKey("secret key out of range".into()))?;
        let public = secret.public_key();
        Ok(KeyPair { secret, public })
    }

    /// Secret key as `0x`-prefixed hex
    pub fn secret_hex(&self) -> String {
        format!("0x{}", hex::encode(self.secret.to_bytes()))
    }

    /// Uncompressed public key as `0x`-prefixed hex
    pub fn public_hex(&self) -> String {
        public_key_to_hex(&self.public)
    }

    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public_hex())
            .finish_non_exhaustive()
    }
}

/// Parse a SEC1 public key (compressed or uncompressed) from hex
pub fn public_key_from_hex(hex_str: &str) -> Result<PublicKey> {
    let bytes = decode_hex(hex_str)?;
    PublicKey::from_sec1_bytes(&bytes)
        .map_err(|_| Error::InvalidKey("not a valid secp256k1 public key".into()))
}

/// Encode a public key as uncompressed `0x`-prefixed hex
pub fn public_key_to_hex(key: &PublicKey) -> String {
    format!("0x{}", hex::encode(key.to_encoded_point(false).as_bytes()))
}

/// On-disk form of a key pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyFile {
    pub secret_key: String,
    pub public_key: String,
}

impl KeyFile {
    pub fn from_keys(keys: &KeyPair) -> Self {
        KeyFile {
            secret_key: keys.secret_hex(),
            public_key: keys.public_hex(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<KeyPair> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read key file {}: {}", path.display(), e)))?;
        let file: KeyFile = serde_json::from_str(&content)?;
        let keys = KeyPair::from_secret_hex(&file.secret_key)?;

        let stored = public_key_from_hex(&file.public_key)?;
        if &stored != keys.public() {
            return Err(Error::InvalidKey(
                "public key in key file does not match secret key".into(),
            ));
        }
        Ok(keys)
    }

    pub fn save(keys: &KeyPair, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(&KeyFile::from_keys(keys))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
