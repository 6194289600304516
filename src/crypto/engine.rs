//! Hybrid encryption using secp256k1 ECDH + AES-256-GCM + HMAC-SHA256
//!
//! - Sender generates an ephemeral secp256k1 key pair
//! - ECDH with the recipient's public key gives the shared secret
//! - HKDF-SHA512 derives separate encryption and MAC keys
//! - AES-256-GCM encrypts, HMAC-SHA256 authenticates `nonce ‖ ciphertext`
//!
//! Wire format (no version, no length prefixes):
//! `[ephemeral_pubkey:65][nonce:12][ciphertext][tag:16][mac:32]`

use aes_gcm::{
    aead::{AeadInPlace, KeyInit},
    Aes256Gcm, Nonce, Tag,
};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use k256::ecdh::{diffie_hellman, EphemeralSecret};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::PublicKey;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Sha256, Sha512};

use super::keys::{public_key_from_hex, KeyPair, PUBLIC_KEY_LEN};
use super::payload::Payload;
use crate::model::Hash;
use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Size of the uncompressed ephemeral public key prefix
pub const EPHEMERAL_KEY_LEN: usize = PUBLIC_KEY_LEN;
/// Size of the AES-GCM nonce
pub const NONCE_LEN: usize = 12;
/// Size of the AES-GCM authentication tag
pub const TAG_LEN: usize = 16;
/// Size of the HMAC-SHA256 trailer
pub const MAC_LEN: usize = 32;
/// Fixed bytes around the ciphertext
pub const OVERHEAD_LEN: usize = EPHEMERAL_KEY_LEN + NONCE_LEN + TAG_LEN + MAC_LEN;
/// Smallest decodable blob (one byte of ciphertext)
pub const MIN_BLOB_LEN: usize = OVERHEAD_LEN + 1;

const ENCRYPTION_KEY_INFO: &[u8] = b"strandpress/aes-256-gcm";
const MAC_KEY_INFO: &[u8] = b"strandpress/hmac-sha256";

struct DerivedKeys {
    encryption: [u8; 32],
    mac: [u8; 32],
}

fn derive_keys(shared_secret: &[u8]) -> Result<DerivedKeys> {
    let hk = Hkdf::<Sha512>::new(None, shared_secret);
    let mut keys = DerivedKeys {
        encryption: [0u8; 32],
        mac: [0u8; 32],
    };
    hk.expand(ENCRYPTION_KEY_INFO, &mut keys.encryption)
        .map_err(|e| Error::Integrity(format!("key derivation failed: {}", e)))?;
    hk.expand(MAC_KEY_INFO, &mut keys.mac)
        .map_err(|e| Error::Integrity(format!("key derivation failed: {}", e)))?;
    Ok(keys)
}

fn mac_over(key: &[u8; 32], nonce: &[u8], ciphertext: &[u8]) -> Result<HmacSha256> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
        .map_err(|e| Error::Integrity(format!("bad MAC key: {}", e)))?;
    mac.update(nonce);
    mac.update(ciphertext);
    Ok(mac)
}

/// Encrypt raw `content` for the recipient, after validating its shape
pub fn encrypt(content: &str, recipient_public_hex: &str) -> Result<Vec<u8>> {
    let payload = Payload::parse(content)?;
    let recipient = public_key_from_hex(recipient_public_hex)?;
    encrypt_payload(&payload, &recipient)
}

/// Encrypt a typed payload for the recipient
pub fn encrypt_payload(payload: &Payload, recipient: &PublicKey) -> Result<Vec<u8>> {
    seal(payload.to_content().as_bytes(), recipient)
}

fn seal(plaintext: &[u8], recipient: &PublicKey) -> Result<Vec<u8>> {
    let ephemeral = EphemeralSecret::random(&mut OsRng);
    let ephemeral_public = ephemeral.public_key().to_encoded_point(false);
    let shared = ephemeral.diffie_hellman(recipient);
    let keys = derive_keys(shared.raw_secret_bytes())?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(&keys.encryption)
        .map_err(|e| Error::InvalidKey(format!("bad encryption key: {}", e)))?;
    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(nonce, b"", &mut buffer)
        .map_err(|_| Error::InvalidPayload("encryption failed".into()))?;

    let mac = mac_over(&keys.mac, &nonce_bytes, &buffer)?.finalize().into_bytes();

    let mut output = Vec::with_capacity(OVERHEAD_LEN + buffer.len());
    output.extend_from_slice(ephemeral_public.as_bytes());
    output.extend_from_slice(&nonce_bytes);
    output.extend_from_slice(&buffer);
    output.extend_from_slice(&tag);
    output.extend_from_slice(&mac);
    Ok(output)
}

/// Decrypting side of the engine, holding the recipient's key pair
#[derive(Clone, Debug)]
pub struct HybridEngine {
    keys: KeyPair,
}

impl HybridEngine {
    pub fn new(keys: KeyPair) -> Self {
        HybridEngine { keys }
    }

    /// Public key that blobs must be encrypted for
    pub fn public_hex(&self) -> String {
        self.keys.public_hex()
    }

    /// Encrypt `content` for another recipient
    pub fn encrypt(&self, content: &str, recipient_public_hex: &str) -> Result<Vec<u8>> {
        encrypt(content, recipient_public_hex)
    }

    /// Decrypt without any shape check
    pub fn decrypt_raw(&self, blob: &[u8]) -> Result<Vec<u8>> {
        if blob.len() < MIN_BLOB_LEN {
            return Err(Error::InvalidCiphertext(format!(
                "blob too short: {} bytes (minimum {})",
                blob.len(),
                MIN_BLOB_LEN
            )));
        }

        let (ephemeral_bytes, rest) = blob.split_at(EPHEMERAL_KEY_LEN);
        let (nonce_bytes, rest) = rest.split_at(NONCE_LEN);
        let (ciphertext, trailer) = rest.split_at(rest.len() - TAG_LEN - MAC_LEN);
        let (tag_bytes, mac_bytes) = trailer.split_at(TAG_LEN);

        let ephemeral = PublicKey::from_sec1_bytes(ephemeral_bytes)
            .map_err(|_| Error::Integrity("invalid ephemeral public key".into()))?;
        let shared = diffie_hellman(self.keys.secret().to_nonzero_scalar(), ephemeral.as_affine());
        let keys = derive_keys(shared.raw_secret_bytes())?;

        mac_over(&keys.mac, nonce_bytes, ciphertext)?
            .verify_slice(mac_bytes)
            .map_err(|_| Error::Integrity("MAC mismatch".into()))?;

        let cipher = Aes256Gcm::new_from_slice(&keys.encryption)
            .map_err(|e| Error::InvalidKey(format!("bad encryption key: {}", e)))?;
        let mut buffer = ciphertext.to_vec();
        cipher
            .decrypt_in_place_detached(
                Nonce::from_slice(nonce_bytes),
                b"",
                &mut buffer,
                Tag::from_slice(tag_bytes),
            )
            .map_err(|_| Error::Integrity("authentication tag mismatch".into()))?;

        Ok(buffer)
    }

    /// Decrypt a leaf payload
    pub fn decrypt_character(&self, blob: &[u8]) -> Result<char> {
        let content = self.decrypt_text(blob)?;
        Payload::parse_character(&content)
    }

    /// Decrypt a pair payload
    pub fn decrypt_hash_pair(&self, blob: &[u8]) -> Result<(Hash, Hash)> {
        let content = self.decrypt_text(blob)?;
        Payload::parse_hash_pair(&content)
    }

    fn decrypt_text(&self, blob: &[u8]) -> Result<String> {
        let plaintext = self.decrypt_raw(blob)?;
        String::from_utf8(plaintext)
            .map_err(|_| Error::InvalidPayload("decrypted payload is not UTF-8".into()))
    }
}
