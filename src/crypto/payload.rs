//! The two plaintext shapes a node can carry

use crate::model::{Hash, HASH_HEX_LEN};
use crate::{Error, Result};

/// Maximum UTF-8 length of a character payload
pub const MAX_CHARACTER_LEN: usize = 4;
/// Maximum length of a hash-pair payload: `["0x<64>","0x<64>"]`
pub const MAX_HASH_PAIR_LEN: usize = 139;

/// Plaintext of one encrypted node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Payload {
    /// A leaf's character
    Character(char),
    /// A pair's `(left, right)` component hashes
    HashPair(Hash, Hash),
}

impl Payload {
    /// Infer the shape of `content` and validate it
    ///
    /// A lone character is always a character payload, so `"["` is valid.
    /// Longer content opening with `[` must be a hash pair.
    pub fn parse(content: &str) -> Result<Self> {
        let mut chars = content.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Err(Error::InvalidPayload("empty payload".into())),
            (Some(c), None) => Ok(Payload::Character(c)),
            _ if content.starts_with('[') => {
                let (left, right) = Self::parse_hash_pair(content)?;
                Ok(Payload::HashPair(left, right))
            }
            _ => Self::parse_character(content).map(Payload::Character),
        }
    }

    /// Validate `content` as exactly one character
    pub fn parse_character(content: &str) -> Result<char> {
        if content.len() > MAX_CHARACTER_LEN {
            return Err(Error::PayloadTooLarge {
                shape: "character",
                max: MAX_CHARACTER_LEN,
                actual: content.len(),
            });
        }
        let mut chars = content.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Error::InvalidPayload(format!(
                "expected a single character, got {:?}",
                content
            ))),
        }
    }

    /// Validate `content` as a JSON array of two `0x`-prefixed hashes
    pub fn parse_hash_pair(content: &str) -> Result<(Hash, Hash)> {
        if content.len() > MAX_HASH_PAIR_LEN {
            return Err(Error::PayloadTooLarge {
                shape: "hash pair",
                max: MAX_HASH_PAIR_LEN,
                actual: content.len(),
            });
        }
        let items: Vec<String> = serde_json::from_str(content)
            .map_err(|e| Error::InvalidPayload(format!("hash pair is not a JSON string array: {}", e)))?;
        if items.len() != 2 {
            return Err(Error::InvalidPayload(format!(
                "hash pair must have 2 entries, got {}",
                items.len()
            )));
        }
        let left = parse_component(&items[0])?;
        let right = parse_component(&items[1])?;
        Ok((left, right))
    }

    /// The plaintext that gets encrypted
    pub fn to_content(&self) -> String {
        match self {
            Payload::Character(c) => c.to_string(),
            Payload::HashPair(left, right) => format!("[\"{}\",\"{}\"]", left, right),
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            Payload::Character(_) => "character",
            Payload::HashPair(..) => "hash pair",
        }
    }
}

fn parse_component(s: &str) -> Result<Hash> {
    if !s.starts_with("0x") || s.len() != 2 + HASH_HEX_LEN {
        return Err(Error::InvalidPayload(format!(
            "hash pair entry must be 0x followed by {} hex digits",
            HASH_HEX_LEN
        )));
    }
    let hash = Hash::from_hex(s).map_err(|e| Error::InvalidPayload(format!("bad hash hex: {}", e)))?;
    if hash.is_zero() {
        return Err(Error::InvalidPayload("hash pair entry is the zero hash".into()));
    }
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Hash, Hash) {
        (Hash::digest(b"left"), Hash::digest(b"right"))
    }

    #[test]
    fn test_hash_pair_content_is_max_len() {
        let (l, r) = pair();
        let content = Payload::HashPair(l, r).to_content();
        assert_eq!(content.len(), MAX_HASH_PAIR_LEN);
        assert_eq!(Payload::parse(&content).unwrap(), Payload::HashPair(l, r));
    }

    #[test]
    fn test_single_characters() {
        assert_eq!(Payload::parse("a").unwrap(), Payload::Character('a'));
        assert_eq!(Payload::parse("[").unwrap(), Payload::Character('['));
        assert_eq!(Payload::parse("😀").unwrap(), Payload::Character('😀'));
    }

    #[test]
    fn test_five_byte_character_too_large() {
        let err = Payload::parse("abcde").unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge { max: 4, actual: 5, .. }));
    }

    #[test]
    fn test_oversized_hash_pair_rejected() {
        let (l, r) = pair();
        let content = format!("[\"{}\", \"{}\"]", l, r);
        assert_eq!(content.len(), 140);
        let err = Payload::parse(&content).unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge { max: 139, actual: 140, .. }));
    }

    #[test]
    fn test_malformed_hash_pairs() {
        let (l, _) = pair();
        assert!(Payload::parse("[1,2]").is_err());
        assert!(Payload::parse(&format!("[\"{}\"]", l)).is_err());
        assert!(Payload::parse(&format!("[\"{}\",\"{}\"]", l, Hash::ZERO)).is_err());
        let bare = &l.to_hex()[2..];
        assert!(Payload::parse(&format!("[\"{}\",\"{}\"]", bare, l)).is_err());
    }

    #[test]
    fn test_strict_variants_reject_other_shape() {
        let (l, r) = pair();
        let content = Payload::HashPair(l, r).to_content();
        assert!(Payload::parse_character(&content).is_err());
        assert!(Payload::parse_hash_pair("a").is_err());
    }
}
