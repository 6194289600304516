//! Blob type - the unit of storage in a ledger file

use serde::{Deserialize, Serialize};

/// Type tag for blobs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlobType {
    /// A node record (components and, for leaves, the character)
    Node,
    /// An encrypted payload
    Payload,
}

impl BlobType {
    pub fn as_byte(&self) -> u8 {
        match self {
            BlobType::Node => 0,
            BlobType::Payload => 1,
        }
    }

    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(BlobType::Node),
            1 => Some(BlobType::Payload),
            _ => None,
        }
    }
}

/// A blob is a typed, compressed chunk of data
#[derive(Clone, Debug)]
pub struct Blob {
    pub blob_type: BlobType,
    /// Raw data (uncompressed)
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(blob_type: BlobType, data: Vec<u8>) -> Self {
        Blob { blob_type, data }
    }

    /// Encode for storage: type byte followed by zstd data
    pub fn compress(&self) -> crate::Result<Vec<u8>> {
        let mut output = vec![self.blob_type.as_byte()];
        let compressed = zstd::encode_all(self.data.as_slice(), 3)?;
        output.extend(compressed);
        Ok(output)
    }

    pub fn decompress(data: &[u8]) -> crate::Result<Self> {
        let (&type_byte, body) = data
            .split_first()
            .ok_or_else(|| crate::Error::Corruption("Empty blob data".into()))?;

        let blob_type = BlobType::from_byte(type_byte)
            .ok_or_else(|| crate::Error::Corruption(format!("Invalid blob type: {}", type_byte)))?;

        Ok(Blob {
            blob_type,
            data: zstd::decode_all(body)?,
        })
    }
}
