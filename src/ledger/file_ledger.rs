//! Single-file persistent ledger
//!
//! File format:
//! ```text
//! [HEADER: 64 bytes]
//!   - magic: 8 bytes ("STRANDLG")
//!   - version: 4 bytes (u32 LE)
//!   - flags: 4 bytes
//!   - record_count: 8 bytes (u64 LE)
//!   - index_offset: 8 bytes (u64 LE)
//!   - next_event_index: 8 bytes (u64 LE)
//!   - reserved: 24 bytes
//!
//! [RECORDS: variable]
//!   - blob data, concatenated
//!
//! [INDEX: variable]
//!   - (type, hash, offset, size) entries sorted by type then hash
//! ```
//!
//! Payload overwrites append a new record and repoint the index entry.

use super::blob::{Blob, BlobType};
use super::builder::plan_tree;
use super::Ledger;
use crate::model::{Components, Hash, PathEvent};
use crate::{Error, Result, MAGIC, VERSION};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

const HEADER_SIZE: u64 = 64;
// type (1) + hash (32) + offset (8) + size (4)
const ENTRY_SIZE: usize = 45;

#[derive(Clone, Debug)]
struct IndexEntry {
    offset: u64,
    size: u32,
}

type Key = (BlobType, Hash);

#[derive(Serialize, Deserialize)]
struct NodeRecord {
    components: Components,
    character: Option<char>,
}

fn le_u32(buf: &[u8], at: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[at..at + 4]);
    u32::from_le_bytes(bytes)
}

fn le_u64(buf: &[u8], at: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[at..at + 8]);
    u64::from_le_bytes(bytes)
}

/// A ledger backed by a single file
pub struct FileLedger {
    path: PathBuf,
    file: RwLock<File>,
    index: RwLock<HashMap<Key, IndexEntry>>,
    /// Current append position
    write_offset: RwLock<u64>,
    /// Next path event index; the write lock also serializes tree builds
    next_index: RwLock<u64>,
}

impl FileLedger {
    /// Create a new ledger file, truncating any existing one
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        let mut header = [0u8; HEADER_SIZE as usize];
        header[0..8].copy_from_slice(MAGIC);
        header[8..12].copy_from_slice(&VERSION.to_le_bytes());
        file.write_all(&header)?;
        file.sync_all()?;

        tracing::debug!(path = %path.display(), "created ledger file");

        Ok(FileLedger {
            path,
            file: RwLock::new(file),
            index: RwLock::new(HashMap::new()),
            write_offset: RwLock::new(HEADER_SIZE),
            next_index: RwLock::new(0),
        })
    }

    /// Open an existing ledger file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut file = OpenOptions::new().read(true).write(true).open(&path)?;

        let mut header = [0u8; HEADER_SIZE as usize];
        file.read_exact(&mut header)
            .map_err(|_| Error::InvalidFile("Truncated header".into()))?;

        if &header[0..8] != MAGIC {
            return Err(Error::InvalidFile("Invalid magic bytes".into()));
        }

        let version = le_u32(&header, 8);
        if version != VERSION {
            return Err(Error::VersionMismatch {
                expected: VERSION,
                found: version,
            });
        }

        let record_count = le_u64(&header, 16);
        let index_offset = le_u64(&header, 24);
        let next_index = le_u64(&header, 32);

        let mut index = HashMap::new();
        if index_offset > 0 && record_count > 0 {
            file.seek(SeekFrom::Start(index_offset))?;
            for _ in 0..record_count {
                let mut entry = [0u8; ENTRY_SIZE];
                file.read_exact(&mut entry)?;

                let blob_type = BlobType::from_byte(entry[0]).ok_or_else(|| {
                    Error::Corruption(format!("Invalid index entry type: {}", entry[0]))
                })?;
                let mut hash_bytes = [0u8; 32];
                hash_bytes.copy_from_slice(&entry[1..33]);

                index.insert(
                    (blob_type, Hash::from_bytes(hash_bytes)),
                    IndexEntry {
                        offset: le_u64(&entry, 33),
                        size: le_u32(&entry, 41),
                    },
                );
            }
        }

        let write_offset = if index_offset > 0 {
            index_offset
        } else {
            file.seek(SeekFrom::End(0))?
        };

        tracing::debug!(path = %path.display(), records = index.len(), "opened ledger file");

        Ok(FileLedger {
            path,
            file: RwLock::new(file),
            index: RwLock::new(index),
            write_offset: RwLock::new(write_offset),
            next_index: RwLock::new(next_index),
        })
    }

    /// Open or create a ledger file
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    fn contains(&self, blob_type: BlobType, hash: &Hash) -> bool {
        self.index.read().contains_key(&(blob_type, *hash))
    }

    fn put(&self, hash: &Hash, blob: &Blob) -> Result<()> {
        let compressed = blob.compress()?;
        let size = compressed.len() as u32;

        let offset = {
            let mut write_offset = self.write_offset.write();
            let offset = *write_offset;

            let mut file = self.file.write();
            file.seek(SeekFrom::Start(offset))?;
            file.write_all(&compressed)?;

            *write_offset = offset + size as u64;
            offset
        };

        self.index
            .write()
            .insert((blob.blob_type, *hash), IndexEntry { offset, size });
        Ok(())
    }

    fn get(&self, blob_type: BlobType, hash: &Hash) -> Result<Option<Blob>> {
        let entry = self.index.read().get(&(blob_type, *hash)).cloned();
        let Some(entry) = entry else {
            return Ok(None);
        };

        let mut file = self.file.write();
        file.seek(SeekFrom::Start(entry.offset))?;
        let mut data = vec![0u8; entry.size as usize];
        file.read_exact(&mut data)?;

        let blob = Blob::decompress(&data)?;
        if blob.blob_type != blob_type {
            return Err(Error::Corruption(format!(
                "Expected {:?}, got {:?}",
                blob_type, blob.blob_type
            )));
        }
        Ok(Some(blob))
    }

    fn node_record(&self, hash: &Hash) -> Result<NodeRecord> {
        let blob = self
            .get(BlobType::Node, hash)?
            .ok_or_else(|| Error::NotFound(format!("node {}", hash)))?;
        Ok(bincode::deserialize(&blob.data)?)
    }

    /// Number of distinct nodes in the ledger
    pub fn node_count(&self) -> usize {
        self.index
            .read()
            .keys()
            .filter(|(t, _)| *t == BlobType::Node)
            .count()
    }

    /// Number of nodes with a stored payload
    pub fn payload_count(&self) -> usize {
        self.index
            .read()
            .keys()
            .filter(|(t, _)| *t == BlobType::Payload)
            .count()
    }

    /// Write the header and index to disk
    pub fn sync(&self) -> Result<()> {
        let next_index = *self.next_index.read();
        let write_offset = *self.write_offset.read();
        let index = self.index.read();
        let mut file = self.file.write();

        file.seek(SeekFrom::Start(16))?;
        file.write_all(&(index.len() as u64).to_le_bytes())?;
        file.write_all(&write_offset.to_le_bytes())?;
        file.write_all(&next_index.to_le_bytes())?;

        file.seek(SeekFrom::Start(write_offset))?;

        let mut entries: Vec<_> = index.iter().collect();
        entries.sort_by_key(|((t, h), _)| (t.as_byte(), *h));

        for ((blob_type, hash), entry) in entries {
            file.write_all(&[blob_type.as_byte()])?;
            file.write_all(hash.as_bytes())?;
            file.write_all(&entry.offset.to_le_bytes())?;
            file.write_all(&entry.size.to_le_bytes())?;
        }

        let end = write_offset + (index.len() * ENTRY_SIZE) as u64;
        file.set_len(end)?;
        file.sync_all()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Ledger for FileLedger {
    fn build_tree(&self, text: &str) -> Result<Vec<PathEvent>> {
        let plan = plan_tree(text)?;

        let mut next_index = self.next_index.write();
        let mut created = 0usize;
        for node in &plan.nodes {
            if self.contains(BlobType::Node, &node.hash) {
                continue;
            }
            let record = NodeRecord {
                components: node.components,
                character: node.character,
            };
            let blob = Blob::new(BlobType::Node, bincode::serialize(&record)?);
            self.put(&node.hash, &blob)?;
            created += 1;
        }
        let events = plan.into_events(&mut *next_index);

        tracing::debug!(events = events.len(), created, "built tree in ledger file");
        Ok(events)
    }

    fn components(&self, hash: &Hash) -> Result<Components> {
        Ok(self.node_record(hash)?.components)
    }

    fn character_for_hash(&self, hash: &Hash) -> Result<char> {
        self.node_record(hash)?
            .character
            .ok_or_else(|| Error::NotFound(format!("leaf character for {}", hash)))
    }

    fn store_payload(&self, hash: &Hash, payload: &[u8]) -> Result<()> {
        if !self.contains(BlobType::Node, hash) {
            return Err(Error::Ledger(format!("unknown node {}", hash)));
        }
        self.put(hash, &Blob::new(BlobType::Payload, payload.to_vec()))
    }

    fn fetch_payload(&self, hash: &Hash) -> Result<Vec<u8>> {
        self.get(BlobType::Payload, hash)?
            .map(|blob| blob.data)
            .ok_or_else(|| Error::NotFound(format!("payload for {}", hash)))
    }
}

impl Drop for FileLedger {
    fn drop(&mut self) {
        // Best-effort sync on drop
        let _ = self.sync();
    }
}
