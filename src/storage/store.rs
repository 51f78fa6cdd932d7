// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Frame store: an LMDB environment holding one raw frame per key.
//!
//! Values live in the unnamed main database as `key (ASCII) -> HWC bytes`,
//! which is the layout Python `lmdb` readers open without a `db=` argument.
//!
//! Writes are grouped into [`WriteBatch`]es, each a single write
//! transaction. Nothing becomes visible to readers until `commit`.

use std::path::Path;

use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions, RwTxn};
use tracing::{debug, info};

use crate::error::{FrameDbError, Result};

/// Map sizes are rounded up to this boundary (and never go below it).
pub const MAP_SIZE_ALIGN: u64 = 1 << 20;

/// Header LMDB puts in front of a value spilled to overflow pages.
pub const OVERFLOW_HEADER: u64 = 16;

/// Leaf/branch space reserved per entry for its key node.
pub const ENTRY_OVERHEAD: u64 = 128;

type FrameDb = Database<Str, Bytes>;

pub struct FrameStore {
    env: Env,
    db: FrameDb,
}

impl FrameStore {
    /// Create the store directory and an environment able to grow to
    /// `map_size` bytes.
    pub fn create(path: &Path, map_size: u64) -> Result<Self> {
        std::fs::create_dir_all(path)
            .map_err(|e| FrameDbError::Store(format!("Cannot create store dir {path:?}: {e}")))?;

        let map_size = align_map_size(map_size);
        let size = usize::try_from(map_size)
            .map_err(|_| FrameDbError::Store(format!("map size {map_size} exceeds address space")))?;

        // SAFETY: the environment is opened once per process for this path
        // and its files are not modified by anything else while it is open.
        let env = unsafe { EnvOpenOptions::new().map_size(size).open(path)? };
        let mut wtxn = env.write_txn()?;
        let db: FrameDb = env.create_database(&mut wtxn, None)?;
        wtxn.commit()?;

        info!(path = ?path, map_size_mb = map_size / 1_048_576, "Frame store created");
        Ok(Self { env, db })
    }

    /// Open an existing store. The map size recorded in the environment is used.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            return Err(FrameDbError::Store(format!("No frame store at {path:?}")));
        }
        // SAFETY: see `create`.
        let env = unsafe { EnvOpenOptions::new().open(path)? };
        let rtxn = env.read_txn()?;
        let db: FrameDb = env
            .open_database(&rtxn, None)?
            .ok_or_else(|| FrameDbError::Store(format!("{path:?} has no main database")))?;
        drop(rtxn);

        debug!(path = ?path, "Frame store opened");
        Ok(Self { env, db })
    }

    /// Begin a write transaction.
    pub fn batch(&self) -> Result<WriteBatch<'_>> {
        Ok(WriteBatch { txn: self.env.write_txn()?, db: self.db, puts: 0 })
    }

    /// Fetch a copy of the value stored under `key`.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let rtxn = self.env.read_txn()?;
        Ok(self.db.get(&rtxn, key)?.map(<[u8]>::to_vec))
    }

    /// Number of committed entries.
    pub fn len(&self) -> Result<u64> {
        let rtxn = self.env.read_txn()?;
        Ok(self.db.len(&rtxn)?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// One open write transaction.
pub struct WriteBatch<'env> {
    txn: RwTxn<'env>,
    db: FrameDb,
    puts: usize,
}

impl WriteBatch<'_> {
    pub fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.db.put(&mut self.txn, key, value)?;
        self.puts += 1;
        Ok(())
    }

    /// Entries written in this batch so far.
    pub fn len(&self) -> usize {
        self.puts
    }

    pub fn is_empty(&self) -> bool {
        self.puts == 0
    }

    /// Make the batch durable and visible. Dropping a batch without
    /// committing discards it.
    pub fn commit(self) -> Result<()> {
        let puts = self.puts;
        self.txn.commit()?;
        debug!(entries = puts, "Batch committed");
        Ok(())
    }
}

/// Page size LMDB will use for new environments on this host.
pub fn page_size() -> u64 {
    page_size::get() as u64
}

/// Map bytes one value of `len` bytes can occupy.
///
/// Values above a quarter page are budgeted as overflow pages
/// (`len + 16` rounded up to whole pages). Smaller ones stay in leaf
/// pages, which may be only half full after splits.
pub fn value_footprint(len: u64, page_size: u64) -> u64 {
    let body = if len <= page_size / 4 {
        2 * len
    } else {
        (len + OVERFLOW_HEADER).div_ceil(page_size) * page_size
    };
    body + ENTRY_OVERHEAD
}

/// Round `bytes` up to [`MAP_SIZE_ALIGN`], with one alignment unit as the floor.
pub fn align_map_size(bytes: u64) -> u64 {
    bytes.max(1).div_ceil(MAP_SIZE_ALIGN) * MAP_SIZE_ALIGN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_size_alignment() {
        assert_eq!(align_map_size(0), MAP_SIZE_ALIGN);
        assert_eq!(align_map_size(1), MAP_SIZE_ALIGN);
        assert_eq!(align_map_size(MAP_SIZE_ALIGN), MAP_SIZE_ALIGN);
        assert_eq!(align_map_size(MAP_SIZE_ALIGN + 1), 2 * MAP_SIZE_ALIGN);
    }

    #[test]
    fn footprint_counts_whole_overflow_pages() {
        // 37x37 RGB spills just past one 4 KiB page.
        assert_eq!(value_footprint(4107, 4096), 2 * 4096 + ENTRY_OVERHEAD);
        assert_eq!(value_footprint(4096 - 16, 4096), 4096 + ENTRY_OVERHEAD);
        assert_eq!(value_footprint(192, 4096), 384 + ENTRY_OVERHEAD);
        assert!(value_footprint(4107, 16384) >= 16384);
    }

    #[test]
    fn overflow_values_fill_their_budgeted_map() {
        let dir = tempfile::tempdir().unwrap();
        let page = page_size();
        let len = page + 11;
        let entries = 400u64;
        let map = align_map_size(entries * value_footprint(len, page));
        let store = FrameStore::create(&dir.path().join("s.lmdb"), map).unwrap();

        let value = vec![0x5Au8; len as usize];
        let mut batch = store.batch().unwrap();
        for i in 0..entries {
            batch.put(&format!("s_{entries}x1x1_{i:04}"), &value).unwrap();
        }
        batch.commit().unwrap();
        assert_eq!(store.len().unwrap(), entries);
    }

    #[test]
    fn uncommitted_batch_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let store = FrameStore::create(&dir.path().join("s.lmdb"), 1 << 20).unwrap();

        let mut batch = store.batch().unwrap();
        batch.put("a_1x1x1_0000", &[1, 2, 3]).unwrap();
        assert_eq!(batch.len(), 1);
        drop(batch);
        assert!(store.is_empty().unwrap());

        let mut batch = store.batch().unwrap();
        batch.put("a_1x1x1_0000", &[1, 2, 3]).unwrap();
        batch.commit().unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.get("a_1x1x1_0000").unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn open_requires_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            FrameStore::open(&dir.path().join("absent.lmdb")),
            Err(FrameDbError::Store(_))
        ));
    }
}
