// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Store verifier: read back a few random entries and check them against
//! the dimensions encoded in their keys.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use crate::config::{ChannelOrder, VerifyConfig};
use crate::dataset::Dataset;
use crate::error::{FrameDbError, Result};
use crate::frame::Frame;
use crate::storage::key::FrameKey;
use crate::storage::meta::MetaInfo;
use crate::storage::store::FrameStore;

#[derive(Debug, Clone)]
pub struct VerifyOptions {
    pub samples: usize,
    pub seed: Option<u64>,
    /// Rendered files are always RGB, whatever order the store holds.
    pub render_dir: Option<PathBuf>,
}

impl VerifyOptions {
    pub fn new(cfg: &VerifyConfig) -> Self {
        Self {
            samples: cfg.samples,
            seed: cfg.seed,
            render_dir: cfg.render.then(|| cfg.render_dir.clone()),
        }
    }
}

/// Three samples, checked but not rendered.
impl Default for VerifyOptions {
    fn default() -> Self {
        Self { render_dir: None, ..Self::new(&VerifyConfig::default()) }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleReport {
    pub key: String,
    pub sequence_id: String,
    pub height: u32,
    pub width: u32,
    pub frame_index: usize,
    pub rendered: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub name: String,
    pub total_keys: usize,
    pub samples: Vec<SampleReport>,
}

/// Spot-check `opts.samples` uniformly drawn keys of the store at `store_dir`.
pub fn verify_store(dataset: Dataset, store_dir: &Path, opts: &VerifyOptions) -> Result<VerifyReport> {
    info!(dataset = %dataset, store = ?store_dir, "Checking frame store");

    let meta = MetaInfo::load(store_dir)?;
    if meta.name != dataset.name() {
        return Err(FrameDbError::DatasetMismatch {
            expected: dataset.name().to_string(),
            found: meta.name,
        });
    }
    let order = meta.channel_order()?;
    info!(keys = meta.keys.len(), channel_order = order.name(), "Metadata loaded");

    let store = FrameStore::open(store_dir)?;
    let mut rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut samples = Vec::with_capacity(opts.samples);
    if !meta.keys.is_empty() {
        for _ in 0..opts.samples {
            let key = &meta.keys[rng.gen_range(0..meta.keys.len())];
            samples.push(check_entry(&store, key, order, opts)?);
        }
    }

    Ok(VerifyReport { name: meta.name, total_keys: meta.keys.len(), samples })
}

/// Fetch one entry, validate its length against the key, and optionally render it.
/// `order` is the channel order the store was written in.
pub fn check_entry(
    store: &FrameStore,
    key: &str,
    order: ChannelOrder,
    opts: &VerifyOptions,
) -> Result<SampleReport> {
    let parsed: FrameKey = key.parse()?;
    info!(
        sequence = parsed.sequence_id,
        size = format!("{}x{}x3", parsed.height, parsed.width),
        frame = parsed.frame_index,
        "Sampled entry"
    );

    let value = store
        .get(key)?
        .ok_or_else(|| FrameDbError::MissingEntry { key: key.to_string() })?;
    if value.len() != parsed.expected_len() {
        return Err(FrameDbError::ShapeMismatch {
            key: key.to_string(),
            expected: parsed.expected_len(),
            actual: value.len(),
        });
    }
    let mut frame = Frame::from_raw(parsed.height, parsed.width, value)?;

    let rendered = match &opts.render_dir {
        Some(dir) => {
            if order == ChannelOrder::Bgr {
                frame.reverse_channels();
            }
            std::fs::create_dir_all(dir)?;
            let path = dir.join(render_file_name(key));
            frame.save(&path)?;
            Some(path)
        }
        None => None,
    };

    Ok(SampleReport {
        key: key.to_string(),
        sequence_id: parsed.sequence_id,
        height: parsed.height,
        width: parsed.width,
        frame_index: parsed.frame_index,
        rendered,
    })
}

/// File name for a rendered entry: path separators in the key become `_`.
pub fn render_file_name(key: &str) -> String {
    format!("{}.png", key.replace('/', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_names_flatten_separators() {
        assert_eq!(render_file_name("seq01_3x64x64_0000"), "seq01_3x64x64_0000.png");
        assert_eq!(render_file_name("clip/a_1x2x2_0000"), "clip_a_1x2x2_0000.png");
    }

    #[test]
    fn short_value_is_shape_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let store = FrameStore::create(dir.path(), 1 << 20).unwrap();
        let mut batch = store.batch().unwrap();
        batch.put("s_1x2x2_0000", &[0u8; 11]).unwrap();
        batch.commit().unwrap();

        let err = check_entry(&store, "s_1x2x2_0000", ChannelOrder::Rgb, &VerifyOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            FrameDbError::ShapeMismatch { expected: 12, actual: 11, .. }
        ));
    }

    #[test]
    fn absent_value_is_missing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = FrameStore::create(dir.path(), 1 << 20).unwrap();
        let err = check_entry(&store, "s_1x2x2_0000", ChannelOrder::Rgb, &VerifyOptions::default())
            .unwrap_err();
        assert!(matches!(err, FrameDbError::MissingEntry { .. }));
    }

    #[test]
    fn render_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let store_dir = dir.path().join("s.lmdb");
        let render_dir = dir.path().join("out");
        let store = FrameStore::create(&store_dir, 1 << 20).unwrap();
        let mut batch = store.batch().unwrap();
        batch.put("s_1x2x3_0000", &[7u8; 18]).unwrap();
        batch.commit().unwrap();

        let opts = VerifyOptions { render_dir: Some(render_dir.clone()), ..VerifyOptions::default() };
        let sample = check_entry(&store, "s_1x2x3_0000", ChannelOrder::Rgb, &opts).unwrap();
        let path = sample.rendered.unwrap();
        assert_eq!(path, render_dir.join("s_1x2x3_0000.png"));

        let back = Frame::decode(&path).unwrap();
        assert_eq!((back.height, back.width), (2, 3));
        assert_eq!(back.as_bytes(), &[7u8; 18]);
    }
}
