// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Store builder: raw PNG sequences -> LMDB frame store + metadata record.
//!
//! ```text
//! raw_dir/<seq>/*.png ──decode──▶ Frame ──key──▶ WriteBatch ──▶ <store>/data.mdb
//!                                                   │ commit every N sequences
//!                                                   ▼
//!                                            <store>/meta_info.pkl
//! ```
//!
//! There is no rollback: a failure part-way leaves the batches committed so
//! far in place and no metadata record.

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{BuildConfig, ChannelOrder};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::frame::Frame;
use crate::scan;
use crate::storage::key::FrameKey;
use crate::storage::meta::MetaInfo;
use crate::storage::store::FrameStore;

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub dataset: Dataset,
    pub raw_dir: PathBuf,
    pub store_dir: PathBuf,
    pub filter_file: Option<PathBuf>,
    pub commit_every: usize,
    pub capacity_margin: f64,
    pub channel_order: ChannelOrder,
    pub progress: bool,
}

impl BuildOptions {
    pub fn new(dataset: Dataset, raw_dir: &Path, store_dir: &Path, cfg: &BuildConfig) -> Self {
        Self {
            dataset,
            raw_dir: raw_dir.to_path_buf(),
            store_dir: store_dir.to_path_buf(),
            filter_file: cfg.filter_file.clone(),
            commit_every: cfg.commit_every.max(1),
            capacity_margin: cfg.capacity_margin,
            channel_order: cfg.channel_order,
            progress: cfg.progress,
        }
    }
}

/// Summary of a finished build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub dataset: String,
    pub sequences: usize,
    pub frames: usize,
    /// Estimated payload used to size the map.
    pub planned_bytes: u64,
    /// Pixel bytes actually written.
    pub written_bytes: u64,
    pub map_size: u64,
    pub keys: Vec<String>,
}

/// Pack every selected sequence of `opts.raw_dir` into a new store at
/// `opts.store_dir`, then write its metadata record.
pub fn build_store(opts: &BuildOptions) -> Result<BuildReport> {
    info!(dataset = %opts.dataset, raw_dir = ?opts.raw_dir, "Creating frame store");

    let sequences = scan::list_sequences(&opts.raw_dir, opts.filter_file.as_deref())?;
    info!(sequences = sequences.len(), "Sequences selected");

    let plan = scan::plan_capacity(&opts.raw_dir, &sequences, opts.capacity_margin)?;
    info!(
        payload_gb = format!("{:.2}", plan.payload_bytes as f64 / (1u64 << 30) as f64),
        alloc_gb = format!("{:.2}", plan.alloc_bytes as f64 / (1u64 << 30) as f64),
        "Space to allocate"
    );

    let store = FrameStore::create(&opts.store_dir, plan.map_size())?;
    let progress = progress_bar(opts.progress, sequences.len());

    let mut keys: Vec<String> = Vec::new();
    let mut written_bytes: u64 = 0;
    let mut batch = store.batch()?;

    for (b, seq) in sequences.iter().enumerate() {
        progress.set_message(seq.clone());
        let frames = scan::list_frames(&opts.raw_dir, seq)?;
        let n_frames = frames.len();
        let mut first_len: Option<usize> = None;

        for (i, path) in frames.iter().enumerate() {
            let mut frame = Frame::decode(path)?;
            if opts.channel_order == ChannelOrder::Bgr {
                frame.reverse_channels();
            }
            match first_len {
                None => first_len = Some(frame.nbytes()),
                Some(len) if len != frame.nbytes() => warn!(
                    sequence = seq,
                    frame = i,
                    bytes = frame.nbytes(),
                    first_frame_bytes = len,
                    "Frame size differs from first frame; capacity estimate may be short"
                ),
                Some(_) => {}
            }

            let key = FrameKey::new(seq, n_frames, frame.height, frame.width, i)?.to_string();
            batch.put(&key, frame.as_bytes())?;
            written_bytes += frame.nbytes() as u64;
            debug!(key = key, bytes = frame.nbytes(), "Frame written");
            keys.push(key);
        }

        if b % opts.commit_every == 0 {
            batch.commit()?;
            batch = store.batch()?;
        }
        progress.inc(1);
    }
    batch.commit()?;
    progress.finish_and_clear();

    let report = BuildReport {
        dataset: opts.dataset.name().to_string(),
        sequences: sequences.len(),
        frames: keys.len(),
        planned_bytes: plan.payload_bytes,
        written_bytes,
        map_size: plan.map_size(),
        keys,
    };
    drop(store);

    MetaInfo::new(opts.dataset, report.keys.clone())
        .with_channel_order(opts.channel_order)
        .save(&opts.store_dir)?;
    info!(
        sequences = report.sequences,
        frames = report.frames,
        written_mb = report.written_bytes / 1_048_576,
        "Frame store complete"
    );
    Ok(report)
}

fn progress_bar(enabled: bool, len: usize) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    pb
}
