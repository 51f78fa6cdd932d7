// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Raw directory scanning and store capacity planning.

use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::debug;

use crate::error::{FrameDbError, Result};
use crate::frame::Frame;
use crate::storage::store;

/// Sequence ids to pack, sorted.
///
/// With a filter file, its non-blank trimmed lines are used; otherwise every
/// sub-directory of `raw_dir`.
pub fn list_sequences(raw_dir: &Path, filter_file: Option<&Path>) -> Result<Vec<String>> {
    let mut seqs = match filter_file {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| {
                FrameDbError::Config(format!("Cannot read filter file {path:?}: {e}"))
            })?;
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        }
        None => {
            let mut names = Vec::new();
            for entry in std::fs::read_dir(raw_dir)? {
                let entry = entry?;
                if !entry.file_type()?.is_dir() {
                    continue;
                }
                let name = entry.file_name().into_string().map_err(|n| {
                    FrameDbError::Config(format!("sequence directory {n:?} is not UTF-8"))
                })?;
                names.push(name);
            }
            names
        }
    };
    seqs.sort();
    Ok(seqs)
}

/// Sorted `*.png` frame paths of one sequence.
pub fn list_frames(raw_dir: &Path, sequence_id: &str) -> Result<Vec<PathBuf>> {
    let seq_dir = raw_dir.join(sequence_id);
    let dir_str = seq_dir.to_str().ok_or_else(|| {
        FrameDbError::Config(format!("sequence path {seq_dir:?} is not UTF-8"))
    })?;
    let pattern = format!("{}/*.png", Pattern::escape(dir_str));

    let mut frames = glob::glob(&pattern)
        .map_err(|e| FrameDbError::Config(format!("bad frame pattern {pattern}: {e}")))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| FrameDbError::Io(e.into()))?;
    frames.sort();

    if frames.is_empty() {
        return Err(FrameDbError::EmptySequence { id: sequence_id.to_string() });
    }
    Ok(frames)
}

/// Storage estimate for a set of sequences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityPlan {
    /// Estimated raw pixel bytes to be written.
    pub payload_bytes: u64,
    /// `payload_bytes` scaled by the safety margin.
    pub alloc_bytes: u64,
    /// Estimated map bytes once values are laid out in LMDB pages.
    pub paged_bytes: u64,
}

impl CapacityPlan {
    /// `margin` scales the payload; the paged footprint is taken as is.
    /// Halves round to even.
    pub fn new(payload_bytes: u64, paged_bytes: u64, margin: f64) -> Self {
        let alloc_bytes = (payload_bytes as f64 * margin).round_ties_even() as u64;
        Self { payload_bytes, alloc_bytes: alloc_bytes.max(payload_bytes), paged_bytes }
    }

    /// LMDB map size: the larger of `alloc_bytes` and the paged footprint,
    /// rounded up to the store's alignment.
    pub fn map_size(&self) -> u64 {
        store::align_map_size(self.alloc_bytes.max(self.paged_bytes))
    }
}

/// Estimate storage from the first frame of each sequence times its frame
/// count. Assumes all frames of a sequence share one size.
pub fn plan_capacity(raw_dir: &Path, sequences: &[String], margin: f64) -> Result<CapacityPlan> {
    let page = store::page_size();
    let mut payload: u64 = 0;
    let mut paged: u64 = 0;
    for seq in sequences {
        let frames = list_frames(raw_dir, seq)?;
        let per_frame = Frame::decode(&frames[0])?.nbytes() as u64;
        debug!(sequence = seq, frames = frames.len(), bytes_per_frame = per_frame, "Sized sequence");
        payload += per_frame * frames.len() as u64;
        paged += store::value_footprint(per_frame, page) * frames.len() as u64;
    }
    Ok(CapacityPlan::new(payload, paged, margin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn sequences_from_directory_are_sorted_dirs_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["seq_b", "seq_a", "seq_c"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("README.txt"), "not a sequence").unwrap();

        let seqs = list_sequences(dir.path(), None).unwrap();
        assert_eq!(seqs, vec!["seq_a", "seq_b", "seq_c"]);
    }

    #[test]
    fn sequences_from_filter_file() {
        let dir = tempfile::tempdir().unwrap();
        let filter = dir.path().join("keep.txt");
        fs::write(&filter, "  zeta \n\nalpha\n beta\n").unwrap();

        let seqs = list_sequences(dir.path(), Some(&filter)).unwrap();
        assert_eq!(seqs, vec!["alpha", "beta", "zeta"]);
    }

    #[test]
    fn frames_sorted_png_only() {
        let dir = tempfile::tempdir().unwrap();
        let seq = dir.path().join("s[1]");
        fs::create_dir(&seq).unwrap();
        for name in ["0002.png", "0000.png", "0001.png", "notes.txt"] {
            fs::write(seq.join(name), b"").unwrap();
        }

        let frames = list_frames(dir.path(), "s[1]").unwrap();
        let names: Vec<_> = frames
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["0000.png", "0001.png", "0002.png"]);
    }

    #[test]
    fn empty_sequence_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();
        assert!(matches!(
            list_frames(dir.path(), "empty"),
            Err(FrameDbError::EmptySequence { id }) if id == "empty"
        ));
    }

    #[test]
    fn capacity_plan_margin() {
        let plan = CapacityPlan::new(1000, 0, 1.5);
        assert_eq!(plan.alloc_bytes, 1500);
        assert!(plan.map_size() >= plan.alloc_bytes);

        assert_eq!(CapacityPlan::new(3, 0, 1.5).alloc_bytes, 4);
        assert_eq!(CapacityPlan::new(5, 0, 1.5).alloc_bytes, 8);
    }

    #[test]
    fn map_size_covers_paged_footprint() {
        let page = 4096;
        let frames = 600;
        let per_frame = 37 * 37 * 3;
        let paged = store::value_footprint(per_frame, page) * frames;
        let plan = CapacityPlan::new(per_frame * frames, paged, 1.5);

        assert!(plan.alloc_bytes < frames * 2 * page);
        assert!(plan.map_size() >= frames * 2 * page);
        assert!(plan.map_size() > store::MAP_SIZE_ALIGN);
    }
}
