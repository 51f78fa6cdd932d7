// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Dataset identity and the on-disk directory convention.
//!
//! ```text
//! <data_root>/<dataset>/<data_type>/<sequence_id>/*.png   raw frames
//! <data_root>/<dataset>/<data_type>.lmdb/                 frame store
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{FrameDbError, Result};

/// The datasets this tool knows how to pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    VimeoTecoGan,
    VimeoTecoGanSub,
}

impl Dataset {
    pub const ALL: [Dataset; 2] = [Dataset::VimeoTecoGan, Dataset::VimeoTecoGanSub];

    /// Canonical name, as written into the metadata record and used for
    /// directory naming.
    pub fn name(self) -> &'static str {
        match self {
            Dataset::VimeoTecoGan => "VimeoTecoGAN",
            Dataset::VimeoTecoGanSub => "VimeoTecoGAN-sub",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dataset {
    type Err = FrameDbError;

    fn from_str(s: &str) -> Result<Self> {
        Dataset::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| FrameDbError::UnsupportedDataset(s.to_string()))
    }
}

/// Frame-set flavour inside a dataset, e.g. `GT` or `Bicubic4xLR`.
/// Only used to pick the source and destination directory names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataType(String);

impl DataType {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(FrameDbError::Config("data type must not be empty".into()));
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(FrameDbError::Config(format!(
                "data type '{name}' is not a plain directory name"
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolved source/destination paths for one (dataset, data type) pair.
#[derive(Debug, Clone)]
pub struct Layout {
    pub data_root: PathBuf,
    pub dataset: Dataset,
    pub data_type: DataType,
}

impl Layout {
    pub fn new(data_root: &Path, dataset: Dataset, data_type: DataType) -> Self {
        Self { data_root: data_root.to_path_buf(), dataset, data_type }
    }

    /// Directory holding one sub-directory per sequence.
    pub fn raw_dir(&self) -> PathBuf {
        self.data_root.join(self.dataset.name()).join(self.data_type.as_str())
    }

    /// LMDB environment directory (also holds `meta_info.pkl`).
    pub fn store_dir(&self) -> PathBuf {
        self.data_root
            .join(self.dataset.name())
            .join(format!("{}.lmdb", self.data_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_datasets() {
        assert_eq!("VimeoTecoGAN".parse::<Dataset>().unwrap(), Dataset::VimeoTecoGan);
        assert_eq!(
            "VimeoTecoGAN-sub".parse::<Dataset>().unwrap(),
            Dataset::VimeoTecoGanSub
        );
    }

    #[test]
    fn rejects_unknown_dataset() {
        let err = "Vimeo90K".parse::<Dataset>().unwrap_err();
        assert!(matches!(err, FrameDbError::UnsupportedDataset(name) if name == "Vimeo90K"));
        // Case matters: names are written verbatim into the metadata record.
        assert!("vimeotecogan".parse::<Dataset>().is_err());
    }

    #[test]
    fn data_type_must_be_plain_name() {
        assert!(DataType::new("GT").is_ok());
        assert!(DataType::new("").is_err());
        assert!(DataType::new("a/b").is_err());
        assert!(DataType::new("..").is_err());
    }

    #[test]
    fn layout_paths() {
        let layout = Layout::new(
            Path::new("data"),
            Dataset::VimeoTecoGanSub,
            DataType::new("Bicubic4xLR").unwrap(),
        );
        assert_eq!(layout.raw_dir(), Path::new("data/VimeoTecoGAN-sub/Bicubic4xLR"));
        assert_eq!(
            layout.store_dir(),
            Path::new("data/VimeoTecoGAN-sub/Bicubic4xLR.lmdb")
        );
    }
}
