// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Metadata record: `meta_info.pkl` next to the LMDB files.
//!
//! Pickled as a dict `{"name": str, "keys": [str, ...]}` so that Python
//! data loaders can read it with a plain `pickle.load`. `keys` is in write
//! order, which is not necessarily sorted.
//!
//! Stores written in BGR order add `"channel_order": "bgr"`; RGB stores keep
//! the two-field layout.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_pickle::{DeOptions, SerOptions};

use crate::config::ChannelOrder;
use crate::dataset::Dataset;
use crate::error::{FrameDbError, Result};

pub const META_FILE: &str = "meta_info.pkl";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaInfo {
    pub name: String,
    pub keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_order: Option<String>,
}

impl MetaInfo {
    pub fn new(dataset: Dataset, keys: Vec<String>) -> Self {
        Self { name: dataset.name().to_string(), keys, channel_order: None }
    }

    /// Record the byte order of stored pixels.
    pub fn with_channel_order(mut self, order: ChannelOrder) -> Self {
        self.channel_order = match order {
            ChannelOrder::Rgb => None,
            order => Some(order.name().to_string()),
        };
        self
    }

    /// Byte order of stored pixels; records without the field are RGB.
    pub fn channel_order(&self) -> Result<ChannelOrder> {
        match self.channel_order.as_deref() {
            None => Ok(ChannelOrder::Rgb),
            Some(name) => ChannelOrder::from_name(name).ok_or_else(|| {
                FrameDbError::Config(format!("unknown channel order '{name}' in {META_FILE}"))
            }),
        }
    }

    pub fn path(store_dir: &Path) -> PathBuf {
        store_dir.join(META_FILE)
    }

    pub fn save(&self, store_dir: &Path) -> Result<()> {
        let mut w = BufWriter::new(File::create(Self::path(store_dir))?);
        serde_pickle::to_writer(&mut w, self, SerOptions::new())?;
        w.flush()?;
        Ok(())
    }

    pub fn load(store_dir: &Path) -> Result<Self> {
        let r = BufReader::new(File::open(Self::path(store_dir))?);
        Ok(serde_pickle::from_reader(r, DeOptions::new())?)
    }

    /// The dataset named by the record; fails for names this build does not know.
    pub fn dataset(&self) -> Result<Dataset> {
        self.name.parse()
    }
}
