// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::error::{FrameDbError, Result};

/// Top-level configuration loaded from a TOML file. Every field has a
/// default, so an absent file is equivalent to `Config::default()`.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Root under which `<dataset>/<data_type>` directories live.
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,
    /// Store builder parameters.
    #[serde(default)]
    pub build: BuildConfig,
    /// Store verifier parameters.
    #[serde(default)]
    pub verify: VerifyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            build: BuildConfig::default(),
            verify: VerifyConfig::default(),
        }
    }
}

/// Byte order of the three channels in stored values.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

impl ChannelOrder {
    pub fn name(self) -> &'static str {
        match self {
            ChannelOrder::Rgb => "rgb",
            ChannelOrder::Bgr => "bgr",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [ChannelOrder::Rgb, ChannelOrder::Bgr].into_iter().find(|o| o.name() == name)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BuildConfig {
    /// Commit the write transaction after every N-th sequence.
    #[serde(default = "default_commit_every")]
    pub commit_every: usize,
    /// Multiplier applied to the estimated payload when sizing the map.
    #[serde(default = "default_capacity_margin")]
    pub capacity_margin: f64,
    /// Optional file listing the sequence ids to pack, one per line.
    #[serde(default)]
    pub filter_file: Option<PathBuf>,
    #[serde(default)]
    pub channel_order: ChannelOrder,
    /// Draw a progress bar on stderr.
    #[serde(default = "default_progress")]
    pub progress: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            commit_every: default_commit_every(),
            capacity_margin: default_capacity_margin(),
            filter_file: None,
            channel_order: ChannelOrder::default(),
            progress: default_progress(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct VerifyConfig {
    /// Number of random entries to spot-check.
    #[serde(default = "default_samples")]
    pub samples: usize,
    /// Fixed RNG seed; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Write each sampled frame as `<key>.png`.
    #[serde(default = "default_render")]
    pub render: bool,
    /// Directory rendered frames are written to.
    #[serde(default = "default_render_dir")]
    pub render_dir: PathBuf,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            seed: None,
            render: default_render(),
            render_dir: default_render_dir(),
        }
    }
}

fn default_data_root() -> PathBuf { PathBuf::from("data") }
fn default_commit_every() -> usize { 5 }
fn default_capacity_margin() -> f64 { 1.5 }
fn default_progress() -> bool { true }
fn default_samples() -> usize { 3 }
fn default_render() -> bool { true }
fn default_render_dir() -> PathBuf { PathBuf::from(".") }

impl Config {
    /// Load configuration from a TOML file at `path`.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FrameDbError::Config(format!("Cannot read config file: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| FrameDbError::Config(format!("Invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.build.commit_every == 0 {
            return Err(FrameDbError::Config("commit_every must be > 0".into()));
        }
        if !self.build.capacity_margin.is_finite() || self.build.capacity_margin < 1.0 {
            return Err(FrameDbError::Config("capacity_margin must be >= 1.0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg.data_root, PathBuf::from("data"));
        assert_eq!(cfg.build.commit_every, 5);
        assert_eq!(cfg.build.capacity_margin, 1.5);
        assert_eq!(cfg.build.channel_order, ChannelOrder::Rgb);
        assert_eq!(cfg.verify.samples, 3);
        assert!(cfg.verify.render);
        assert_eq!(cfg.verify.render_dir, PathBuf::from("."));
    }

    #[test]
    fn overrides_are_read() {
        let cfg = Config::from_toml(
            r#"
            data_root = "/mnt/vsr"
            [build]
            commit_every = 10
            channel_order = "bgr"
            filter_file = "keep.txt"
            [verify]
            samples = 8
            seed = 42
            render = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.data_root, PathBuf::from("/mnt/vsr"));
        assert_eq!(cfg.build.commit_every, 10);
        assert_eq!(cfg.build.channel_order, ChannelOrder::Bgr);
        assert_eq!(cfg.build.filter_file, Some(PathBuf::from("keep.txt")));
        assert_eq!(cfg.verify.samples, 8);
        assert_eq!(cfg.verify.seed, Some(42));
        assert!(!cfg.verify.render);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_toml("[build]\ncommit_every = 0").is_err());
        assert!(Config::from_toml("[build]\ncapacity_margin = 0.9").is_err());
        assert!(Config::from_toml("data_root = 3").is_err());
    }
}
