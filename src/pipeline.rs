// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Driver: build the store if its directory is absent, then verify it.
//!
//! Existence of the store directory is the only idempotence check; its
//! contents are not inspected before verification.

use serde::Serialize;
use tracing::info;

use crate::builder::{self, BuildOptions, BuildReport};
use crate::config::Config;
use crate::dataset::Layout;
use crate::error::Result;
use crate::verifier::{self, VerifyOptions, VerifyReport};

#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// `None` when an existing store was found and left untouched.
    pub built: Option<BuildReport>,
    pub verified: VerifyReport,
}

pub fn run(layout: &Layout, config: &Config) -> Result<RunOutcome> {
    let store_dir = layout.store_dir();

    let built = if store_dir.exists() {
        info!(dataset = %layout.dataset, store = ?store_dir, "Dataset already exists");
        None
    } else {
        let opts = BuildOptions::new(layout.dataset, &layout.raw_dir(), &store_dir, &config.build);
        Some(builder::build_store(&opts)?)
    };

    let verify_opts = VerifyOptions::new(&config.verify);
    let verified = verifier::verify_store(layout.dataset, &store_dir, &verify_opts)?;
    Ok(RunOutcome { built, verified })
}
