// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! framedb: pack PNG frame sequences into an LMDB store
//!
//! Usage:
//!   framedb run    --dataset VimeoTecoGAN --data-type GT    # build if absent, then check
//!   framedb build  --dataset VimeoTecoGAN --data-type GT
//!   framedb verify --dataset VimeoTecoGAN --data-type GT --render-dir out

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use framedb::builder::{self, BuildOptions};
use framedb::config::Config;
use framedb::dataset::{DataType, Dataset, Layout};
use framedb::pipeline;
use framedb::verifier::{self, VerifyOptions, VerifyReport};

#[derive(Parser)]
#[command(name = "framedb", about = "Video frame LMDB packer", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the store unless it already exists, then verify it.
    Run {
        #[command(flatten)]
        target: Target,
        #[command(flatten)]
        verify: VerifyArgs,
    },
    /// Build the store. Fails if the store directory already exists.
    Build {
        #[command(flatten)]
        target: Target,
        /// File listing the sequence ids to pack, one per line.
        #[arg(long)]
        filter_file: Option<PathBuf>,
    },
    /// Spot-check random entries of an existing store.
    Verify {
        #[command(flatten)]
        target: Target,
        #[command(flatten)]
        verify: VerifyArgs,
    },
}

#[derive(Args)]
struct Target {
    /// VimeoTecoGAN or VimeoTecoGAN-sub
    #[arg(long)]
    dataset: String,
    /// GT or Bicubic4xLR
    #[arg(long)]
    data_type: String,
    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overrides `data_root` from the configuration.
    #[arg(long)]
    data_root: Option<PathBuf>,
    /// Hide the progress bar.
    #[arg(long)]
    no_progress: bool,
}

#[derive(Args)]
struct VerifyArgs {
    /// Number of random entries to check.
    #[arg(long)]
    samples: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// Write each sampled frame as `<key>.png` into this directory (default: `.`).
    #[arg(long, conflicts_with = "no_render")]
    render_dir: Option<PathBuf>,
    /// Check sampled entries without writing them out.
    #[arg(long)]
    no_render: bool,
    /// Print the verification report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run { target, verify } => run_pipeline(target, verify),
        Command::Build { target, filter_file } => run_build(target, filter_file),
        Command::Verify { target, verify } => run_verify(target, verify),
    };

    if let Err(e) = result {
        error!(error = format!("{e:#}"), "framedb failed");
        std::process::exit(1);
    }
}

fn load(target: &Target) -> anyhow::Result<(Layout, Config)> {
    let dataset: Dataset = target.dataset.parse()?;
    let data_type = DataType::new(target.data_type.as_str())?;

    let mut cfg = match &target.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(root) = &target.data_root {
        cfg.data_root = root.clone();
    }
    if target.no_progress {
        cfg.build.progress = false;
    }

    Ok((Layout::new(&cfg.data_root, dataset, data_type), cfg))
}

fn apply_verify_args(cfg: &mut Config, args: &VerifyArgs) {
    if let Some(n) = args.samples {
        cfg.verify.samples = n;
    }
    if args.seed.is_some() {
        cfg.verify.seed = args.seed;
    }
    if let Some(dir) = &args.render_dir {
        cfg.verify.render = true;
        cfg.verify.render_dir = dir.clone();
    }
    if args.no_render {
        cfg.verify.render = false;
    }
}

fn run_pipeline(target: Target, args: VerifyArgs) -> anyhow::Result<()> {
    let (layout, mut cfg) = load(&target)?;
    apply_verify_args(&mut cfg, &args);

    let outcome = pipeline::run(&layout, &cfg)?;
    if let Some(built) = &outcome.built {
        info!(frames = built.frames, map_size = built.map_size, "Build finished");
    }
    report(&outcome.verified, args.json)
}

fn run_build(target: Target, filter_file: Option<PathBuf>) -> anyhow::Result<()> {
    let (layout, mut cfg) = load(&target)?;
    if filter_file.is_some() {
        cfg.build.filter_file = filter_file;
    }

    let store_dir = layout.store_dir();
    if store_dir.exists() {
        bail!("store {} already exists", store_dir.display());
    }
    let opts = BuildOptions::new(layout.dataset, &layout.raw_dir(), &store_dir, &cfg.build);
    let built = builder::build_store(&opts)?;
    println!("Sequences   : {}", built.sequences);
    println!("Frames      : {}", built.frames);
    println!("Written     : {:.2} GB", built.written_bytes as f64 / (1u64 << 30) as f64);
    println!("Map size    : {:.2} GB", built.map_size as f64 / (1u64 << 30) as f64);
    println!("Store       : {}", store_dir.display());
    Ok(())
}

fn run_verify(target: Target, args: VerifyArgs) -> anyhow::Result<()> {
    let (layout, mut cfg) = load(&target)?;
    apply_verify_args(&mut cfg, &args);

    let opts = VerifyOptions::new(&cfg.verify);
    let verified = verifier::verify_store(layout.dataset, &layout.store_dir(), &opts)?;
    report(&verified, args.json)
}

fn report(verified: &VerifyReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(verified)?);
        return Ok(());
    }
    println!("=== {} ===", verified.name);
    println!("Number of keys: {}", verified.total_keys);
    for s in &verified.samples {
        println!(
            "video index: {} | size: ({}, {}, 3) | # of frame: {:04}",
            s.sequence_id, s.height, s.width, s.frame_index
        );
        if let Some(path) = &s.rendered {
            println!("  rendered -> {}", path.display());
        }
    }
    Ok(())
}
