//! LivingTool CLI - Command-line tool for Guardian's Crusade disc extraction.
//!
//! This is the main entry point for the LivingTool command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use livingtool::prelude::*;

/// LivingTool - Guardian's Crusade disc extraction tool
#[derive(Parser)]
#[command(name = "livingtool")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every file of a disc image into per-category folders
    Unpack {
        /// Path to the raw (2352-byte sector) disc image
        #[arg(short, long, env = "LIVINGTOOL_IMAGE")]
        image: PathBuf,

        /// Path to the disc index file
        #[arg(short = 'x', long, env = "LIVINGTOOL_INDEX")]
        index: PathBuf,

        /// Output directory
        #[arg(short, long, env = "LIVINGTOOL_OUTPUT")]
        output: PathBuf,

        /// Game executable to cut the index from before unpacking
        #[arg(long, requires_all = ["index_start", "index_end"])]
        exe: Option<PathBuf>,

        /// Start offset of the index inside the executable
        #[arg(long, value_parser = parse_offset)]
        index_start: Option<u64>,

        /// End offset (exclusive) of the index inside the executable
        #[arg(long, value_parser = parse_offset)]
        index_end: Option<u64>,

        /// JSON category table replacing the built-in one
        #[arg(short, long)]
        categories: Option<PathBuf>,
    },

    /// Cut the disc index out of the game executable
    Index {
        /// Game executable
        #[arg(short, long)]
        exe: PathBuf,

        /// Start offset of the index
        #[arg(short, long, value_parser = parse_offset)]
        start: u64,

        /// End offset (exclusive) of the index
        #[arg(short = 'E', long, value_parser = parse_offset)]
        end: u64,

        /// Output index file
        #[arg(short, long, env = "LIVINGTOOL_INDEX")]
        output: PathBuf,
    },

    /// Decode NPC data files
    Npc {
        /// Files or glob patterns
        #[arg(required = true)]
        files: Vec<String>,

        /// Print a JSON report instead of a listing
        #[arg(long)]
        json: bool,
    },

    /// Decode an enemy data file
    Enemy {
        /// Enemy file
        #[arg(short, long)]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let mut filter = EnvFilter::from_default_env();
    for directive in [
        "livingtool=info",
        "livingtool_disc=info",
        "livingtool_npc=info",
        "livingtool_enemy=info",
    ] {
        filter = filter.add_directive(directive.parse()?);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Unpack {
            image,
            index,
            output,
            exe,
            index_start,
            index_end,
            categories,
        } => {
            if let (Some(exe), Some(start), Some(end)) = (exe, index_start, index_end) {
                cmd_index(&exe, start, end, &index)?;
            }
            cmd_unpack(&image, &index, &output, categories.as_deref())?;
        }
        Commands::Index {
            exe,
            start,
            end,
            output,
        } => {
            cmd_index(&exe, start, end, &output)?;
        }
        Commands::Npc { files, json } => {
            cmd_npc(&files, json)?;
        }
        Commands::Enemy { file } => {
            cmd_enemy(&file)?;
        }
    }

    Ok(())
}

/// Parse a decimal or `0x`-prefixed hexadecimal offset.
fn parse_offset(value: &str) -> std::result::Result<u64, String> {
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| format!("invalid offset '{value}': {e}"))
}

fn cmd_index(exe: &Path, start: u64, end: u64, output: &Path) -> Result<()> {
    let data = extract_section(exe, start, end)
        .with_context(|| format!("Failed to read index from {}", exe.display()))?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, &data).context("Failed to write index file")?;

    info!(
        "Wrote {} index bytes ({} records) to {}",
        data.len(),
        data.len() / 8,
        output.display()
    );

    Ok(())
}

fn cmd_unpack(image: &Path, index: &Path, output: &Path, categories: Option<&Path>) -> Result<()> {
    println!("Opening disc image: {}", image.display());

    let image = DiscImage::open(image).context("Failed to open disc image")?;
    let table = match categories {
        Some(path) => CategoryTable::load(path).context("Failed to load category table")?,
        None => CategoryTable::builtin(),
    };

    let entries = IndexReader::open(index).context("Failed to open index file")?;
    let unpacker = Unpacker::new(image.as_bytes(), &table, output);
    let plan = unpacker.plan(entries).context("Failed to plan extraction")?;

    println!(
        "Extracting {} files from {} sectors...",
        plan.entries.len(),
        image.sector_count()
    );

    let pb = ProgressBar::new(plan.entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let summary = unpacker
        .execute(plan, |asset, _| {
            pb.set_message(asset.category.clone());
            pb.inc(1);
        })
        .context("Extraction failed")?;
    pb.finish_with_message("Done");

    println!(
        "Extracted {} files in {:?} ({} duplicates skipped, {} gaps)",
        summary.written,
        start.elapsed(),
        summary.duplicates,
        summary.gaps.len()
    );

    Ok(())
}

/// Expand glob patterns; arguments without a match are taken literally.
fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        let before = files.len();
        for path in glob::glob(pattern).with_context(|| format!("Invalid pattern '{pattern}'"))? {
            match path {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => warn!("Skipping {}: {}", e.path().display(), e),
            }
        }
        if files.len() == before {
            files.push(PathBuf::from(pattern));
        }
    }

    Ok(files)
}

fn cmd_npc(patterns: &[String], as_json: bool) -> Result<()> {
    let files = expand_patterns(patterns)?;

    let results: Vec<_> = files
        .par_iter()
        .map(|path| (path, NpcFile::open(path)))
        .collect();

    if as_json {
        let reports = results
            .iter()
            .map(|(path, result)| match result {
                Ok(npc) => serde_json::to_value(NpcReport::new(path.display().to_string(), npc)),
                Err(e) => Ok(json!({
                    "filePath": path.display().to_string(),
                    "error": e.to_string(),
                })),
            })
            .collect::<serde_json::Result<Vec<_>>>()?;
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    let mut failed = 0;
    for (path, result) in &results {
        match result {
            Ok(npc) => println!("{}", NpcReport::new(path.display().to_string(), npc)),
            Err(e) => {
                eprintln!("Error decoding {}: {}", path.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} files could not be read", failed, results.len());
    }

    Ok(())
}

fn cmd_enemy(file: &Path) -> Result<()> {
    let enemy = EnemyFile::open(file)
        .with_context(|| format!("Failed to decode enemy file {}", file.display()))?;
    print!("{enemy}");

    Ok(())
}
