use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rootcause::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use iconhash::cache_index::CacheIndex;
use iconhash::catalog::json::read_catalog;
use iconhash::hash::HashedItems;
use iconhash::{Catalog, ItemHasher};

/// Compute icon cache fingerprints for Escape from Tarkov items
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Item database snapshot (items.json)
    #[clap(long)]
    items: PathBuf,

    /// Game preset snapshot holding each preset's parts
    #[clap(long)]
    presets: PathBuf,

    /// Preset listing that names presets and flags defaults
    #[clap(long)]
    preset_listing: PathBuf,

    /// Icon cache index.json to resolve fingerprints to icon files
    #[clap(short, long)]
    cache_index: Option<PathBuf>,

    /// Print results as JSON
    #[clap(long)]
    json: bool,

    /// Item ids to hash. Every item in the database is hashed when omitted.
    ids: Vec<String>,
}

#[derive(Debug, Serialize)]
struct HashRow {
    id: String,
    hash: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

fn open(path: &Path) -> Result<BufReader<File>, Report> {
    let file = File::open(path).context_with(|| format!("Failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn load_catalog(args: &Args) -> Result<Catalog, Report> {
    let catalog = read_catalog(
        open(&args.items)?,
        open(&args.presets)?,
        open(&args.preset_listing)?,
    )
    .context("Failed to read catalogs")?;
    Ok(catalog)
}

fn hash_in_parallel(hasher: &ItemHasher, ids: &[String]) -> HashedItems {
    let progress = ProgressBar::new(ids.len() as u64).with_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let results: Vec<_> = ids
        .par_iter()
        .progress_with(progress)
        .map(|id| (id.as_str(), hasher.item_hash(id)))
        .collect();

    let mut hashed = HashedItems::default();
    for (id, result) in results {
        match result {
            Ok(hash) => hashed.insert(id, hash),
            Err(err) => {
                warn!(item = id, "error hashing item: {err}");
                hashed.failures.push((id.to_string(), err));
            }
        }
    }
    hashed
}

fn main() -> Result<(), Report> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let catalog = load_catalog(&args)?;
    let cache_index = match &args.cache_index {
        Some(path) => Some(
            CacheIndex::from_reader(open(path)?).context("Failed to read icon cache index")?,
        ),
        None => None,
    };

    let mut ids = args.ids.clone();
    if ids.is_empty() {
        ids = catalog.items().map(|item| item.id().to_string()).collect();
        ids.sort();
    }

    let hasher = ItemHasher::new(catalog);
    let hashed = hash_in_parallel(&hasher, &ids);
    let catalog = hasher.catalog()?;

    let mut rows: Vec<HashRow> = hashed
        .by_hash
        .iter()
        .map(|(&hash, id)| HashRow {
            id: id.clone(),
            hash,
            icon: cache_index
                .as_ref()
                .and_then(|index| index.icon_file_name(hash)),
            name: catalog.display_name(id),
        })
        .collect();
    rows.sort_by(|a, b| a.id.cmp(&b.id));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &rows)?;
        writeln!(out)?;
    } else {
        for row in &rows {
            writeln!(
                out,
                "{}\t{}\t{}\t{}",
                row.id,
                row.hash,
                row.icon.as_deref().unwrap_or("-"),
                row.name.as_deref().unwrap_or("")
            )?;
        }
    }

    info!(
        hashed = rows.len(),
        failed = hashed.failures.len(),
        "finished hashing"
    );
    if cache_index.is_some() {
        let missing = rows.iter().filter(|row| row.icon.is_none()).count();
        info!(missing, "items without a cached icon");
    }

    Ok(())
}
