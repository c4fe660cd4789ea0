//! Command-line interface for bom-mapper.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **map**: Map the components of a BOM onto catalog releases
//! - **cache**: Write the component cache from a catalog export
//!
//! ## Usage
//!
//! ```text
//! # Build the component cache once
//! bom-mapper cache catalog.json -o releases.cache.json
//!
//! # Map offline against the cache
//! bom-mapper map bom.json --cache releases.cache.json -o mapped.json
//!
//! # Map with live catalog lookups, JSON report for scripting
//! bom-mapper map bom.json --catalog catalog.json --online --format json
//!
//! # Only list the components still lacking a full match
//! bom-mapper map bom.json --cache releases.cache.json --mode not-found
//! ```

use clap::{Parser, Subcommand};

pub mod cache;
pub mod map;

#[derive(Parser)]
#[command(name = "bom-mapper")]
#[command(version)]
#[command(about = "Map bill-of-materials components onto release catalog entries")]
#[command(
    long_about = "bom-mapper reconciles the components of a bill of materials with the releases of a catalog.\n\nEach component is matched by package-url, catalog id, name and version, file hash, file name and optionally by name alone or name similarity, and classified by the strongest evidence found."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Map BOM components onto catalog releases
    Map(map::MapArgs),

    /// Write the component cache from a catalog export
    Cache(cache::CacheArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
