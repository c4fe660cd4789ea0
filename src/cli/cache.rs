use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::catalog::cache::ComponentCache;
use crate::catalog::store::JsonCatalog;
use crate::cli::OutputFormat;

#[derive(Args)]
pub struct CacheArgs {
    /// Catalog export to snapshot
    #[arg(required = true)]
    pub catalog: PathBuf,

    /// Cache file to write
    #[arg(short, long, required = true)]
    pub output: PathBuf,
}

/// Execute cache subcommand
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or the cache not written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CacheArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let catalog = JsonCatalog::load_from_file(&args.catalog)
        .with_context(|| format!("Failed to load catalog {}", args.catalog.display()))?;

    if verbose {
        eprintln!("Loaded catalog with {} entries", catalog.len());
    }

    let cache = ComponentCache::refresh(&catalog)?;
    cache.save(&args.output)?;

    match format {
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "releases": cache.len(),
                "created_at": cache.created_at().to_rfc3339(),
                "output": args.output.display().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text | OutputFormat::Tsv => {
            println!(
                "Cached {} releases to {}",
                cache.len(),
                args.output.display()
            );
        }
    }

    Ok(())
}
