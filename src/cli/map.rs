use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use crate::catalog::cache::{CacheConfig, ComponentCache, DEFAULT_MAX_AGE_DAYS};
use crate::catalog::client::Catalog;
use crate::catalog::store::JsonCatalog;
use crate::cli::OutputFormat;
use crate::core::descriptor::ComponentDescriptor;
use crate::core::types::MatchCode;
use crate::matching::assembler::{MapMode, MappedComponent, MappingReport, ResultAssembler};
use crate::matching::engine::{MatchingConfig, MatchingContext, MatchingEngine};
use crate::utils::validation::check_component_limit;

#[derive(Args)]
pub struct MapArgs {
    /// BOM file: a JSON array of components
    #[arg(required = true)]
    pub input: PathBuf,

    /// Catalog export used for online lookups and to build the cache
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Component cache file (created or refreshed from --catalog when needed)
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Look releases up in the catalog instead of the cache
    #[arg(long)]
    pub online: bool,

    /// Rebuild the cache even if it is recent
    #[arg(long)]
    pub refresh_cache: bool,

    /// Refresh the cache when it is older than this many days
    #[arg(long, default_value_t = DEFAULT_MAX_AGE_DAYS)]
    pub cache_max_age_days: i64,

    /// Keep candidates that only match by name
    #[arg(long)]
    pub allow_name_only: bool,

    /// Also look for components with similar names
    #[arg(long)]
    pub similar: bool,

    /// Ignore Debian epochs and "debian" suffixes in versions
    #[arg(long)]
    pub relaxed_debian: bool,

    /// Only keep candidates that have a clearing result
    #[arg(long)]
    pub require_clearing: bool,

    /// Which components to report and write
    #[arg(long, value_enum, default_value = "all")]
    pub mode: MapMode,

    /// JSON file with matching options; flags given here are added on top
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the mapped BOM to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute map subcommand
///
/// # Errors
///
/// Returns an error if an input cannot be read, no data source is available
/// or a catalog query fails.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: MapArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let descriptors = load_bom(&args.input)?;
    let config = build_config(&args)?;

    if verbose {
        eprintln!("Loaded {} components from {}", descriptors.len(), args.input.display());
    }

    let catalog = args
        .catalog
        .as_deref()
        .map(JsonCatalog::load_from_file)
        .transpose()
        .context("Failed to load catalog")?;
    if verbose {
        if let Some(catalog) = &catalog {
            eprintln!("Loaded catalog with {} entries", catalog.len());
        }
    }
    let catalog_ref = catalog.as_ref().map(|c| c as &dyn Catalog);

    let cache = match &args.cache {
        Some(path) => {
            let cache_config = CacheConfig {
                path: path.clone(),
                max_age_days: args.cache_max_age_days,
                force_refresh: args.refresh_cache,
            };
            ComponentCache::load_or_refresh(&cache_config, catalog_ref)?
        }
        // Offline without a cache file: snapshot the catalog in memory
        None if !config.online => catalog_ref.map(ComponentCache::refresh).transpose()?,
        None => None,
    };
    if verbose {
        if let Some(cache) = &cache {
            eprintln!(
                "Using component cache with {} releases from {}",
                cache.len(),
                cache.created_at().to_rfc3339()
            );
        }
    }

    let live_catalog = if config.online { catalog_ref } else { None };
    let mut context = MatchingContext::new(live_catalog, cache);
    let engine = MatchingEngine::new(config);
    let results = engine.map_bom(&mut context, &descriptors)?;

    let report = ResultAssembler::new(args.mode).assemble(&results);

    if let Some(output) = &args.output {
        let mapped: Vec<&ComponentDescriptor> =
            report.components.iter().map(|c| &c.component).collect();
        std::fs::write(output, serde_json::to_string_pretty(&mapped)?)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        if verbose {
            eprintln!("Wrote {} components to {}", mapped.len(), output.display());
        }
    }

    match format {
        OutputFormat::Text => print_text_report(&report, verbose),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Tsv => print_tsv_report(&report),
    }

    Ok(())
}

fn load_bom(path: &Path) -> anyhow::Result<Vec<ComponentDescriptor>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read BOM {}", path.display()))?;
    let descriptors: Vec<ComponentDescriptor> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse BOM {}", path.display()))?;

    if let Some(message) = check_component_limit(descriptors.len()) {
        anyhow::bail!(message);
    }
    Ok(descriptors)
}

/// Matching options from the config file, with the command-line flags added
fn build_config(args: &MapArgs) -> anyhow::Result<MatchingConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => MatchingConfig::default(),
    };

    config.online |= args.online;
    config.allow_name_only |= args.allow_name_only;
    config.similarity |= args.similar;
    config.relaxed_debian |= args.relaxed_debian;
    config.require_clearing_result |= args.require_clearing;
    Ok(config)
}

fn print_text_report(report: &MappingReport, verbose: bool) {
    for component in &report.components {
        print_component(component, verbose);
    }

    if !report.components.is_empty() {
        println!();
    }
    println!("Mapped {} components:", report.summary.total);
    for code in MatchCode::ALL {
        let count = report.summary.count(code);
        if count > 0 {
            println!("  {:<40} {count}", code.as_str());
        }
    }
    if report.summary.all_good {
        println!("All components have a full match.");
    }
}

fn print_component(component: &MappedComponent, verbose: bool) {
    println!("{:<40} {}", component.result.as_str(), component.component.label());

    let shown = if verbose { component.candidates.len() } else { 3 };
    for candidate in component.candidates.iter().take(shown) {
        let version = candidate.version.as_deref().unwrap_or("-");
        println!("    {} {} {}", candidate.id, candidate.name, version);
    }
    let hidden = component.candidates.len().saturating_sub(shown);
    if hidden > 0 {
        println!("    ... and {hidden} more");
    }

    if !component.purl_conflicts.is_empty() {
        let refs: Vec<&str> = component.purl_conflicts.iter().map(|r| r.as_str()).collect();
        println!("    ambiguous package-url: {}", refs.join(", "));
    }
}

fn print_tsv_report(report: &MappingReport) {
    println!("name\tversion\tresult\tcandidates\tcatalog_id");
    for component in &report.components {
        let candidates: Vec<&str> = component.candidates.iter().map(|c| c.id.as_str()).collect();
        println!(
            "{}\t{}\t{}\t{}\t{}",
            component.component.name,
            component.component.version.as_deref().unwrap_or(""),
            component.result,
            candidates.join(","),
            component
                .component
                .catalog_id
                .as_ref()
                .map_or("", |id| id.as_str()),
        );
    }
}
