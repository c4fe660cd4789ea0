use bom_mapper::cli::{self, Cli, Commands};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("bom_mapper=debug,info")
    } else {
        EnvFilter::new("bom_mapper=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Map(args) => {
            cli::map::run(args, cli.format, cli.verbose)?;
        }
        Commands::Cache(args) => {
            cli::cache::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
