use anyhow::Result;
use clap::Parser;
use snowshoe::cli::{Cli, OutputFormat};
use snowshoe::config::AnalysisConfig;
use snowshoe::{loader, pipeline, report};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
///
/// Warnings about skipped records are always shown; `--debug` turns on
/// everything down to TRACE.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };

    let table = loader::load_observations(&cli.input)?;

    let analysis = pipeline::run_loaded_table(&table, &config)?;

    match cli.format {
        OutputFormat::Text => print!("{}", report::render_text(&analysis)),
        OutputFormat::Json => println!("{}", report::render_json(&analysis)?),
    }

    Ok(())
}
