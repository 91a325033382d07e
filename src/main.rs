use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use classdav::config::Config;
use classdav::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "classdav")]
#[command(about = "Convert class-schedule CSV files to ICS and sync them to a CalDAV server")]
struct Cli {
    /// Path to the config file (defaults to the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of schedule CSV files (overrides the config file)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory for generated .ics artifacts (overrides the config file)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::config_path()?,
    };
    let mut config = Config::load(&config_path)?;

    if let Some(input) = cli.input {
        config.input_dir = input;
    }
    if let Some(output) = cli.output {
        config.output_dir = output;
    }

    info!(
        input = %config.input_dir.display(),
        output = %config.output_dir.display(),
        "starting classdav"
    );

    let pipeline = Pipeline::new(config)?;
    pipeline.run().await?;

    Ok(())
}
