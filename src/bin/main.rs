use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fx_rate_ingest::RateUploader;

/// A cli interface to the FX rate file ingestion
#[derive(Debug, Parser)]
#[clap(version)]
struct Args {
    /// The path to the FX rate CSV file
    filename: std::path::PathBuf,
    /// Only validate the file, without saving the rates
    #[clap(long)]
    no_save: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let contents = std::fs::read(&args.filename)
        .with_context(|| format!("Error reading file {}", args.filename.display()))?;
    let mut uploader = RateUploader::new();

    uploader.select_file(args.filename.to_string_lossy(), contents)?;
    uploader.upload()?;
    if !args.no_save {
        let message = uploader.save()?;
        tracing::info!("{}", message);
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(std::io::stdout());

    for row in uploader.rows() {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
