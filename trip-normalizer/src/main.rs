use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use trip_normalizer::batch::{BatchError, FeedBatch};
use trip_normalizer::config::NormalizerConfig;
use trip_normalizer::rules::thunder_bay;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        eprintln!("usage: trip-normalizer <batch.json>");
        return ExitCode::from(2);
    };

    match run(&path) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(path = %path.display(), "{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &Path) -> Result<String, BatchError> {
    let rules = thunder_bay()?;
    let records = FeedBatch::load(path)?.normalize(&rules, NormalizerConfig::default())?;
    Ok(serde_json::to_string_pretty(&records)?)
}
