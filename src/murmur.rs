use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use murmur::pipeline::{Consent, OutputPaths, Pipeline};
use murmur::{
    API_KEY_ENV, ConfigManager, CorrectionClient, CorrectionConfig, DEFAULT_LOG_LEVEL,
    TranscriptionClient, TranscriptionConfig,
};
use tracing_subscriber::EnvFilter;

/// Transcribe an audio file and optionally clean it up with a language model.
#[derive(Debug, Parser)]
#[command(name = "murmur", version, about)]
struct Args {
    /// Audio file to transcribe
    input: PathBuf,

    /// Transcription model override
    #[arg(long)]
    model: Option<String>,

    /// Correction model override
    #[arg(long)]
    correction_model: Option<String>,

    /// Where to write the transcription
    #[arg(long)]
    transcript_out: Option<PathBuf>,

    /// Where to write the corrected transcription
    #[arg(long)]
    corrected_out: Option<PathBuf>,

    /// Run the correction pass without asking
    #[arg(long)]
    yes: bool,

    /// Alternate config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("MURMUR_LOG")
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Load config
    let config_manager = match &args.config {
        Some(path) => ConfigManager::with_config_path(path.clone()),
        None => ConfigManager::new()?,
    };
    let config = config_manager.load()?;
    // save back the config to create the file if it doesn't exist
    config_manager.save(&config)?;

    let Some(api_key) = config.api_key() else {
        bail!(
            "No API key configured. Set {API_KEY_ENV} or add `api_key` to {}",
            config_manager.config_path().display()
        );
    };

    let mut transcription = TranscriptionConfig::new(&api_key);
    if let Some(model) = args.model.as_deref().or(config.model()) {
        transcription = transcription.with_model(model);
    }
    if let Some(vocabulary) = config.vocabulary() {
        transcription = transcription.with_vocabulary(vocabulary);
    }

    let mut correction = CorrectionConfig::new(&api_key);
    if let Some(model) = args.correction_model.as_deref().or(config.correction_model()) {
        correction = correction.with_model(model);
    }

    let outputs = OutputPaths {
        transcript: args
            .transcript_out
            .unwrap_or_else(|| config.transcript_path()),
        corrected: args.corrected_out.unwrap_or_else(|| config.corrected_path()),
    };

    let consent = if args.yes {
        Consent::Preset(true)
    } else {
        Consent::Interactive
    };

    let pipeline = Pipeline::new(
        TranscriptionClient::new(transcription),
        CorrectionClient::new(correction),
        outputs,
    );
    pipeline.run(&args.input, consent).await?;

    Ok(())
}
