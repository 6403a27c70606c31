//! The transcription pipeline: upload, consent, optional cleanup.
//!
//! Stage failures are captured as values and persisted to the relevant output
//! file; nothing here propagates an API failure upward. Only local I/O
//! problems (unreadable input, unwritable output) abort the run.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytes::Bytes;
use murmur_api::{CorrectionClient, TranscriptionBody, TranscriptionClient};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use crate::progress::UploadProgress;
use crate::report;

/// How the operator answers the correction prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consent {
    /// Ask on stdin with a yes/no prompt.
    Interactive,
    /// Pre-supplied answer (`--yes`, non-interactive runs).
    Preset(bool),
}

impl Consent {
    /// Resolve to a yes/no answer. The interactive variant is the pipeline's
    /// single suspension point on operator input.
    pub async fn resolve(self) -> Result<bool> {
        match self {
            Consent::Preset(answer) => Ok(answer),
            Consent::Interactive => {
                report::prompt("Post-process the transcription with the correction model? (yes/no):");
                let mut line = String::new();
                BufReader::new(tokio::io::stdin())
                    .read_line(&mut line)
                    .await
                    .context("Failed to read consent answer from stdin")?;
                Ok(is_affirmative(&line))
            }
        }
    }
}

/// Case-insensitive `yes`, surrounding whitespace ignored. Anything else,
/// including end-of-input, declines.
fn is_affirmative(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("yes")
}

/// Where the pipeline writes its two outputs. Both files are overwritten on
/// every run.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub transcript: PathBuf,
    pub corrected: PathBuf,
}

/// Terminal state of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The upload produced no usable transcription; the transcript file holds
    /// a diagnostic and the correction stage never ran.
    TranscriptionFailed,
    /// Transcription written; the operator declined the cleanup pass.
    Skipped,
    /// Both stages ran; the corrected file holds text or a diagnostic.
    Corrected,
}

pub struct Pipeline {
    transcription: TranscriptionClient,
    correction: CorrectionClient,
    outputs: OutputPaths,
}

impl Pipeline {
    pub fn new(
        transcription: TranscriptionClient,
        correction: CorrectionClient,
        outputs: OutputPaths,
    ) -> Self {
        Self {
            transcription,
            correction,
            outputs,
        }
    }

    /// Run the full flow on one audio file.
    pub async fn run(&self, input: &Path, consent: Consent) -> Result<Outcome> {
        report::info("Starting transcription process...");
        report::info(&format!("Processing file: {}", input.display()));

        let audio = fs::read(input)
            .with_context(|| format!("Failed to read audio file {}", input.display()))?;
        let file_name = input
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("audio")
            .to_string();

        let progress = UploadProgress::new(audio.len() as u64);
        let ticker = progress.clone();

        report::info("Sending request to the transcription API...");
        let outcome = self
            .transcription
            .upload(Bytes::from(audio), &file_name, move |delta| {
                ticker.advance(delta)
            })
            .await;
        progress.finish();

        let Some(transcript) = self.persist_transcription(outcome)? else {
            report::failure("Transcription failed. No post-processing will be done.");
            return Ok(Outcome::TranscriptionFailed);
        };

        if !consent.resolve().await? {
            report::info("Post-processing skipped.");
            return Ok(Outcome::Skipped);
        }

        report::info("Post-processing transcription with the correction model...");
        let outcome = self.correction.correct(&transcript).await;
        self.persist_correction(outcome)?;

        Ok(Outcome::Corrected)
    }

    /// Write exactly one of {transcription, unexpected-format diagnostic,
    /// error diagnostic} to the transcript file, handing back usable text.
    fn persist_transcription(
        &self,
        outcome: murmur_api::Result<TranscriptionBody>,
    ) -> Result<Option<String>> {
        let path = &self.outputs.transcript;

        match outcome {
            Ok(TranscriptionBody::Plain(text)) | Ok(TranscriptionBody::Field(text)) => {
                write_output(path, &text)?;
                info!(bytes = text.len(), path = %path.display(), "transcription written");
                report::success(&format!(
                    "Transcription successfully written to {}",
                    path.display()
                ));
                Ok(Some(text))
            }
            Ok(TranscriptionBody::Unrecognized(raw)) => {
                let diagnostic = format!("Unexpected response format: {raw}");
                error!("{diagnostic}");
                write_output(path, &diagnostic)?;
                report::failure(&format!(
                    "Error: Unexpected response format. Details saved to {}",
                    path.display()
                ));
                Ok(None)
            }
            Err(err) => {
                error!(error = %err, "transcription request failed");
                write_output(path, &err.diagnostic())?;
                report::failure(&format!("Error: Details saved to {}", path.display()));
                Ok(None)
            }
        }
    }

    /// Write the corrected text, or a diagnostic naming the model, to the
    /// corrected-output file. A stage-2 failure is terminal for stage 2 only.
    fn persist_correction(&self, outcome: murmur_api::Result<String>) -> Result<()> {
        let path = &self.outputs.corrected;

        match outcome {
            Ok(corrected) => {
                write_output(path, &corrected)?;
                info!(bytes = corrected.len(), path = %path.display(), "corrected transcription written");
                report::success(&format!(
                    "Corrected transcription successfully written to {}",
                    path.display()
                ));
            }
            Err(err) => {
                error!(error = %err, "correction request failed");
                let diagnostic = format!(
                    "Error processing transcription with {}: {err}",
                    self.correction.model()
                );
                write_output(path, &diagnostic)?;
                report::failure(&format!("Error: Details saved to {}", path.display()));
            }
        }

        Ok(())
    }
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use murmur_api::{
        ApiError, CorrectionConfig, TranscriptionConfig,
    };

    use super::*;

    fn test_pipeline(dir: &Path) -> Pipeline {
        Pipeline::new(
            TranscriptionClient::new(TranscriptionConfig::new("sk-test")),
            CorrectionClient::new(CorrectionConfig::new("sk-test")),
            OutputPaths {
                transcript: dir.join("transcription.txt"),
                corrected: dir.join("corrected_transcription.txt"),
            },
        )
    }

    #[test]
    fn test_is_affirmative_case_insensitive() {
        assert!(is_affirmative("yes"));
        assert!(is_affirmative("Yes"));
        assert!(is_affirmative("YES"));
        assert!(is_affirmative("  yes\n"));

        assert!(!is_affirmative("no"));
        assert!(!is_affirmative("y"));
        assert!(!is_affirmative("yes please"));
        assert!(!is_affirmative(""));
    }

    #[tokio::test]
    async fn test_preset_consent_skips_stdin() {
        assert!(Consent::Preset(true).resolve().await.unwrap());
        assert!(!Consent::Preset(false).resolve().await.unwrap());
    }

    #[test]
    fn test_persist_plain_transcription() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = test_pipeline(dir.path());

        let text = pipeline
            .persist_transcription(Ok(TranscriptionBody::Plain("hello world".to_string())))
            .unwrap();

        assert_eq!(text.as_deref(), Some("hello world"));
        assert_eq!(
            fs::read_to_string(dir.path().join("transcription.txt")).unwrap(),
            "hello world"
        );
    }

    #[test]
    fn test_persist_field_transcription() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = test_pipeline(dir.path());

        let text = pipeline
            .persist_transcription(Ok(TranscriptionBody::Field("hello".to_string())))
            .unwrap();

        assert_eq!(text.as_deref(), Some("hello"));
        assert_eq!(
            fs::read_to_string(dir.path().join("transcription.txt")).unwrap(),
            "hello"
        );
    }

    #[test]
    fn test_persist_unrecognized_body_fails_the_stage() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = test_pipeline(dir.path());

        let text = pipeline
            .persist_transcription(Ok(TranscriptionBody::Unrecognized(
                r#"{"foo":"bar"}"#.to_string(),
            )))
            .unwrap();

        assert_eq!(text, None);
        let written = fs::read_to_string(dir.path().join("transcription.txt")).unwrap();
        assert!(written.contains("Unexpected response format"));
        assert!(written.contains(r#"{"foo":"bar"}"#));
    }

    #[test]
    fn test_persist_api_error_writes_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = test_pipeline(dir.path());

        let err = ApiError::Status {
            status: reqwest::StatusCode::UNAUTHORIZED,
            headers: Box::default(),
            body: r#"{"error":"bad key"}"#.to_string(),
        };
        let text = pipeline.persist_transcription(Err(err)).unwrap();

        assert_eq!(text, None);
        let written = fs::read_to_string(dir.path().join("transcription.txt")).unwrap();
        assert!(written.contains("Error response status: 401"));
        assert!(written.contains("bad key"));
    }

    #[test]
    fn test_persist_corrected_text() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = test_pipeline(dir.path());

        pipeline
            .persist_correction(Ok("Hello world.".to_string()))
            .unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("corrected_transcription.txt")).unwrap(),
            "Hello world."
        );
    }

    #[test]
    fn test_persist_correction_failure_names_the_model() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = test_pipeline(dir.path());

        pipeline
            .persist_correction(Err(ApiError::Shape("no completion choices".to_string())))
            .unwrap();

        let written =
            fs::read_to_string(dir.path().join("corrected_transcription.txt")).unwrap();
        assert!(written.starts_with("Error processing transcription with gpt-4o:"));
        assert!(written.contains("no completion choices"));
    }

    #[test]
    fn test_outputs_overwritten_each_run() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = test_pipeline(dir.path());

        pipeline
            .persist_transcription(Ok(TranscriptionBody::Plain("first take".to_string())))
            .unwrap();
        pipeline
            .persist_transcription(Ok(TranscriptionBody::Plain("second".to_string())))
            .unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("transcription.txt")).unwrap(),
            "second"
        );
    }
}
