//! Speech-to-text upload client.

use std::convert::Infallible;
use std::path::Path;

use bytes::Bytes;
use futures_util::stream;
use reqwest::{Body, multipart};
use serde_json::Value;
use tracing::debug;

use crate::{ApiError, Result};

const TRANSCRIPTION_ENDPOINT: &str = "https://api.openai.com/v1/audio/transcriptions";
const DEFAULT_MODEL: &str = "whisper-1";
const RESPONSE_FORMAT: &str = "text";

/// Proper nouns the recognizer would otherwise mangle, passed as the `prompt`
/// form field to bias recognition.
const DEFAULT_VOCABULARY: &str = "ZyntriQix, Digique Plus, CynapseFive, VortiQore V8, \
     EchoNix Array, OrbitalLink Seven, DigiFractal Matrix, PULSE, RAPT, B.R.I.C.K., \
     Q.U.A.R.T.Z., F.L.I.N.T.";

/// Bytes handed to the transport per stream chunk.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Configuration for the transcription client.
#[derive(Debug, Clone)]
pub struct TranscriptionConfig {
    /// API key
    pub api_key: String,

    /// Model to use (defaults to whisper-1)
    pub model: Option<String>,

    /// Domain-vocabulary hint (defaults to the built-in proper-noun list)
    pub vocabulary: Option<String>,
}

impl TranscriptionConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: None,
            vocabulary: None,
        }
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the domain-vocabulary hint.
    pub fn with_vocabulary(mut self, vocabulary: impl Into<String>) -> Self {
        self.vocabulary = Some(vocabulary.into());
        self
    }

    /// Get the model name, using default if not set.
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// Get the vocabulary hint, using default if not set.
    pub fn vocabulary(&self) -> &str {
        self.vocabulary.as_deref().unwrap_or(DEFAULT_VOCABULARY)
    }
}

/// Client for the audio transcription endpoint.
#[derive(Debug, Clone)]
pub struct TranscriptionClient {
    client: reqwest::Client,
    config: TranscriptionConfig,
}

impl TranscriptionClient {
    /// Create a new client with the given configuration.
    pub fn new(config: TranscriptionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Upload `audio` and classify the response body.
    ///
    /// `on_chunk` fires with each chunk's length as the transport pulls it
    /// off the stream, making transport-side accounting the only source of
    /// progress truth.
    pub async fn upload<F>(
        &self,
        audio: Bytes,
        file_name: &str,
        on_chunk: F,
    ) -> Result<TranscriptionBody>
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        debug!(
            model = self.config.model(),
            audio_bytes = audio.len(),
            file_name,
            "Sending transcription request"
        );

        let total = audio.len() as u64;
        let body = Body::wrap_stream(stream::iter(chunked(&audio).into_iter().map(
            move |chunk| {
                on_chunk(chunk.len() as u64);
                Ok::<_, Infallible>(chunk)
            },
        )));

        let file = multipart::Part::stream_with_length(body, total)
            .file_name(file_name.to_string())
            .mime_str(mime_for(file_name))?;

        let form = multipart::Form::new()
            .part("file", file)
            .text("model", self.config.model().to_string())
            .text("response_format", RESPONSE_FORMAT)
            .text("prompt", self.config.vocabulary().to_string());

        let response = self
            .client
            .post(TRANSCRIPTION_ENDPOINT)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let headers = Box::new(response.headers().clone());
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status,
                headers,
                body,
            });
        }

        let body = response.text().await?;
        Ok(TranscriptionBody::classify(body))
    }
}

/// What came back from the transcription endpoint, decided once at the parse
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionBody {
    /// Plain-text body (the `response_format=text` happy path).
    Plain(String),
    /// JSON object carrying the transcription in a `text` field.
    Field(String),
    /// Anything else; holds the serialized body for diagnostics.
    Unrecognized(String),
}

impl TranscriptionBody {
    /// Classify a raw response body into one of the three shapes.
    pub fn classify(body: String) -> Self {
        // An empty body carries no transcription.
        if body.is_empty() {
            return Self::Unrecognized(body);
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Object(map)) => match map.get("text").and_then(Value::as_str) {
                Some(text) if !text.is_empty() => Self::Field(text.to_string()),
                _ => Self::Unrecognized(Value::Object(map).to_string()),
            },
            // A JSON string body reaches the caller as its inner value, so it
            // counts as a plain transcription too.
            Ok(Value::String(text)) => Self::Plain(text),
            Ok(other) => Self::Unrecognized(other.to_string()),
            Err(_) => Self::Plain(body),
        }
    }

    /// The usable transcription, if this body carried one.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Plain(text) | Self::Field(text) => Some(text),
            Self::Unrecognized(_) => None,
        }
    }
}

/// Split the audio into transport-sized chunks without copying.
fn chunked(data: &Bytes) -> Vec<Bytes> {
    (0..data.len())
        .step_by(UPLOAD_CHUNK_SIZE)
        .map(|start| data.slice(start..usize::min(start + UPLOAD_CHUNK_SIZE, data.len())))
        .collect()
}

/// Content type for the upload part, keyed on the file extension.
fn mime_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("m4a" | "mp4") => "audio/mp4",
        Some("ogg" | "oga") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("webm") => "audio/webm",
        _ => "application/octet-stream",
    }
}
