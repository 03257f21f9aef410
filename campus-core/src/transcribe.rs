//! Speech-to-text through a Whisper-compatible HTTP API.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::error::{CampusError, CampusResult};

#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Whether credentials are present. Callers check this before accepting uploads.
    fn is_configured(&self) -> bool;

    async fn transcribe(&self, filename: &str, audio: Bytes) -> CampusResult<String>;
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Client for `POST /v1/audio/transcriptions`.
#[derive(Clone)]
pub struct WhisperClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl WhisperClient {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
        }
    }
}

#[async_trait]
impl Transcriber for WhisperClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn transcribe(&self, filename: &str, audio: Bytes) -> CampusResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| CampusError::Configuration("OPENAI_API_KEY not set".into()))?;

        let size = audio.len();
        let part = Part::bytes(Vec::from(audio)).file_name(filename.to_string());
        let form = Form::new()
            .text("model", self.model.clone())
            .part("file", part);

        tracing::debug!(%filename, size, model = %self.model, "sending audio for transcription");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| CampusError::upstream(&self.endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CampusError::UpstreamStatus {
                url: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let body: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| CampusError::upstream(&self.endpoint, e))?;

        Ok(body.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_is_a_configuration_error() {
        let client = WhisperClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/v1/audio/transcriptions",
            "whisper-1",
            None,
        );

        assert!(!client.is_configured());
        let err = client
            .transcribe("clip.m4a", Bytes::from_static(b"audio"))
            .await
            .unwrap_err();
        assert!(matches!(err, CampusError::Configuration(ref m) if m == "OPENAI_API_KEY not set"));
    }
}
