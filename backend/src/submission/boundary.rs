//! The outgoing-letter endpoint, seen from the engine.

use crate::error::{EngineError, GENERIC_SUBMISSION_FAILURE};
use async_trait::async_trait;
use common::model::submission::{SubmissionEnvelope, SubmissionMetadata};
use log::{error, info, warn};
use reqwest::multipart::{Form, Part};

/// Message reported when the endpoint accepts a letter without saying so.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Surat keluar berhasil dikirim";

/// Everything sent for one letter. Borrows the artifact bytes so a failed
/// attempt leaves the artifact untouched.
#[derive(Debug)]
pub struct SubmissionPayload<'a> {
    pub file_name: &'a str,
    pub bytes: &'a [u8],
    pub metadata: SubmissionMetadata,
}

/// Supplies the bearer credential attached to a submission.
pub trait CredentialSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// A fixed credential, or none.
#[derive(Debug, Clone, Default)]
pub struct StaticCredential(pub Option<String>);

impl CredentialSource for StaticCredential {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}

#[async_trait]
pub trait SubmissionBoundary: Send + Sync {
    /// Delivers the payload. `Ok` carries the endpoint's confirmation message.
    async fn send(
        &self,
        payload: &SubmissionPayload<'_>,
        bearer: Option<String>,
    ) -> Result<String, EngineError>;
}

/// Interprets the endpoint's answer. Non-2xx and `success: false` are
/// rejections; the server message wins over the generic one.
pub fn interpret_response(
    status_ok: bool,
    envelope: &SubmissionEnvelope,
) -> Result<String, EngineError> {
    if status_ok && envelope.success != Some(false) {
        return Ok(envelope
            .message
            .clone()
            .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string()));
    }
    Err(EngineError::SubmissionRejected(
        envelope
            .message
            .clone()
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| GENERIC_SUBMISSION_FAILURE.to_string()),
    ))
}

/// Multipart POST to the configured endpoint.
pub struct HttpSubmissionBoundary {
    client: reqwest::Client,
    url: String,
}

impl HttpSubmissionBoundary {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    fn form(payload: &SubmissionPayload<'_>) -> Result<Form, EngineError> {
        let file = Part::bytes(payload.bytes.to_vec())
            .file_name(payload.file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| EngineError::SubmissionTransport(e.to_string()))?;
        let form = payload
            .metadata
            .fields()
            .into_iter()
            .fold(Form::new().part("file", file), |form, (name, value)| {
                form.text(name, value.to_string())
            });
        Ok(form)
    }
}

#[async_trait]
impl SubmissionBoundary for HttpSubmissionBoundary {
    async fn send(
        &self,
        payload: &SubmissionPayload<'_>,
        bearer: Option<String>,
    ) -> Result<String, EngineError> {
        let mut request = self.client.post(&self.url).multipart(Self::form(payload)?);
        match bearer {
            Some(token) => request = request.bearer_auth(token),
            None => warn!("Submitting '{}' without a bearer credential", payload.file_name),
        }

        let response = request.send().await.map_err(|e| {
            error!("Submission of '{}' failed: {}", payload.file_name, e);
            EngineError::SubmissionTransport(e.to_string())
        })?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            error!("Reading submission response failed: {}", e);
            EngineError::SubmissionTransport(e.to_string())
        })?;
        let envelope: SubmissionEnvelope = serde_json::from_slice(&body).unwrap_or_else(|e| {
            warn!("Submission endpoint answered {} with a non-JSON body: {}", status, e);
            SubmissionEnvelope::default()
        });

        let outcome = interpret_response(status.is_success(), &envelope);
        match &outcome {
            Ok(_) => info!("Submitted '{}' ({})", payload.file_name, status),
            Err(e) => warn!("Submission of '{}' rejected ({}): {}", payload.file_name, status, e),
        }
        outcome
    }
}
