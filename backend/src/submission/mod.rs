//! # Submission Encoder
//!
//! Sends a rendered letter with its metadata to the outgoing-letter endpoint,
//! or saves it locally.
//!
//! A submission owns the artifact. On success it is consumed; on any failure
//! it comes back inside [`SubmissionFailure`] so the operator can retry
//! without rendering again.

mod boundary;
mod download;

pub use boundary::{
    interpret_response, CredentialSource, HttpSubmissionBoundary, StaticCredential,
    SubmissionBoundary, SubmissionPayload, DEFAULT_SUCCESS_MESSAGE,
};
pub use download::download_to_dir;

use crate::editor::FormState;
use crate::error::EngineError;
use crate::render::BinaryArtifact;
use common::model::field::FieldValue;
use common::model::submission::SubmissionMetadata;
use common::requests::ValidationReport;
use log::{debug, info};
use std::sync::Arc;

/// Separator used when a repeating field feeds a single metadata value.
const ITEM_SEPARATOR: &str = "; ";

#[derive(Debug)]
pub struct SubmissionReceipt {
    pub file_name: String,
    pub message: String,
}

#[derive(Debug)]
pub enum SubmissionError {
    /// Required fields are missing; nothing was sent.
    Incomplete(ValidationReport),
    Failed(EngineError),
}

#[derive(Debug)]
pub struct SubmissionFailure {
    pub error: SubmissionError,
    pub artifact: BinaryArtifact,
}

pub struct SubmissionEncoder {
    boundary: Arc<dyn SubmissionBoundary>,
}

impl SubmissionEncoder {
    pub fn new(boundary: Arc<dyn SubmissionBoundary>) -> Self {
        Self { boundary }
    }

    pub async fn submit(
        &self,
        artifact: BinaryArtifact,
        state: &FormState,
        credentials: &dyn CredentialSource,
    ) -> Result<SubmissionReceipt, SubmissionFailure> {
        let report = state.validation_report();
        if !report.is_ready() {
            debug!(
                "Submission of '{}' blocked: {} field(s) missing",
                artifact.file_name,
                report.errors.len()
            );
            return Err(SubmissionFailure {
                error: SubmissionError::Incomplete(report),
                artifact,
            });
        }

        let payload = SubmissionPayload {
            file_name: &artifact.file_name,
            bytes: &artifact.bytes,
            metadata: build_metadata(state),
        };
        let result = self.boundary.send(&payload, credentials.bearer_token()).await;
        match result {
            Ok(message) => {
                info!("Letter '{}' submitted", artifact.file_name);
                Ok(SubmissionReceipt {
                    file_name: artifact.file_name,
                    message,
                })
            }
            Err(e) => Err(SubmissionFailure {
                error: SubmissionError::Failed(e),
                artifact,
            }),
        }
    }
}

/// Projects the form onto the fixed submission schema using the template's
/// mapping. Dates stay in their raw ISO form.
pub fn build_metadata(state: &FormState) -> SubmissionMetadata {
    let mapping = &state.template().metadata;
    let value = |name: &str| match state.value(name) {
        Some(FieldValue::Scalar(text)) => text.trim().to_string(),
        Some(FieldValue::RepeatingList(items)) => items
            .iter()
            .map(|item| item.trim())
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join(ITEM_SEPARATOR),
        _ => String::new(),
    };
    let tanggal_surat = value(&mapping.date_field);
    SubmissionMetadata {
        nomor_surat: value(&mapping.number_field),
        tanggal_kirim: tanggal_surat.clone(),
        tanggal_surat,
        ditujukan_kepada: value(&mapping.recipient_field),
        perihal: value(&mapping.subject_field),
        divisi: value(&mapping.division_field),
        keterangan: value(&mapping.remarks_field),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TemplateCatalog;

    #[test]
    fn repeating_remarks_are_joined() {
        let catalog = TemplateCatalog::builtin().unwrap();
        let mut state = FormState::for_template(catalog.get("surat_undangan").unwrap());
        state.set_scalar("kepada", "Para Ketua Divisi").unwrap();
        state.set_scalar("tanggal_surat", "2024-03-20").unwrap();
        state.set_repeating_item("agenda", 0, "Pembukaan").unwrap();
        state.set_repeating_item("agenda", 2, "Evaluasi").unwrap();

        let metadata = build_metadata(&state);
        assert_eq!(metadata.ditujukan_kepada, "Para Ketua Divisi");
        assert_eq!(metadata.keterangan, "Pembukaan; Evaluasi");
        assert_eq!(metadata.tanggal_kirim, "2024-03-20");
    }
}
