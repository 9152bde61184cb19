use crate::model::field::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Deserialize, Serialize)]
/// Request payload for opening a session or switching its template.
pub struct SelectTemplateRequest {
    pub template_id: String,
}

#[derive(Deserialize, Serialize)]
/// Request payload for writing a scalar field or one repeating item.
pub struct SetValueRequest {
    pub value: String,
}

#[derive(Deserialize, Serialize)]
pub struct SessionCreated {
    pub session_id: String,
}

/// Field-level validation errors keyed by field name.
#[derive(Debug, Deserialize, Serialize)]
pub struct ValidationReport {
    pub errors: BTreeMap<String, String>,
}

impl ValidationReport {
    pub fn is_ready(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Result of a delivered submission.
#[derive(Debug, Deserialize, Serialize)]
pub struct SubmissionOutcome {
    pub success: bool,
    pub message: String,
}

/// Current content of an editing session.
#[derive(Debug, Deserialize, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub template_id: String,
    pub generation: u64,
    pub values: BTreeMap<String, FieldValue>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ItemAppended {
    pub index: usize,
}

/// Whether an uploaded attachment was written to the form.
#[derive(Debug, Deserialize, Serialize)]
pub struct AttachmentStored {
    pub applied: bool,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DownloadQuery {
    /// Also keep a copy in the server's download directory.
    #[serde(default)]
    pub save: bool,
}
