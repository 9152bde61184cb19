use crate::editor::form_state::FormState;
use crate::error::EngineError;
use crate::render::BinaryArtifact;
use common::model::template::TemplateDefinition;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Proof that an attachment conversion was started for `field` while the
/// session was at `generation`. `sequence` orders uploads in the order they
/// were received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentTicket {
    pub generation: u64,
    pub field: String,
    pub sequence: u64,
}

/// One operator's editing session: the form plus cancellation bookkeeping.
///
/// The generation counter moves on every template switch and reset. A
/// conversion that resolves under an older generation is dropped, which is
/// all the cancellation the file uploads need. Within one generation a
/// conversion older than the last one written to its field is dropped too.
#[derive(Debug)]
pub struct EditingSession {
    state: FormState,
    generation: u64,
    next_sequence: u64,
    /// Sequence of the upload last written, per file field.
    written_sequence: HashMap<String, u64>,
    /// Artifact handed back by a failed submission, kept for a resend.
    retained_artifact: Option<BinaryArtifact>,
    last_used: Instant,
}

impl EditingSession {
    pub fn new(template: Arc<TemplateDefinition>) -> Self {
        Self {
            state: FormState::for_template(template),
            generation: 0,
            next_sequence: 0,
            written_sequence: HashMap::new(),
            retained_artifact: None,
            last_used: Instant::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_used = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_used.elapsed()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Any edit makes a retained artifact outdated, so it is dropped here.
    pub fn state_mut(&mut self) -> &mut FormState {
        self.retained_artifact = None;
        &mut self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Consistent copy of the form for substitution and submission.
    pub fn snapshot(&self) -> FormState {
        self.state.clone()
    }

    /// Switches template: fresh defaults, pending conversions cancelled,
    /// retained artifact dropped.
    pub fn select(&mut self, template: Arc<TemplateDefinition>) {
        self.generation += 1;
        self.state = FormState::for_template(template);
        self.written_sequence.clear();
        self.retained_artifact = None;
    }

    pub fn reset(&mut self) {
        self.generation += 1;
        self.state.reset();
        self.written_sequence.clear();
        self.retained_artifact = None;
    }

    /// Validates the target field and issues a ticket for a conversion.
    pub fn begin_attachment(&mut self, field: &str) -> Result<AttachmentTicket, EngineError> {
        self.state.ensure_file_field(field)?;
        self.next_sequence += 1;
        Ok(AttachmentTicket {
            generation: self.generation,
            field: field.to_string(),
            sequence: self.next_sequence,
        })
    }

    /// Applies a resolved conversion. Returns `false` when the ticket is
    /// stale and the value was discarded.
    pub fn resolve_attachment(&mut self, ticket: &AttachmentTicket, data_uri: String) -> bool {
        if ticket.generation != self.generation {
            debug!(
                "Discarding attachment for '{}' from generation {} (current {})",
                ticket.field, ticket.generation, self.generation
            );
            return false;
        }
        let written = self.written_sequence.get(&ticket.field).copied().unwrap_or(0);
        if ticket.sequence <= written {
            debug!(
                "Discarding upload {} for '{}', upload {} was received later",
                ticket.sequence, ticket.field, written
            );
            return false;
        }
        match self.state_mut().set_attachment(&ticket.field, data_uri) {
            Ok(()) => {
                self.written_sequence.insert(ticket.field.clone(), ticket.sequence);
                true
            }
            Err(e) => {
                debug!("Discarding attachment for '{}': {}", ticket.field, e);
                false
            }
        }
    }

    pub fn retain_artifact(&mut self, artifact: BinaryArtifact) {
        self.retained_artifact = Some(artifact);
    }

    /// Takes the retained artifact if it was produced for the current template.
    pub fn take_retained_artifact(&mut self) -> Option<BinaryArtifact> {
        let template_id = self.state.template().id.clone();
        self.retained_artifact
            .take()
            .filter(|artifact| artifact.template_id == template_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TemplateCatalog;
    use common::model::field::FieldValue;

    fn catalog() -> TemplateCatalog {
        TemplateCatalog::builtin().unwrap()
    }

    #[test]
    fn conversion_for_current_generation_is_written() {
        let catalog = catalog();
        let mut session = EditingSession::new(catalog.get("surat_tugas").unwrap());
        let ticket = session.begin_attachment("tanda_tangan").unwrap();
        assert!(session.resolve_attachment(&ticket, "data:image/png;base64,AA==".into()));
        assert_eq!(
            session.state().value("tanda_tangan"),
            Some(&FieldValue::Attachment(Some("data:image/png;base64,AA==".into())))
        );
    }

    #[test]
    fn template_switch_discards_late_conversion() {
        let catalog = catalog();
        let mut session = EditingSession::new(catalog.get("surat_tugas").unwrap());
        let ticket = session.begin_attachment("tanda_tangan").unwrap();
        session.select(catalog.get("surat_dinas").unwrap());

        assert!(!session.resolve_attachment(&ticket, "data:image/png;base64,AA==".into()));
        assert_eq!(
            session.state().value("tanda_tangan"),
            Some(&FieldValue::Attachment(None))
        );
    }

    #[test]
    fn reset_also_invalidates_pending_conversions() {
        let catalog = catalog();
        let mut session = EditingSession::new(catalog.get("surat_tugas").unwrap());
        let ticket = session.begin_attachment("tanda_tangan").unwrap();
        session.reset();
        assert!(!session.resolve_attachment(&ticket, "data:image/png;base64,AA==".into()));
    }

    #[test]
    fn slower_earlier_upload_does_not_overwrite_a_later_one() {
        let catalog = catalog();
        let mut session = EditingSession::new(catalog.get("surat_tugas").unwrap());
        let first = session.begin_attachment("tanda_tangan").unwrap();
        let second = session.begin_attachment("tanda_tangan").unwrap();

        assert!(session.resolve_attachment(&second, "data:image/png;base64,BB==".into()));
        assert!(!session.resolve_attachment(&first, "data:image/png;base64,AA==".into()));
        assert_eq!(
            session.state().value("tanda_tangan"),
            Some(&FieldValue::Attachment(Some("data:image/png;base64,BB==".into())))
        );
    }

    #[test]
    fn uploads_resolving_in_order_all_apply() {
        let catalog = catalog();
        let mut session = EditingSession::new(catalog.get("surat_tugas").unwrap());
        let first = session.begin_attachment("tanda_tangan").unwrap();
        let second = session.begin_attachment("tanda_tangan").unwrap();
        assert!(session.resolve_attachment(&first, "data:image/png;base64,AA==".into()));
        assert!(session.resolve_attachment(&second, "data:image/png;base64,BB==".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn touch_restarts_the_idle_clock() {
        let catalog = catalog();
        let mut session = EditingSession::new(catalog.get("surat_tugas").unwrap());
        tokio::time::advance(Duration::from_secs(90)).await;
        assert!(session.idle_for() >= Duration::from_secs(90));
        session.touch();
        assert!(session.idle_for() < Duration::from_secs(1));
    }

    #[test]
    fn edits_drop_the_retained_artifact() {
        let catalog = catalog();
        let mut session = EditingSession::new(catalog.get("surat_tugas").unwrap());
        session.retain_artifact(BinaryArtifact::new(vec![1], "surat_tugas", (1, 1)));
        session.state_mut().set_scalar("perihal", "Monitoring").unwrap();
        assert!(session.take_retained_artifact().is_none());
    }

    #[test]
    fn retained_artifact_survives_until_taken() {
        let catalog = catalog();
        let mut session = EditingSession::new(catalog.get("surat_tugas").unwrap());
        session.retain_artifact(BinaryArtifact::new(vec![1], "surat_tugas", (1, 1)));
        assert_eq!(session.take_retained_artifact().unwrap().bytes, vec![1]);
        assert!(session.take_retained_artifact().is_none());
    }

    #[test]
    fn attachments_only_target_file_fields() {
        let catalog = catalog();
        let mut session = EditingSession::new(catalog.get("surat_tugas").unwrap());
        assert!(matches!(
            session.begin_attachment("perihal"),
            Err(EngineError::InvalidFieldKind { .. })
        ));
    }
}
