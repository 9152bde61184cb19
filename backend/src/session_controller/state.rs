//! Shared state of all open editing sessions.
//!
//! - `SessionsState`: clonable handle injected into the Actix application
//!   state in `main.rs`; holds every `EditingSession` by id.
//! - `AttachmentUpdate`: a finished attachment conversion, tagged with the
//!   ticket it was started under.
//! - `start_session_updater`: long-running task applying `AttachmentUpdate`s.
//!   A conversion whose ticket is older than the session's generation is
//!   dropped there, so a late upload never lands in a switched template.
//! - `start_session_sweeper`: long-running task closing sessions nobody used
//!   for longer than the configured idle time.

use crate::editor::{AttachmentTicket, EditingSession};
use crate::error::EngineError;
use common::model::template::TemplateDefinition;
use log::{debug, info};
use std::time::Duration;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, oneshot, RwLock};
use uuid::Uuid;

const UPDATE_QUEUE: usize = 100;

#[derive(Clone)]
pub struct SessionsState {
    /// Session id to session. Every mutation of a session goes through the
    /// write lock, so an operation is never half visible.
    pub sessions: Arc<RwLock<HashMap<String, EditingSession>>>,

    /// Conversions report here; see `start_session_updater`.
    pub tx: mpsc::Sender<AttachmentUpdate>,
}

#[derive(Debug)]
pub struct AttachmentUpdate {
    pub(crate) session_id: String,
    pub(crate) ticket: AttachmentTicket,
    pub(crate) data_uri: String,
    /// Told whether the value was written.
    pub(crate) applied: Option<oneshot::Sender<bool>>,
}

impl SessionsState {
    /// Creates the state and the receiver to hand to `start_session_updater`.
    pub fn new() -> (Self, mpsc::Receiver<AttachmentUpdate>) {
        let (tx, rx) = mpsc::channel(UPDATE_QUEUE);
        let state = Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        (state, rx)
    }

    pub async fn open(&self, template: Arc<TemplateDefinition>) -> String {
        let session_id = Uuid::new_v4().to_string();
        debug!("Opening session {} on '{}'", session_id, template.id);
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), EditingSession::new(template));
        session_id
    }

    /// Runs `f` on the session under the write lock.
    pub async fn with_session<T>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut EditingSession) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| EngineError::UnknownSession(session_id.to_string()))?;
        session.touch();
        f(session)
    }

    /// Discards a session with its form, pending uploads and retained artifact.
    pub async fn close(&self, session_id: &str) -> Result<(), EngineError> {
        match self.sessions.write().await.remove(session_id) {
            Some(_) => {
                debug!("Closed session {}", session_id);
                Ok(())
            }
            None => Err(EngineError::UnknownSession(session_id.to_string())),
        }
    }

    /// Closes every session idle for longer than `max_idle`. Returns how many
    /// were closed.
    pub async fn expire_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.idle_for() <= max_idle);
        before - sessions.len()
    }

    /// Queues a finished conversion and waits until the updater decided on it.
    /// Returns `false` when the conversion was stale.
    pub async fn report_attachment(
        &self,
        session_id: &str,
        ticket: AttachmentTicket,
        data_uri: String,
    ) -> bool {
        let (applied_tx, applied_rx) = oneshot::channel();
        let update = AttachmentUpdate {
            session_id: session_id.to_string(),
            ticket,
            data_uri,
            applied: Some(applied_tx),
        };
        if self.tx.send(update).await.is_err() {
            debug!("Session updater is gone; attachment dropped");
            return false;
        }
        applied_rx.await.unwrap_or(false)
    }
}

pub async fn start_session_updater(state: SessionsState, mut rx: mpsc::Receiver<AttachmentUpdate>) {
    while let Some(update) = rx.recv().await {
        let applied = {
            let mut sessions = state.sessions.write().await;
            match sessions.get_mut(&update.session_id) {
                Some(session) => session.resolve_attachment(&update.ticket, update.data_uri),
                None => {
                    debug!("Attachment for closed session {} dropped", update.session_id);
                    false
                }
            }
        };
        if let Some(reply) = update.applied {
            let _ = reply.send(applied);
        }
    }
}

pub async fn start_session_sweeper(state: SessionsState, max_idle: Duration) {
    let mut ticks = tokio::time::interval((max_idle / 4).max(Duration::from_secs(1)));
    loop {
        ticks.tick().await;
        let closed = state.expire_idle(max_idle).await;
        if closed > 0 {
            info!("Closed {} idle session(s)", closed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TemplateCatalog;
    use common::model::field::FieldValue;

    #[tokio::test]
    async fn updater_discards_conversion_after_template_switch() {
        let catalog = TemplateCatalog::builtin().unwrap();
        let (state, rx) = SessionsState::new();
        tokio::spawn(start_session_updater(state.clone(), rx));

        let id = state.open(catalog.get("surat_tugas").unwrap()).await;
        let ticket = state
            .with_session(&id, |session| session.begin_attachment("tanda_tangan"))
            .await
            .unwrap();
        let dinas = catalog.get("surat_dinas").unwrap();
        state
            .with_session(&id, |session| {
                session.select(dinas);
                Ok(())
            })
            .await
            .unwrap();

        let applied = state
            .report_attachment(&id, ticket, "data:image/png;base64,AA==".into())
            .await;
        assert!(!applied);
        let value = state
            .with_session(&id, |session| Ok(session.state().value("tanda_tangan").cloned()))
            .await
            .unwrap();
        assert_eq!(value, Some(FieldValue::Attachment(None)));
    }

    #[tokio::test]
    async fn closed_session_is_gone() {
        let catalog = TemplateCatalog::builtin().unwrap();
        let (state, _rx) = SessionsState::new();
        let id = state.open(catalog.get("surat_tugas").unwrap()).await;
        state.close(&id).await.unwrap();
        assert!(matches!(
            state.with_session(&id, |_| Ok(())).await,
            Err(EngineError::UnknownSession(_))
        ));
        assert!(matches!(state.close(&id).await, Err(EngineError::UnknownSession(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn only_idle_sessions_expire() {
        let catalog = TemplateCatalog::builtin().unwrap();
        let (state, _rx) = SessionsState::new();
        let idle = state.open(catalog.get("surat_tugas").unwrap()).await;
        let busy = state.open(catalog.get("surat_dinas").unwrap()).await;

        tokio::time::advance(Duration::from_secs(50 * 60)).await;
        state.with_session(&busy, |_| Ok(())).await.unwrap();
        tokio::time::advance(Duration::from_secs(20 * 60)).await;

        assert_eq!(state.expire_idle(Duration::from_secs(60 * 60)).await, 1);
        assert!(state.with_session(&idle, |_| Ok(())).await.is_err());
        assert!(state.with_session(&busy, |_| Ok(())).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_closes_abandoned_sessions() {
        let catalog = TemplateCatalog::builtin().unwrap();
        let (state, _rx) = SessionsState::new();
        let id = state.open(catalog.get("surat_tugas").unwrap()).await;
        tokio::spawn(start_session_sweeper(state.clone(), Duration::from_secs(60)));

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(state.sessions.read().await.get(&id).is_none());
    }

    #[tokio::test]
    async fn unknown_session_is_reported() {
        let (state, _rx) = SessionsState::new();
        let err = state.with_session("nope", |_| Ok(())).await.unwrap_err();
        assert!(matches!(err, EngineError::UnknownSession(_)));
    }
}
