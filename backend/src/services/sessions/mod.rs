//! # Session Service Module
//!
//! Routes under `/api/sessions` drive one operator's editing session: open it
//! on a template, edit fields, attach files, preview, then download or submit
//! the rendered letter.
//!
//! Every handler resolves the session through `SessionsState`. Mutations run
//! under the sessions write lock; preview, download and submit work on a
//! cloned snapshot, so rendering never holds the lock.
//!
//! ## Sub-modules:
//! - `lifecycle`: open, inspect, switch template, reset, close.
//! - `fields`: scalar values and repeating-field items.
//! - `upload`: multipart attachments for file fields.
//! - `validate`: missing required fields.
//! - `preview`: substituted markup and page raster.
//! - `download`: rendered PDF as an attachment.
//! - `submit`: rendered PDF and metadata to the submission endpoint.

mod download;
mod fields;
mod lifecycle;
mod preview;
mod submit;
mod upload;
mod validate;

use crate::editor::{EditingSession, FormState};
use crate::error::EngineError;
use crate::locale::Locale;
use crate::render::{BinaryArtifact, Rasterizer};
use crate::session_controller::state::SessionsState;
use crate::substitution::substitute;
use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;
use common::requests::SessionSnapshot;
use std::collections::BTreeMap;

/// The base path for all session-related API endpoints.
const API_PATH: &str = "/api/sessions";

/// Configures and returns the Actix `Scope` for all session routes.
///
/// # Registered Routes:
///
/// *   **`POST ""`**: `{template_id}` → `{session_id}`; new session with schema defaults.
/// *   **`GET /{session_id}`**: current values as a `SessionSnapshot`.
/// *   **`DELETE /{session_id}`**: abandons the session, `204`.
/// *   **`POST /{session_id}/select`**: `{template_id}`; switches template and
///     discards every value, pending upload and retained artifact.
/// *   **`POST /{session_id}/reset`**: back to schema defaults on the same template.
/// *   **`PUT /{session_id}/fields/{name}`**: `{value}` for a text, textarea or date field.
/// *   **`POST /{session_id}/fields/{name}/items`**: appends an empty item, answers `{index}`.
/// *   **`PUT /{session_id}/fields/{name}/items/{index}`**: `{value}` for one item.
/// *   **`DELETE /{session_id}/fields/{name}/items/{index}`**: removes one item.
/// *   **`POST /{session_id}/files/{name}`**: multipart part `file`; answers `{applied}`,
///     `409` when the template changed while the upload was converted.
/// *   **`GET /{session_id}/validate`**: `ValidationReport`, `422` when incomplete.
/// *   **`GET /{session_id}/preview`**: substituted markup as text (`?locale=english` optional).
/// *   **`GET /{session_id}/preview.png`**: page raster.
/// *   **`GET /{session_id}/download`**: PDF attachment (`?save=true` also writes it
///     to the configured download directory); `422` with the report when incomplete.
/// *   **`POST /{session_id}/submit`**: validates, renders and submits; `422` with the
///     report when incomplete. A successful submission closes the session.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(lifecycle::open))
        .route("/{session_id}", get().to(lifecycle::show))
        .route("/{session_id}", delete().to(lifecycle::close))
        .route("/{session_id}/select", post().to(lifecycle::select))
        .route("/{session_id}/reset", post().to(lifecycle::reset))
        .route("/{session_id}/fields/{name}", put().to(fields::set_value))
        .route("/{session_id}/fields/{name}/items", post().to(fields::append_item))
        .route("/{session_id}/fields/{name}/items/{index}", put().to(fields::set_item))
        .route("/{session_id}/fields/{name}/items/{index}", delete().to(fields::remove_item))
        .route("/{session_id}/files/{name}", post().to(upload::process))
        .route("/{session_id}/validate", get().to(validate::process))
        .route("/{session_id}/preview", get().to(preview::markup))
        .route("/{session_id}/preview.png", get().to(preview::raster))
        .route("/{session_id}/download", get().to(download::process))
        .route("/{session_id}/submit", post().to(submit::process))
}

fn snapshot_view(session_id: &str, session: &EditingSession) -> SessionSnapshot {
    let state = session.state();
    let values: BTreeMap<_, _> = state
        .template()
        .field_specs
        .iter()
        .filter_map(|spec| {
            state
                .value(&spec.name)
                .map(|value| (spec.name.clone(), value.clone()))
        })
        .collect();
    SessionSnapshot {
        session_id: session_id.to_string(),
        template_id: state.template().id.clone(),
        generation: session.generation(),
        values,
    }
}

async fn form_snapshot(sessions: &SessionsState, session_id: &str) -> Result<FormState, EngineError> {
    sessions
        .with_session(session_id, |session| Ok(session.snapshot()))
        .await
}

/// Substitutes and renders a snapshot into a PDF artifact.
async fn render_letter(
    rasterizer: &Rasterizer,
    state: &FormState,
) -> Result<BinaryArtifact, EngineError> {
    let markup = substitute(state, Locale::default())?;
    rasterizer.render(markup, &state.template().id).await
}
