//! # Attachment Upload
//!
//! `POST /api/sessions/{session_id}/files/{name}` with a multipart part named
//! `file`.
//!
//! ## Workflow
//!
//! 1.  **Ticket**: under the session lock, the field is checked to be a file
//!     field and a ticket records the session's current generation.
//! 2.  **Read**: the `file` part is streamed into memory, capped at the
//!     configured upload limit.
//! 3.  **Convert**: the bytes become a data URI on the blocking pool.
//! 4.  **Apply**: the result goes through the session updater, which drops it
//!     when the operator switched template or reset the form meanwhile.
//!
//! The answer is `{applied: true}`, or `409 Conflict` with `{applied: false}`
//! for a discarded conversion.

use crate::config::Settings;
use crate::editor::attachment::convert_upload;
use crate::error::EngineError;
use crate::session_controller::state::SessionsState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::requests::AttachmentStored;
use futures_util::StreamExt;
use log::{debug, warn};
use serde_json::json;

pub async fn process(
    sessions: web::Data<SessionsState>,
    settings: web::Data<Settings>,
    path: web::Path<(String, String)>,
    payload: Multipart,
) -> Result<HttpResponse, EngineError> {
    let (session_id, name) = path.into_inner();
    let ticket = sessions
        .with_session(&session_id, |session| session.begin_attachment(&name))
        .await?;

    let (bytes, file_name) = match read_file_part(payload, settings.upload_limit_bytes).await {
        Ok(Some(upload)) => upload,
        Ok(None) => {
            return Ok(HttpResponse::BadRequest()
                .json(json!({ "message": "multipart part 'file' is missing" })));
        }
        Err(message) => {
            warn!("Upload for '{}' refused: {}", name, message);
            return Ok(HttpResponse::BadRequest().json(json!({ "message": message })));
        }
    };
    debug!("Converting {} bytes for '{}'", bytes.len(), name);

    let data_uri = convert_upload(bytes, file_name).await?;

    let applied = sessions.report_attachment(&session_id, ticket, data_uri).await;
    let body = AttachmentStored { applied };
    if applied {
        Ok(HttpResponse::Ok().json(body))
    } else {
        Ok(HttpResponse::Conflict().json(body))
    }
}

/// Reads the `file` part. Other parts are skipped.
async fn read_file_part(
    mut payload: Multipart,
    limit: usize,
) -> Result<Option<(Vec<u8>, Option<String>)>, String> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| e.to_string())?;
        let disposition = field.content_disposition().cloned();
        let part_name = disposition
            .as_ref()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        if part_name.as_deref() != Some("file") {
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| e.to_string())?;
            }
            continue;
        }

        let file_name = disposition
            .as_ref()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()));
        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| e.to_string())?;
            if bytes.len() + chunk.len() > limit {
                return Err(format!("file exceeds {} bytes", limit));
            }
            bytes.extend_from_slice(&chunk);
        }
        return Ok(Some((bytes, file_name)));
    }
    Ok(None)
}
