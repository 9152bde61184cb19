//! Field edits. Each handler answers with the new `SessionSnapshot` so the
//! editor can redraw from a single source of truth.

use super::snapshot_view;
use crate::error::EngineError;
use crate::session_controller::state::SessionsState;
use actix_web::{web, HttpResponse};
use common::requests::{ItemAppended, SetValueRequest};
use log::debug;

/// `PUT /api/sessions/{session_id}/fields/{name}`
pub async fn set_value(
    sessions: web::Data<SessionsState>,
    path: web::Path<(String, String)>,
    body: web::Json<SetValueRequest>,
) -> Result<HttpResponse, EngineError> {
    let (session_id, name) = path.into_inner();
    let view = sessions
        .with_session(&session_id, |session| {
            session.state_mut().set_scalar(&name, &body.value)?;
            Ok(snapshot_view(&session_id, session))
        })
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

/// `POST /api/sessions/{session_id}/fields/{name}/items`
pub async fn append_item(
    sessions: web::Data<SessionsState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, EngineError> {
    let (session_id, name) = path.into_inner();
    let len = sessions
        .with_session(&session_id, |session| {
            session.state_mut().append_repeating_item(&name)
        })
        .await?;
    let index = len - 1;
    debug!("Session {}: '{}' item {} appended", session_id, name, index);
    Ok(HttpResponse::Created().json(ItemAppended { index }))
}

/// `PUT /api/sessions/{session_id}/fields/{name}/items/{index}`
pub async fn set_item(
    sessions: web::Data<SessionsState>,
    path: web::Path<(String, String, usize)>,
    body: web::Json<SetValueRequest>,
) -> Result<HttpResponse, EngineError> {
    let (session_id, name, index) = path.into_inner();
    let view = sessions
        .with_session(&session_id, |session| {
            session
                .state_mut()
                .set_repeating_item(&name, index, &body.value)?;
            Ok(snapshot_view(&session_id, session))
        })
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

/// `DELETE /api/sessions/{session_id}/fields/{name}/items/{index}`
pub async fn remove_item(
    sessions: web::Data<SessionsState>,
    path: web::Path<(String, String, usize)>,
) -> Result<HttpResponse, EngineError> {
    let (session_id, name, index) = path.into_inner();
    let view = sessions
        .with_session(&session_id, |session| {
            session.state_mut().remove_repeating_item(&name, index)?;
            Ok(snapshot_view(&session_id, session))
        })
        .await?;
    Ok(HttpResponse::Ok().json(view))
}
