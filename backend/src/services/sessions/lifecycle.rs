use super::snapshot_view;
use crate::catalog::TemplateCatalog;
use crate::error::EngineError;
use crate::session_controller::state::SessionsState;
use actix_web::{web, HttpResponse};
use common::requests::{SelectTemplateRequest, SessionCreated};
use log::info;

/// `POST /api/sessions`
pub async fn open(
    catalog: web::Data<TemplateCatalog>,
    sessions: web::Data<SessionsState>,
    body: web::Json<SelectTemplateRequest>,
) -> Result<HttpResponse, EngineError> {
    let template = catalog.get(&body.template_id)?;
    let session_id = sessions.open(template).await;
    info!("Session {} opened on '{}'", session_id, body.template_id);
    Ok(HttpResponse::Created().json(SessionCreated { session_id }))
}

/// `GET /api/sessions/{session_id}`
pub async fn show(
    sessions: web::Data<SessionsState>,
    session_id: web::Path<String>,
) -> Result<HttpResponse, EngineError> {
    let view = sessions
        .with_session(&session_id, |session| Ok(snapshot_view(&session_id, session)))
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

/// `POST /api/sessions/{session_id}/select`
pub async fn select(
    catalog: web::Data<TemplateCatalog>,
    sessions: web::Data<SessionsState>,
    session_id: web::Path<String>,
    body: web::Json<SelectTemplateRequest>,
) -> Result<HttpResponse, EngineError> {
    let template = catalog.get(&body.template_id)?;
    let view = sessions
        .with_session(&session_id, |session| {
            session.select(template);
            Ok(snapshot_view(&session_id, session))
        })
        .await?;
    info!("Session {} switched to '{}'", session_id, body.template_id);
    Ok(HttpResponse::Ok().json(view))
}

/// `POST /api/sessions/{session_id}/reset`
pub async fn reset(
    sessions: web::Data<SessionsState>,
    session_id: web::Path<String>,
) -> Result<HttpResponse, EngineError> {
    let view = sessions
        .with_session(&session_id, |session| {
            session.reset();
            Ok(snapshot_view(&session_id, session))
        })
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

/// `DELETE /api/sessions/{session_id}`
///
/// Abandons the session. Its form, pending uploads and retained artifact are
/// dropped; uploads still converting are discarded when they finish.
pub async fn close(
    sessions: web::Data<SessionsState>,
    session_id: web::Path<String>,
) -> Result<HttpResponse, EngineError> {
    sessions.close(&session_id).await?;
    info!("Session {} closed", session_id);
    Ok(HttpResponse::NoContent().finish())
}
