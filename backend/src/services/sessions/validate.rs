use super::form_snapshot;
use crate::error::EngineError;
use crate::session_controller::state::SessionsState;
use actix_web::{web, HttpResponse};

/// `GET /api/sessions/{session_id}/validate`
///
/// # Returns
/// - `200 OK` with an empty report when every required field is filled.
/// - `422 Unprocessable Entity` with `{errors: {<field>: <message>}}` otherwise.
pub async fn process(
    sessions: web::Data<SessionsState>,
    session_id: web::Path<String>,
) -> Result<HttpResponse, EngineError> {
    let report = form_snapshot(&sessions, &session_id).await?.validation_report();
    if report.is_ready() {
        Ok(HttpResponse::Ok().json(report))
    } else {
        Ok(HttpResponse::UnprocessableEntity().json(report))
    }
}
