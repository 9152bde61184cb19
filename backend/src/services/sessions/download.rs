use super::{form_snapshot, render_letter};
use crate::config::Settings;
use crate::error::EngineError;
use crate::render::Rasterizer;
use crate::session_controller::state::SessionsState;
use crate::submission::download_to_dir;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use common::requests::DownloadQuery;

/// `GET /api/sessions/{session_id}/download`
///
/// Renders the current form and answers the PDF as an attachment named
/// `surat-<template_id>.pdf`. An incomplete form answers `422` with the
/// `ValidationReport` and is not rendered; use the preview routes to look at a
/// half-filled letter.
pub async fn process(
    sessions: web::Data<SessionsState>,
    rasterizer: web::Data<Rasterizer>,
    settings: web::Data<Settings>,
    session_id: web::Path<String>,
    query: web::Query<DownloadQuery>,
) -> Result<HttpResponse, EngineError> {
    let state = form_snapshot(&sessions, &session_id).await?;
    let report = state.validation_report();
    if !report.is_ready() {
        return Ok(HttpResponse::UnprocessableEntity().json(report));
    }

    let artifact = render_letter(&rasterizer, &state).await?;
    if query.save {
        download_to_dir(&artifact, &settings.download_dir).await?;
    }

    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(artifact.file_name.clone())],
    };
    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(disposition)
        .body(artifact.bytes))
}
