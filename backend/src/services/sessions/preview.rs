//! Live preview. Both handlers recompute from the current values on every
//! call; nothing is cached.

use super::form_snapshot;
use crate::error::EngineError;
use crate::locale::Locale;
use crate::render::Rasterizer;
use crate::session_controller::state::SessionsState;
use crate::substitution::substitute;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    #[serde(default)]
    locale: Locale,
}

/// `GET /api/sessions/{session_id}/preview`: substituted markup.
pub async fn markup(
    sessions: web::Data<SessionsState>,
    session_id: web::Path<String>,
    query: web::Query<PreviewQuery>,
) -> Result<HttpResponse, EngineError> {
    let state = form_snapshot(&sessions, &session_id).await?;
    let markup = substitute(&state, query.locale)?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(markup))
}

/// `GET /api/sessions/{session_id}/preview.png`: the page as it will be printed.
pub async fn raster(
    sessions: web::Data<SessionsState>,
    rasterizer: web::Data<Rasterizer>,
    session_id: web::Path<String>,
    query: web::Query<PreviewQuery>,
) -> Result<HttpResponse, EngineError> {
    let state = form_snapshot(&sessions, &session_id).await?;
    let markup = substitute(&state, query.locale)?;
    let png = rasterizer.render_preview(markup).await?;
    Ok(HttpResponse::Ok().content_type("image/png").body(png))
}
