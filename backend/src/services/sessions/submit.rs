//! # Letter Submission
//!
//! `POST /api/sessions/{session_id}/submit`
//!
//! ## Workflow
//!
//! 1.  **Validate**: an incomplete form answers `422` with the
//!     `ValidationReport`; nothing is rendered or sent.
//! 2.  **Artifact**: the artifact retained from a failed attempt is reused
//!     when the form has not been edited since; otherwise the form is rendered.
//! 3.  **Submit**: the encoder posts the PDF and its metadata with the
//!     operator's bearer credential.
//! 4.  **Outcome**: success answers `{success: true, message}`, consumes
//!     the artifact and closes the session. A failure hands the artifact back to the session for the
//!     next attempt and answers `502` with the endpoint's message.

use super::{form_snapshot, render_letter};
use crate::config::Settings;
use crate::error::EngineError;
use crate::render::Rasterizer;
use crate::services::forwarded_credential;
use crate::session_controller::state::SessionsState;
use crate::submission::{SubmissionEncoder, SubmissionError};
use actix_web::{web, HttpRequest, HttpResponse};
use common::requests::SubmissionOutcome;
use log::{debug, info, warn};

pub async fn process(
    req: HttpRequest,
    sessions: web::Data<SessionsState>,
    rasterizer: web::Data<Rasterizer>,
    encoder: web::Data<SubmissionEncoder>,
    settings: web::Data<Settings>,
    session_id: web::Path<String>,
) -> Result<HttpResponse, EngineError> {
    let state = form_snapshot(&sessions, &session_id).await?;
    let report = state.validation_report();
    if !report.is_ready() {
        return Ok(HttpResponse::UnprocessableEntity().json(report));
    }

    let retained = sessions
        .with_session(&session_id, |session| Ok(session.take_retained_artifact()))
        .await?;
    let artifact = match retained {
        Some(artifact) => {
            debug!("Resending retained '{}'", artifact.file_name);
            artifact
        }
        None => render_letter(&rasterizer, &state).await?,
    };

    let credential = forwarded_credential(&req, &settings);
    match encoder.submit(artifact, &state, &credential).await {
        Ok(receipt) => {
            info!("Session {} submitted '{}'", session_id, receipt.file_name);
            if let Err(e) = sessions.close(&session_id).await {
                debug!("Session {} already gone after submit: {}", session_id, e);
            }
            Ok(HttpResponse::Ok().json(SubmissionOutcome {
                success: true,
                message: receipt.message,
            }))
        }
        Err(failure) => {
            // an edit made while the letter was in flight outdates the artifact
            let _ = sessions
                .with_session(&session_id, |session| {
                    if session.state() == &state {
                        session.retain_artifact(failure.artifact);
                    }
                    Ok(())
                })
                .await;
            match failure.error {
                SubmissionError::Incomplete(report) => {
                    Ok(HttpResponse::UnprocessableEntity().json(report))
                }
                SubmissionError::Failed(e) => {
                    warn!("Submission from session {} failed: {}", session_id, e);
                    Err(e)
                }
            }
        }
    }
}
