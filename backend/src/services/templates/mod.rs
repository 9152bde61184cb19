//! # Template Service Module
//!
//! Read-only access to the template catalog under `/api/templates`.
//!
//! ## Sub-modules:
//! - `list`: summaries of every template, for the template picker.
//! - `get`: one full template definition, including its field schema.

mod get;
mod list;

use actix_web::web::{get, scope};
use actix_web::Scope;

/// The base path for all template-related API endpoints.
const API_PATH: &str = "/api/templates";

/// Configures and returns the Actix `Scope` for all template-related routes.
///
/// # Registered Routes:
///
/// *   **`GET ""`**:
///     - **Handler**: `list::process`
///     - **Description**: Lists every template as a `TemplateSummary` (id, name,
///       category, description, creation date), in catalog order.
///
/// *   **`GET /{template_id}`**:
///     - **Handler**: `get::process`
///     - **Description**: Returns the complete `TemplateDefinition`: field specs
///       in declaration order, the canonical mustache body and the metadata mapping.
///       Unknown ids answer `404`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::process))
        .route("/{template_id}", get().to(get::process))
}
