use crate::catalog::TemplateCatalog;
use crate::error::EngineError;
use actix_web::{web, HttpResponse};

/// Actix web handler for `GET /api/templates/{template_id}`.
///
/// # Returns
/// - `200 OK` with the `TemplateDefinition` as JSON.
/// - `404 Not Found` when the catalog has no such template.
pub async fn process(
    catalog: web::Data<TemplateCatalog>,
    template_id: web::Path<String>,
) -> Result<HttpResponse, EngineError> {
    let template = catalog.get(&template_id)?;
    Ok(HttpResponse::Ok().json(template.as_ref()))
}
