use crate::catalog::TemplateCatalog;
use actix_web::{web, HttpResponse, Responder};
use common::model::template::TemplateSummary;

/// Actix web handler for `GET /api/templates`.
pub async fn process(catalog: web::Data<TemplateCatalog>) -> impl Responder {
    let summaries: Vec<TemplateSummary> = catalog
        .iter()
        .map(|template| TemplateSummary::from(template.as_ref()))
        .collect();
    HttpResponse::Ok().json(summaries)
}
