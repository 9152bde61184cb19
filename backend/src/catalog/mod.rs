//! # Template Catalog
//!
//! Read-only arena of letter templates, built once at startup and injected
//! into the application state. Construction is where template-authoring
//! defects surface:
//! - duplicate template ids or field names,
//! - body tokens without a field declaration,
//! - metadata mappings naming undeclared fields.
//!
//! Bracket-syntax templates are migrated to the canonical mustache syntax on
//! the way in, so everything downstream sees `{{field}}` tokens.

mod builtin;

use crate::error::EngineError;
use crate::substitution::{check_declared, migrate_to_mustache, mustache_names};
use common::model::template::{TemplateDefinition, TokenSyntax};
use log::{debug, info};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<Arc<TemplateDefinition>>,
}

impl TemplateCatalog {
    pub fn new(templates: Vec<TemplateDefinition>) -> Result<Self, EngineError> {
        let mut ids = HashSet::new();
        let mut loaded = Vec::with_capacity(templates.len());

        for template in templates {
            if !ids.insert(template.id.clone()) {
                return Err(EngineError::DuplicateTemplate(template.id));
            }
            check_fields(&template)?;
            check_declared(&template)?;

            let template = if template.token_syntax == TokenSyntax::Bracket {
                debug!("Migrating template '{}' to mustache tokens", template.id);
                migrate_to_mustache(&template)
            } else {
                template
            };

            for name in template.metadata.field_names() {
                if template.find_field(name).is_none() {
                    return Err(EngineError::UnknownField(format!("{}.{}", template.id, name)));
                }
            }

            let referenced: HashSet<&str> = mustache_names(&template.body).into_iter().collect();
            for spec in &template.field_specs {
                if !referenced.contains(spec.name.as_str()) {
                    debug!(
                        "Template '{}': field '{}' only feeds submission metadata",
                        template.id, spec.name
                    );
                }
            }

            loaded.push(Arc::new(template));
        }

        info!("Template catalog loaded with {} templates", loaded.len());
        Ok(Self { templates: loaded })
    }

    /// The letters shipped with the service.
    pub fn builtin() -> Result<Self, EngineError> {
        Self::new(builtin::templates())
    }

    pub fn get(&self, id: &str) -> Result<Arc<TemplateDefinition>, EngineError> {
        self.templates
            .iter()
            .find(|template| template.id == id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownTemplate(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<TemplateDefinition>> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Field names must be unique; bracket templates also need unique labels.
fn check_fields(template: &TemplateDefinition) -> Result<(), EngineError> {
    let mut names = HashSet::new();
    let mut labels = HashSet::new();
    for spec in &template.field_specs {
        let label_clash =
            template.token_syntax == TokenSyntax::Bracket && !labels.insert(spec.label.as_str());
        if !names.insert(spec.name.as_str()) || label_clash {
            return Err(EngineError::DuplicateField {
                template: template.id.clone(),
                field: spec.name.clone(),
            });
        }
    }
    Ok(())
}
