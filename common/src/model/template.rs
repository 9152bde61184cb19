use crate::model::field::FieldSpec;
use serde::{Deserialize, Serialize};

/// Placeholder convention used by a template body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSyntax {
    /// `{{field_name}}`
    #[default]
    Mustache,
    /// `[Field Label]`
    Bracket,
}

/// Which form fields feed each entry of the fixed submission schema.
///
/// `tanggal_kirim` has no entry of its own: it always mirrors the letter date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataMapping {
    pub number_field: String,
    pub date_field: String,
    pub recipient_field: String,
    pub subject_field: String,
    pub division_field: String,
    pub remarks_field: String,
}

impl MetadataMapping {
    /// Mapping with the conventional field names for number, date, subject
    /// and division; recipient and remarks differ per template.
    pub fn conventional(recipient_field: &str, remarks_field: &str) -> Self {
        Self {
            number_field: "nomor_surat".to_string(),
            date_field: "tanggal_surat".to_string(),
            recipient_field: recipient_field.to_string(),
            subject_field: "perihal".to_string(),
            division_field: "divisi".to_string(),
            remarks_field: remarks_field.to_string(),
        }
    }

    pub fn field_names(&self) -> [&str; 6] {
        [
            self.number_field.as_str(),
            self.date_field.as_str(),
            self.recipient_field.as_str(),
            self.subject_field.as_str(),
            self.division_field.as_str(),
            self.remarks_field.as_str(),
        ]
    }
}

/// A reusable letter layout: typed field schema plus marked-up body.
///
/// Immutable once loaded into the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub created_date: String,
    #[serde(default)]
    pub token_syntax: TokenSyntax,
    pub field_specs: Vec<FieldSpec>,
    pub body: String,
    pub metadata: MetadataMapping,
}

impl TemplateDefinition {
    /// Looks up a field declaration by its unique name.
    pub fn find_field(&self, name: &str) -> Option<&FieldSpec> {
        self.field_specs.iter().find(|spec| spec.name == name)
    }
}

/// Catalog listing entry, without the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub created_date: String,
}

impl From<&TemplateDefinition> for TemplateSummary {
    fn from(template: &TemplateDefinition) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            category: template.category.clone(),
            description: template.description.clone(),
            created_date: template.created_date.clone(),
        }
    }
}
