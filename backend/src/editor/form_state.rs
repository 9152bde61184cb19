//! Field values of the letter being edited.
//!
//! `FormState` owns one `FieldValue` per declared field and refuses any write
//! that would make a value disagree with its field kind. It is a plain value:
//! the session wraps it with the generation counter and the shared-state
//! plumbing lives in `session_controller`.

use crate::error::EngineError;
use common::model::field::{FieldKind, FieldSpec, FieldValue};
use common::model::template::TemplateDefinition;
use common::requests::ValidationReport;
use std::collections::HashMap;
use std::sync::Arc;

/// Message attached to each missing required field.
pub const REQUIRED_MESSAGE: &str = "Field ini wajib diisi";

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    template: Arc<TemplateDefinition>,
    values: HashMap<String, FieldValue>,
}

impl FormState {
    /// Fresh form with every field at its schema default.
    pub fn for_template(template: Arc<TemplateDefinition>) -> Self {
        let values = defaults(&template);
        Self { template, values }
    }

    pub fn template(&self) -> &Arc<TemplateDefinition> {
        &self.template
    }

    /// Restores every field to its default; repeating fields go back to four
    /// empty items whatever their current length.
    pub fn reset(&mut self) {
        self.values = defaults(&self.template);
    }

    /// Looks up a field declaration, failing with `UnknownField`.
    pub fn field_spec(&self, name: &str) -> Result<&FieldSpec, EngineError> {
        self.template
            .find_field(name)
            .ok_or_else(|| EngineError::UnknownField(name.to_string()))
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Writes a `text`, `textarea` or `date` field.
    pub fn set_scalar(&mut self, name: &str, value: &str) -> Result<(), EngineError> {
        let spec = self.field_spec(name)?;
        if !spec.kind.is_scalar() {
            return Err(kind_mismatch(spec, "text, textarea or date"));
        }
        self.values
            .insert(name.to_string(), FieldValue::Scalar(value.to_string()));
        Ok(())
    }

    pub fn set_repeating_item(
        &mut self,
        name: &str,
        index: usize,
        value: &str,
    ) -> Result<(), EngineError> {
        let items = self.repeating_items_mut(name)?;
        let len = items.len();
        let slot = items.get_mut(index).ok_or(EngineError::IndexOutOfRange {
            field: name.to_string(),
            index,
            len,
        })?;
        *slot = value.to_string();
        Ok(())
    }

    /// Appends an empty item and returns the new length.
    pub fn append_repeating_item(&mut self, name: &str) -> Result<usize, EngineError> {
        let items = self.repeating_items_mut(name)?;
        items.push(String::new());
        Ok(items.len())
    }

    /// Removes one item; the remaining items keep their relative order.
    pub fn remove_repeating_item(&mut self, name: &str, index: usize) -> Result<String, EngineError> {
        let items = self.repeating_items_mut(name)?;
        if index >= items.len() {
            return Err(EngineError::IndexOutOfRange {
                field: name.to_string(),
                index,
                len: items.len(),
            });
        }
        Ok(items.remove(index))
    }

    /// Checks that `name` is a file field. Called before a conversion starts.
    pub fn ensure_file_field(&self, name: &str) -> Result<(), EngineError> {
        let spec = self.field_spec(name)?;
        if spec.kind != FieldKind::File {
            return Err(kind_mismatch(spec, "file"));
        }
        Ok(())
    }

    /// Stores a resolved attachment data URI.
    pub fn set_attachment(&mut self, name: &str, data_uri: String) -> Result<(), EngineError> {
        self.ensure_file_field(name)?;
        self.values
            .insert(name.to_string(), FieldValue::Attachment(Some(data_uri)));
        Ok(())
    }

    /// Required fields whose value is blank, missing, or an empty list, in
    /// declaration order. An empty result means the form is ready to submit.
    pub fn validate(&self) -> Vec<&FieldSpec> {
        self.template
            .field_specs
            .iter()
            .filter(|spec| spec.required)
            .filter(|spec| self.values.get(&spec.name).map_or(true, FieldValue::is_empty))
            .collect()
    }

    /// `validate` keyed by field name, as sent to the operator.
    pub fn validation_report(&self) -> ValidationReport {
        ValidationReport {
            errors: self
                .validate()
                .into_iter()
                .map(|spec| (spec.name.clone(), REQUIRED_MESSAGE.to_string()))
                .collect(),
        }
    }

    /// Text value of a scalar field, or an empty string.
    pub fn scalar(&self, name: &str) -> &str {
        self.values
            .get(name)
            .and_then(FieldValue::as_scalar)
            .unwrap_or_default()
    }

    fn repeating_items_mut(&mut self, name: &str) -> Result<&mut Vec<String>, EngineError> {
        let spec = self.field_spec(name)?;
        if spec.kind != FieldKind::RepeatingText {
            return Err(kind_mismatch(spec, "repeating_text"));
        }
        let default = spec.default_value();
        let field = spec.name.clone();
        let actual = spec.kind.as_str();
        match self.values.entry(name.to_string()).or_insert(default) {
            FieldValue::RepeatingList(items) => Ok(items),
            _ => Err(EngineError::InvalidFieldKind {
                field,
                expected: "repeating_text",
                actual,
            }),
        }
    }
}

fn defaults(template: &TemplateDefinition) -> HashMap<String, FieldValue> {
    template
        .field_specs
        .iter()
        .map(|spec| (spec.name.clone(), spec.default_value()))
        .collect()
}

fn kind_mismatch(spec: &FieldSpec, expected: &'static str) -> EngineError {
    EngineError::InvalidFieldKind {
        field: spec.name.clone(),
        expected,
        actual: spec.kind.as_str(),
    }
}
