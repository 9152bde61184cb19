use serde::{Deserialize, Serialize};

/// Number of empty items a repeating field starts with after select or reset.
pub const REPEATING_DEFAULT_LEN: usize = 4;

/// The kind of input a template field accepts.
///
/// The kind decides which `FieldValue` variant the field holds and how the
/// substitution engine renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Textarea,
    /// ISO `YYYY-MM-DD`, rendered in long locale form.
    Date,
    /// Binary upload (signature image), stored as a data URI.
    File,
    /// Operator-sized list of text items.
    RepeatingText,
}

impl FieldKind {
    /// Scalar kinds are the ones accepted by `set_scalar`.
    pub fn is_scalar(self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::Textarea | FieldKind::Date)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Date => "date",
            FieldKind::File => "file",
            FieldKind::RepeatingText => "repeating_text",
        }
    }
}

/// Declaration of one named, typed input slot within a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Unique key within the template; also the mustache token name.
    pub name: String,
    /// Human label; also the bracket token text.
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    /// Accept filter for file inputs (e.g. `image/*`). A UI hint only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept_filter: Option<String>,
    /// Text shown in place of an empty value. Defaults to `[<label>]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl FieldSpec {
    pub fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required: false,
            accept_filter: None,
            fallback: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn accept(mut self, filter: &str) -> Self {
        self.accept_filter = Some(filter.to_string());
        self
    }

    pub fn with_fallback(mut self, fallback: &str) -> Self {
        self.fallback = Some(fallback.to_string());
        self
    }

    /// Text substituted when the field is empty.
    pub fn fallback_label(&self) -> String {
        self.fallback
            .clone()
            .unwrap_or_else(|| format!("[{}]", self.label))
    }

    /// The value a fresh form holds for this field.
    pub fn default_value(&self) -> FieldValue {
        match self.kind {
            FieldKind::Text | FieldKind::Textarea | FieldKind::Date => {
                FieldValue::Scalar(String::new())
            }
            FieldKind::RepeatingText => {
                FieldValue::RepeatingList(vec![String::new(); REPEATING_DEFAULT_LEN])
            }
            FieldKind::File => FieldValue::Attachment(None),
        }
    }
}

/// Current value of one field.
///
/// The variant always matches the declaring `FieldSpec::kind`; the form state
/// manager refuses writes that would break that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Scalar(String),
    RepeatingList(Vec<String>),
    /// `data:<mime>;base64,<payload>`, `None` until a conversion resolves.
    Attachment(Option<String>),
}

impl FieldValue {
    /// Empty means blank text, no attachment, or a list with no items.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Scalar(s) => s.trim().is_empty(),
            FieldValue::RepeatingList(items) => items.is_empty(),
            FieldValue::Attachment(value) => value.is_none(),
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(s) => Some(s),
            _ => None,
        }
    }
}
