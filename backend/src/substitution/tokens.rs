//! Token scanning for the two placeholder syntaxes.
//!
//! Only exact tokens are rewritten: a mustache token is `{{` + identifier + `}}`
//! with no inner whitespace, a bracket token is `[` + a declared label + `]`.
//! Replacement is a single pass, so text coming from field values is never
//! scanned again.

use crate::error::EngineError;
use common::model::field::FieldSpec;
use common::model::template::{TemplateDefinition, TokenSyntax};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static MUSTACHE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{([A-Za-z_][A-Za-z0-9_]*)\}\}").expect("mustache token pattern is valid")
});

/// Builds the bracket pattern for a template: longest labels first so that
/// `[Tanggal Surat Masuk]` wins over `[Tanggal Surat]`.
fn bracket_regex(specs: &[FieldSpec]) -> Option<Regex> {
    let mut labels: Vec<&str> = specs.iter().map(|spec| spec.label.as_str()).collect();
    if labels.is_empty() {
        return None;
    }
    labels.sort_by_key(|label| std::cmp::Reverse(label.len()));
    let alternatives = labels
        .iter()
        .map(|label| regex::escape(label))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\[({})\]", alternatives)).ok()
}

/// Names of every mustache token in `body`, in order of appearance.
pub fn mustache_names(body: &str) -> Vec<&str> {
    MUSTACHE_RE
        .captures_iter(body)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Fails with `UnresolvedTemplateToken` for the first mustache token whose
/// name is not declared. Bracket bodies cannot reference undeclared fields:
/// unknown bracketed text is ordinary text.
pub fn check_declared(template: &TemplateDefinition) -> Result<(), EngineError> {
    if template.token_syntax == TokenSyntax::Bracket {
        return Ok(());
    }
    for name in mustache_names(&template.body) {
        if template.find_field(name).is_none() {
            return Err(EngineError::UnresolvedTemplateToken {
                template: template.id.clone(),
                token: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Replaces every declared token in the template body with `resolve(spec)`.
pub fn replace_tokens<F>(template: &TemplateDefinition, mut resolve: F) -> Result<String, EngineError>
where
    F: FnMut(&FieldSpec) -> String,
{
    replace_tokens_at(template, |spec, _| resolve(spec))
}

/// Like [`replace_tokens`], also telling `resolve` whether the token begins a
/// markup block: it starts its line, or follows only an alignment prefix.
pub fn replace_tokens_at<F>(template: &TemplateDefinition, mut resolve: F) -> Result<String, EngineError>
where
    F: FnMut(&FieldSpec, bool) -> String,
{
    check_declared(template)?;
    let body = &template.body;
    let at_block_start = |caps: &Captures| caps.get(0).map_or(false, |m| starts_block(body, m.start()));
    let replaced = match template.token_syntax {
        TokenSyntax::Mustache => MUSTACHE_RE
            .replace_all(body, |caps: &Captures| match template.find_field(&caps[1]) {
                Some(spec) => resolve(spec, at_block_start(caps)),
                // check_declared already rejected undeclared names
                None => caps[0].to_string(),
            })
            .into_owned(),
        TokenSyntax::Bracket => match bracket_regex(&template.field_specs) {
            Some(re) => re
                .replace_all(body, |caps: &Captures| {
                    match template
                        .field_specs
                        .iter()
                        .find(|spec| spec.label == caps[1])
                    {
                        Some(spec) => resolve(spec, at_block_start(caps)),
                        None => caps[0].to_string(),
                    }
                })
                .into_owned(),
            None => body.clone(),
        },
    };
    Ok(replaced)
}

fn starts_block(body: &str, at: usize) -> bool {
    let line_start = body[..at].rfind('\n').map_or(0, |i| i + 1);
    matches!(&body[line_start..at], "" | "= " | "> ")
}

/// Rewrites a bracket template into the canonical mustache form.
pub fn migrate_to_mustache(template: &TemplateDefinition) -> TemplateDefinition {
    if template.token_syntax == TokenSyntax::Mustache {
        return template.clone();
    }
    let body = match replace_tokens(template, |spec| format!("{{{{{}}}}}", spec.name)) {
        Ok(body) => body,
        Err(_) => template.body.clone(),
    };
    TemplateDefinition {
        token_syntax: TokenSyntax::Mustache,
        body,
        ..template.clone()
    }
}
