//! Placeholder substitution: turns a template body plus a form snapshot into
//! the final letter markup.
//!
//! The result is a pure function of its inputs and is recomputed for every
//! preview. Empty fields render as their fallback label so a half-filled
//! letter stays legible; a raw token never reaches the operator. Typed text
//! is escaped wherever it would otherwise begin a markup block, so a value can
//! never turn into a heading, a rule or an image.

mod tokens;

pub use tokens::{check_declared, migrate_to_mustache, mustache_names};

use crate::editor::FormState;
use crate::error::EngineError;
use crate::locale::{format_long_date, parse_date_value, Locale};
use crate::render::markup::escape_line;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use common::model::field::{FieldKind, FieldSpec, FieldValue};
use image::{ImageFormat, Rgba, RgbaImage};
use log::warn;
use once_cell::sync::Lazy;
use std::io::Cursor;

/// Markup prefix of one repeating-field entry.
pub const ITEM_PREFIX: &str = "- ";

const PLACEHOLDER_WIDTH: u32 = 400;
const PLACEHOLDER_HEIGHT: u32 = 160;

/// Data URI of the image shown in place of a missing attachment: a light
/// grey box with a darker frame.
pub static PLACEHOLDER_IMAGE: Lazy<String> = Lazy::new(|| {
    let frame = Rgba([170, 170, 170, 255]);
    let fill = Rgba([238, 238, 238, 255]);
    let img = RgbaImage::from_fn(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT, |x, y| {
        let border = x < 3 || y < 3 || x >= PLACEHOLDER_WIDTH - 3 || y >= PLACEHOLDER_HEIGHT - 3;
        if border {
            frame
        } else {
            fill
        }
    });
    let mut png = Cursor::new(Vec::new());
    match img.write_to(&mut png, ImageFormat::Png) {
        Ok(()) => format!("data:image/png;base64,{}", BASE64.encode(png.into_inner())),
        Err(e) => {
            warn!("Could not encode placeholder image: {}", e);
            String::new()
        }
    }
});

/// Substitutes every token of the session's template.
///
/// Fails only with `UnresolvedTemplateToken`, when the body names a field
/// the schema does not declare.
pub fn substitute(state: &FormState, locale: Locale) -> Result<String, EngineError> {
    tokens::replace_tokens_at(state.template(), |spec, at_block_start| {
        resolve_field(spec, state.value(&spec.name), locale, at_block_start)
    })
}

fn resolve_field(
    spec: &FieldSpec,
    value: Option<&FieldValue>,
    locale: Locale,
    at_block_start: bool,
) -> String {
    match (spec.kind, value) {
        (FieldKind::Date, Some(FieldValue::Scalar(raw))) if !raw.trim().is_empty() => {
            match parse_date_value(raw) {
                Some(date) => format_long_date(date, locale),
                None => {
                    warn!("Field '{}' holds a non-ISO date '{}'", spec.name, raw);
                    escape_text(raw, at_block_start)
                }
            }
        }
        (_, Some(FieldValue::Scalar(raw))) if !raw.trim().is_empty() => {
            escape_text(raw, at_block_start)
        }
        (_, Some(FieldValue::RepeatingList(items))) if !items.is_empty() => items
            .iter()
            .map(|item| format!("{}{}", ITEM_PREFIX, escape_text(item, false)))
            .collect::<Vec<_>>()
            .join("\n"),
        (_, Some(FieldValue::Attachment(Some(uri)))) => uri.clone(),
        (FieldKind::File, _) => PLACEHOLDER_IMAGE.clone(),
        _ => spec.fallback_label(),
    }
}

/// Escapes every line of `text` that begins a block. The first line only
/// does so when the token itself sits at a block start.
fn escape_text(text: &str, at_block_start: bool) -> String {
    text.split('\n')
        .enumerate()
        .map(|(i, line)| {
            if i > 0 || at_block_start {
                escape_line(line)
            } else {
                line.into()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
