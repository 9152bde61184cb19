//! Line-based letter markup.
//!
//! Each line of a substituted body becomes one `Block`. An optional alignment
//! prefix (`= ` center, `> ` right) comes first, then the block marker.
//! A backslash in place of the block marker makes the rest of the line a
//! plain paragraph, which is how typed field text is kept out of the markup.

use std::borrow::Cow;

/// Line prefixes that select something other than a plain paragraph.
const BLOCK_MARKERS: [&str; 6] = ["\\", "- ", "= ", "> ", "# ", "[img:"];

/// Inline styles detected inside a text line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextStyle {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    pub text: String,
    pub style: TextStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Blank,
    Rule,
    Heading { align: Align, segments: Vec<TextSegment> },
    Paragraph { align: Align, segments: Vec<TextSegment> },
    ListItem(Vec<TextSegment>),
    /// `source` is the raw text between `[img:` and `]`, normally a data URI.
    Image { align: Align, source: String },
}

/// Escapes `line` so that it parses as a plain paragraph when it begins a
/// block. Lines that already would are returned unchanged.
pub fn escape_line(line: &str) -> Cow<'_, str> {
    let is_marked = line.trim_end() == "---"
        || BLOCK_MARKERS.iter().any(|marker| line.starts_with(marker));
    if is_marked {
        Cow::Owned(format!("\\{}", line))
    } else {
        Cow::Borrowed(line)
    }
}

pub fn parse_markup(markup: &str) -> Vec<Block> {
    markup.lines().map(parse_line).collect()
}

fn parse_line(line: &str) -> Block {
    if line.trim().is_empty() {
        return Block::Blank;
    }
    if let Some(literal) = line.strip_prefix('\\') {
        return Block::Paragraph {
            align: Align::Left,
            segments: parse_styles(literal),
        };
    }
    if line.trim_end() == "---" {
        return Block::Rule;
    }
    if let Some(item) = line.strip_prefix("- ") {
        return Block::ListItem(parse_styles(item));
    }

    let (align, rest) = if let Some(rest) = line.strip_prefix("= ") {
        (Align::Center, rest)
    } else if let Some(rest) = line.strip_prefix("> ") {
        (Align::Right, rest)
    } else {
        (Align::Left, line)
    };
    if let Some(literal) = rest.strip_prefix('\\') {
        return Block::Paragraph {
            align,
            segments: parse_styles(literal),
        };
    }

    let trimmed = rest.trim_end();
    if trimmed.starts_with("[img:") && trimmed.ends_with(']') {
        let source = &trimmed[5..trimmed.len() - 1];
        return Block::Image {
            align,
            source: source.to_string(),
        };
    }
    if let Some(heading) = rest.strip_prefix("# ") {
        return Block::Heading {
            align,
            segments: parse_styles(heading),
        };
    }
    Block::Paragraph {
        align,
        segments: parse_styles(rest),
    }
}

/// Parses `***bold italic***`, `**bold**` and `*italic*` runs.
///
/// A marker without a closing counterpart is kept as literal text.
pub fn parse_styles(line: &str) -> Vec<TextSegment> {
    const MARKERS: [(&str, TextStyle); 3] = [
        ("***", TextStyle::BoldItalic),
        ("**", TextStyle::Bold),
        ("*", TextStyle::Italic),
    ];

    let mut segments = Vec::new();
    let mut plain = String::new();
    let mut rest = line;

    'scan: while !rest.is_empty() {
        if rest.starts_with('*') {
            for (marker, style) in MARKERS {
                let Some(inner) = rest.strip_prefix(marker) else {
                    continue;
                };
                match inner.find(marker) {
                    Some(end) if end > 0 => {
                        flush_plain(&mut segments, &mut plain);
                        segments.push(TextSegment {
                            text: inner[..end].to_string(),
                            style,
                        });
                        rest = &inner[end + marker.len()..];
                        continue 'scan;
                    }
                    _ => {}
                }
            }
            plain.push('*');
            rest = &rest[1..];
            continue;
        }

        let next = rest.find('*').unwrap_or(rest.len());
        plain.push_str(&rest[..next]);
        rest = &rest[next..];
    }

    flush_plain(&mut segments, &mut plain);
    segments
}

fn flush_plain(segments: &mut Vec<TextSegment>, plain: &mut String) {
    if !plain.is_empty() {
        segments.push(TextSegment {
            text: std::mem::take(plain),
            style: TextStyle::Regular,
        });
    }
}
