//! `@tag` annotation parser for a single comment block.

use crate::model::{Diagnostic, DiagnosticKind, PatternRecord, Tag, Variant, VariantKind};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static RE_TAG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z][A-Za-z0-9_-]*)(?:[[:blank:]]+(.*))?$").unwrap());

/// What to do with a comment block that has body text but no recognized tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UntaggedBlocks {
    /// Not a pattern block (copyright headers, inline notes).
    #[default]
    Drop,
    /// Kept as a body-only record.
    Keep,
}

/// A recognized tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Annotation {
    Single(Tag),
    Variant(VariantKind),
}

impl Annotation {
    /// Case-sensitive lookup in the fixed vocabulary.
    fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "title" => Annotation::Single(Tag::Title),
            "description" => Annotation::Single(Tag::Description),
            "usage" => Annotation::Single(Tag::Usage),
            "example" => Annotation::Single(Tag::Example),
            "private" => Annotation::Single(Tag::Private),
            "deprecated" => Annotation::Single(Tag::Deprecated),
            "modifier" => Annotation::Variant(VariantKind::Modifier),
            "state" => Annotation::Variant(VariantKind::State),
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            Annotation::Single(tag) => tag.name(),
            Annotation::Variant(VariantKind::Modifier) => "modifier",
            Annotation::Variant(VariantKind::State) => "state",
        }
    }

    fn requires_value(self) -> bool {
        !matches!(self, Annotation::Single(tag) if tag.is_flag())
    }
}

/// A tag being accumulated, with its continuation lines.
struct OpenTag {
    annotation: Annotation,
    line: usize,
    parts: Vec<String>,
}

impl OpenTag {
    fn value(&self) -> String {
        self.parts.join(" ")
    }
}

/// The result of annotating one block.
#[derive(Debug, Default)]
pub struct Annotated {
    /// `None` when the block is not a pattern block.
    pub record: Option<PatternRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse one comment block's text (delimiters already stripped).
///
/// `first_line` is the source line the block text starts on; it is only
/// used to place diagnostics.
pub fn annotate(text: &str, first_line: usize, policy: UntaggedBlocks) -> Annotated {
    let mut record = PatternRecord::default();
    let mut diagnostics = Vec::new();
    let mut body: Vec<&str> = Vec::new();
    let mut current: Option<OpenTag> = None;
    let mut recognized = 0usize;

    for (offset, raw_line) in text.lines().enumerate() {
        let line = strip_continuation_marker(raw_line);

        // Tag markers may be indented past the `*`; body lines keep theirs.
        if let Some(caps) = RE_TAG_LINE.captures(line.trim_start()) {
            if let Some(annotation) = Annotation::lookup(&caps[1]) {
                if let Some(open) = current.take() {
                    close_tag(open, &mut record, &mut diagnostics);
                }
                recognized += 1;
                let rest = caps.get(2).map_or("", |m| m.as_str()).trim();
                current = Some(OpenTag {
                    annotation,
                    line: first_line + offset,
                    parts: if rest.is_empty() {
                        Vec::new()
                    } else {
                        vec![rest.to_string()]
                    },
                });
                continue;
            }
            // Unknown tag: ends the open tag and falls through to the body.
            if let Some(open) = current.take() {
                close_tag(open, &mut record, &mut diagnostics);
            }
            body.push(line);
            continue;
        }

        match current {
            Some(ref mut open) => {
                let part = line.trim();
                if !part.is_empty() {
                    open.parts.push(part.to_string());
                }
            }
            None => body.push(line),
        }
    }

    if let Some(open) = current.take() {
        close_tag(open, &mut record, &mut diagnostics);
    }

    record.body = body.join("\n").trim().to_string();

    let is_pattern = match policy {
        _ if recognized > 0 => true,
        UntaggedBlocks::Keep => !record.body.is_empty(),
        UntaggedBlocks::Drop => false,
    };

    Annotated {
        record: is_pattern.then_some(record),
        diagnostics,
    }
}

fn close_tag(open: OpenTag, record: &mut PatternRecord, diagnostics: &mut Vec<Diagnostic>) {
    let value = open.value();
    if value.is_empty() && open.annotation.requires_value() {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::EmptyTag,
            Some(open.line),
            format!("empty @{} tag", open.annotation.name()),
        ));
    }

    match open.annotation {
        Annotation::Single(tag) => {
            if record.tags.insert(tag, value).is_some() {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::DuplicateTag,
                    Some(open.line),
                    format!("duplicate @{} tag; the later value is kept", tag),
                ));
            }
        }
        Annotation::Variant(kind) => {
            let (name, description) = match value.split_once(char::is_whitespace) {
                Some((name, rest)) => (name.to_string(), rest.trim().to_string()),
                None => (value, String::new()),
            };
            record.variants.push(Variant {
                kind,
                name,
                description,
            });
        }
    }
}

/// Strip leading whitespace and one conventional `*` (plus one space after it).
fn strip_continuation_marker(line: &str) -> &str {
    let line = line.trim_start();
    match line.strip_prefix('*') {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest).trim_end(),
        None => line.trim_end(),
    }
}
