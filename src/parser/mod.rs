//! Parser module — comment extraction plus annotation, per syntax family.

pub mod annotation;
pub mod comments;
pub mod variables;

use crate::model::{Diagnostic, DiagnosticKind, PatternRecord};
use annotation::UntaggedBlocks;
use comments::SyntaxFamily;

/// Annotation dialect applied on top of the tag vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Standard,
    /// Also collects variable declarations from each block's code.
    Variable,
}

/// Records and diagnostics parsed out of one file's text.
#[derive(Debug, Default)]
pub struct Parsed {
    pub records: Vec<PatternRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse `source` into pattern records in source order.
///
/// Trailing comments (code before the opener on the same line) are never
/// pattern blocks. A record's `code` runs from the end of its block to the
/// start of the next candidate block.
pub fn parse(
    source: &str,
    family: SyntaxFamily,
    dialect: Dialect,
    policy: UntaggedBlocks,
) -> Parsed {
    let extraction = comments::extract(source, family);
    let mut parsed = Parsed::default();

    let candidates: Vec<_> = extraction.blocks.iter().filter(|b| !b.inline).collect();

    for (i, block) in candidates.iter().enumerate() {
        let code_end = candidates
            .get(i + 1)
            .map_or(source.len(), |next| next.span.start);
        let code = source[block.span.end..code_end].trim();

        let annotated = annotation::annotate(block.text, block.line, policy);
        parsed.diagnostics.extend(annotated.diagnostics);

        if let Some(mut record) = annotated.record {
            record.line = block.line;
            record.code = code.to_string();
            if dialect == Dialect::Variable {
                record.variables = variables::parse(code);
            }
            parsed.records.push(record);
        }
    }

    if let Some(line) = extraction.unterminated {
        let (open, _) = family.delimiters();
        parsed.diagnostics.push(Diagnostic::new(
            DiagnosticKind::UnterminatedComment,
            Some(line),
            format!("unterminated comment: `{}` is never closed", open),
        ));
    }

    parsed
}
