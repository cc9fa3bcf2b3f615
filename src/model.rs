//! Data model for parsed pattern documentation — format-agnostic.
//!
//! A successful run produces a [`Library`]: the validated configuration with
//! every section's files resolved, read and parsed into [`PatternRecord`]s.

use crate::config::{Destination, Includes, Mode, SectionLayout, TemplateOptions};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// The populated configuration returned by a successful run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    pub destination: Destination,
    pub template: TemplateOptions,
    pub include: Includes,
    pub sections: Vec<Section>,
    /// Path of the written artifact; `None` when nothing was written.
    #[serde(serialize_with = "lossy_opt_path")]
    pub output: Option<PathBuf>,
}

impl Library {
    /// Every record in output order: sections, then files, then source order.
    pub fn records(&self) -> impl Iterator<Item = &PatternRecord> {
        self.sections.iter().flat_map(Section::records)
    }

    /// True when any file carries a diagnostic (a degraded but non-fatal run).
    pub fn has_diagnostics(&self) -> bool {
        self.sections
            .iter()
            .flat_map(|s| &s.files)
            .any(|f| !f.diagnostics.is_empty())
    }
}

/// One configured section with its discovered files.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub title: String,
    pub mode: Option<Mode>,
    pub layout: SectionLayout,
    pub files: Vec<SourceFile>,
}

impl Section {
    pub fn records(&self) -> impl Iterator<Item = &PatternRecord> {
        self.files.iter().flat_map(|f| &f.records)
    }
}

/// A discovered file, its content once read, and what was parsed out of it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    #[serde(serialize_with = "lossy_path")]
    pub path: PathBuf,
    /// Lower-cased extension without the leading dot.
    pub extension: String,
    /// Full text; `None` when the read failed.
    #[serde(skip)]
    pub raw_text: Option<String>,
    pub records: Vec<PatternRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl SourceFile {
    pub fn new(path: PathBuf) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        Self {
            path,
            extension,
            raw_text: None,
            records: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

/// One structured documentation unit extracted from a single comment block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternRecord {
    pub tags: BTreeMap<Tag, String>,
    /// `@modifier` and `@state` entries, in block order.
    pub variants: Vec<Variant>,
    pub body: String,
    /// Source between this block and the next candidate block.
    pub code: String,
    /// 1-based line of the opening comment delimiter.
    pub line: usize,
    /// Populated in the variable dialect only.
    pub variables: Vec<Variable>,
    #[serde(serialize_with = "lossy_path")]
    pub source_path: PathBuf,
    pub source_extension: String,
}

impl PatternRecord {
    pub fn tag(&self, tag: Tag) -> Option<&str> {
        self.tags.get(&tag).map(String::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.tag(Tag::Title)
    }

    pub fn is_private(&self) -> bool {
        self.tags.contains_key(&Tag::Private)
    }

    pub fn is_deprecated(&self) -> bool {
        self.tags.contains_key(&Tag::Deprecated)
    }

    pub fn modifiers(&self) -> impl Iterator<Item = &Variant> {
        self.variants
            .iter()
            .filter(|v| v.kind == VariantKind::Modifier)
    }

    pub fn states(&self) -> impl Iterator<Item = &Variant> {
        self.variants.iter().filter(|v| v.kind == VariantKind::State)
    }
}

/// Singular annotation tags. Repeatable tags live in [`Variant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Title,
    Description,
    Usage,
    Example,
    Private,
    Deprecated,
}

impl Tag {
    pub fn name(self) -> &'static str {
        match self {
            Tag::Title => "title",
            Tag::Description => "description",
            Tag::Usage => "usage",
            Tag::Example => "example",
            Tag::Private => "private",
            Tag::Deprecated => "deprecated",
        }
    }

    /// Flags carry no required value.
    pub fn is_flag(self) -> bool {
        matches!(self, Tag::Private | Tag::Deprecated)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    Modifier,
    State,
}

/// A `@modifier .btn--large Large button` style entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    pub kind: VariantKind,
    /// First token, e.g. `.btn--large` or `:hover`.
    pub name: String,
    pub description: String,
}

/// A custom property or preprocessor variable declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A non-fatal problem attached to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, line: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    Read,
    UnterminatedComment,
    EmptyTag,
    DuplicateTag,
}

/// Paths serialize as strings even when they are not valid UTF-8.
pub(crate) fn lossy_path<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

fn lossy_opt_path<S: Serializer>(
    path: &Option<PathBuf>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match path {
        Some(path) => lossy_path(path, serializer),
        None => serializer.serialize_none(),
    }
}
