//! Configuration: the raw JSON shape and its validation into typed structs.
//!
//! Validation happens once, before any I/O. Everything downstream consumes
//! [`Config`] and never re-checks shape.

use crate::parser::annotation::UntaggedBlocks;
use crate::parser::comments::SyntaxFamily;
use crate::parser::Dialect;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Sentinel `dest` value meaning "render, but write nothing".
pub const DEST_NONE: &str = "none";

pub const DEFAULT_TITLE: &str = "Pattern Library";

// -- Raw shape ----------------------------------------------------------------

/// Configuration as written by the user, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    #[serde(alias = "destination")]
    pub dest: Option<String>,
    pub template: Option<RawTemplate>,
    pub include: Option<Includes>,
    pub untagged_blocks: Option<UntaggedBlocks>,
    /// Kept untyped so an absent array, an empty array and a non-object
    /// element can each be reported as their own error.
    pub sections: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTemplate {
    pub title: Option<String>,
    pub selector_prefix: Option<String>,
    #[serde(alias = "assetsPath")]
    pub assets: Option<OneOrMany>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSection {
    title: Option<String>,
    files: Option<OneOrMany>,
    mode: Option<String>,
    template: Option<RawSectionTemplate>,
}

#[derive(Debug, Deserialize)]
struct RawSectionTemplate {
    layout: Option<String>,
}

/// A single string or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

// -- Validated shape ----------------------------------------------------------

#[derive(Debug)]
pub struct Config {
    pub destination: Destination,
    pub template: TemplateOptions,
    pub include: Includes,
    pub untagged_blocks: UntaggedBlocks,
    pub sections: Vec<SectionConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// The `"none"` sentinel.
    None,
    Dir(PathBuf),
}

impl Destination {
    pub fn dir(&self) -> Option<&Path> {
        match self {
            Destination::None => None,
            Destination::Dir(dir) => Some(dir),
        }
    }
}

impl Serialize for Destination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Destination::None => serializer.serialize_str(DEST_NONE),
            Destination::Dir(dir) => crate::model::lossy_path(dir, serializer),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateOptions {
    pub title: String,
    pub selector_prefix: Option<String>,
    pub assets: Vec<String>,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            selector_prefix: None,
            assets: Vec::new(),
        }
    }
}

/// Stylesheets and scripts linked from the rendered document.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Includes {
    #[serde(default)]
    pub css: Vec<String>,
    #[serde(default)]
    pub js: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SectionConfig {
    pub title: String,
    pub files: Vec<String>,
    pub mode: Option<Mode>,
    pub layout: SectionLayout,
}

/// Parsing mode hint: a syntax family override or the variable dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Css,
    Script,
    Markup,
    Variable,
}

impl Mode {
    /// Resolve the comment syntax and dialect for a file. The mode wins over
    /// the extension except in the variable dialect, which keeps the
    /// extension's syntax.
    pub fn resolve(mode: Option<Mode>, extension: &str) -> (SyntaxFamily, Dialect) {
        match mode {
            Some(Mode::Css) => (SyntaxFamily::Css, Dialect::Standard),
            Some(Mode::Script) => (SyntaxFamily::Script, Dialect::Standard),
            Some(Mode::Markup) => (SyntaxFamily::Markup, Dialect::Standard),
            Some(Mode::Variable) => (SyntaxFamily::from_extension(extension), Dialect::Variable),
            None => (SyntaxFamily::from_extension(extension), Dialect::Standard),
        }
    }
}

impl FromStr for Mode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "css" => Ok(Mode::Css),
            "script" | "js" | "javascript" | "scss" | "less" => Ok(Mode::Script),
            "markup" | "html" => Ok(Mode::Markup),
            "variable" | "variables" => Ok(Mode::Variable),
            _ => Err(()),
        }
    }
}

/// How a section's records are laid out in the rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionLayout {
    Patterns,
    Variables,
}

impl FromStr for SectionLayout {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patterns" => Ok(SectionLayout::Patterns),
            "variables" => Ok(SectionLayout::Variables),
            _ => Err(()),
        }
    }
}

// -- Errors -------------------------------------------------------------------

/// A configuration rule violation. Messages are fixed per rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("config.dest is required; use \"none\" to skip writing output")]
    DestMissing,
    #[error("config.sections must be an array of section objects")]
    SectionArrayMissing,
    #[error("config.sections must contain at least one section object")]
    SectionObjectMissing,
    #[error("every section requires a title")]
    SectionTitleMissing { index: usize },
    #[error("every section requires files")]
    SectionFileMissing { index: usize },
    #[error("unknown section mode \"{mode}\"")]
    SectionModeInvalid { index: usize, mode: String },
    #[error("unknown section template layout \"{layout}\"")]
    SectionTemplateInvalid { index: usize, layout: String },
    #[error("section is malformed: {reason}")]
    SectionMalformed { index: usize, reason: String },
    #[error("template.selectorPrefix requires template.assets")]
    PrefixAssetsMissing,
    #[error("template.selectorPrefix with include requires template options (template.assets)")]
    TemplateOptionsMissing,
}

impl ConfigError {
    /// Stable machine-checkable name of the violated rule.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigError::DestMissing => "ConfigDestMissing",
            ConfigError::SectionArrayMissing => "ConfigSectionArrayMissing",
            ConfigError::SectionObjectMissing => "ConfigSectionObjectMissing",
            ConfigError::SectionTitleMissing { .. } => "ConfigSectionTitleMissing",
            ConfigError::SectionFileMissing { .. } => "ConfigSectionFileMissing",
            ConfigError::SectionModeInvalid { .. } => "ConfigSectionModeInvalid",
            ConfigError::SectionTemplateInvalid { .. } => "ConfigSectionTemplateInvalid",
            ConfigError::SectionMalformed { .. } => "ConfigSectionMalformed",
            ConfigError::PrefixAssetsMissing => "ConfigPrefixAssetsMissing",
            ConfigError::TemplateOptionsMissing => "ConfigTemplateOptionsMissing",
        }
    }

    /// Zero-based index of the offending section, if the rule is per-section.
    pub fn section_index(&self) -> Option<usize> {
        match self {
            ConfigError::SectionTitleMissing { index }
            | ConfigError::SectionFileMissing { index }
            | ConfigError::SectionModeInvalid { index, .. }
            | ConfigError::SectionTemplateInvalid { index, .. }
            | ConfigError::SectionMalformed { index, .. } => Some(*index),
            _ => None,
        }
    }
}

// -- Validation ---------------------------------------------------------------

impl RawConfig {
    /// Validate into a typed [`Config`], failing on the first violation.
    pub fn validate(self) -> Result<Config, ConfigError> {
        let destination = match self.dest.as_deref().map(str::trim) {
            None | Some("") => return Err(ConfigError::DestMissing),
            Some(DEST_NONE) => Destination::None,
            Some(dir) => Destination::Dir(PathBuf::from(dir)),
        };

        let sections = match self.sections {
            Some(Value::Array(items)) => items,
            _ => return Err(ConfigError::SectionArrayMissing),
        };
        if sections.is_empty() {
            return Err(ConfigError::SectionObjectMissing);
        }

        let sections = sections
            .into_iter()
            .enumerate()
            .map(|(index, value)| validate_section(index, value))
            .collect::<Result<Vec<_>, _>>()?;

        let template = validate_template(self.template, self.include.is_some())?;

        Ok(Config {
            destination,
            template,
            include: self.include.unwrap_or_default(),
            untagged_blocks: self.untagged_blocks.unwrap_or_default(),
            sections,
        })
    }
}

fn validate_section(index: usize, value: Value) -> Result<SectionConfig, ConfigError> {
    if !value.is_object() {
        return Err(ConfigError::SectionObjectMissing);
    }
    let raw: RawSection =
        serde_json::from_value(value).map_err(|e| ConfigError::SectionMalformed {
            index,
            reason: e.to_string(),
        })?;

    let title = match raw.title {
        Some(t) if !t.trim().is_empty() => t,
        _ => return Err(ConfigError::SectionTitleMissing { index }),
    };

    let files: Vec<String> = raw
        .files
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .filter(|f| !f.trim().is_empty())
        .collect();
    if files.is_empty() {
        return Err(ConfigError::SectionFileMissing { index });
    }

    let mode = match raw.mode {
        Some(m) => Some(
            m.parse::<Mode>()
                .map_err(|_| ConfigError::SectionModeInvalid { index, mode: m })?,
        ),
        None => None,
    };

    let layout = match raw.template.and_then(|t| t.layout) {
        Some(l) => l
            .parse::<SectionLayout>()
            .map_err(|_| ConfigError::SectionTemplateInvalid { index, layout: l })?,
        None if mode == Some(Mode::Variable) => SectionLayout::Variables,
        None => SectionLayout::Patterns,
    };

    Ok(SectionConfig {
        title,
        files,
        mode,
        layout,
    })
}

fn validate_template(
    raw: Option<RawTemplate>,
    has_include: bool,
) -> Result<TemplateOptions, ConfigError> {
    let Some(raw) = raw else {
        return Ok(TemplateOptions::default());
    };

    let assets = raw.assets.map(OneOrMany::into_vec).unwrap_or_default();
    let selector_prefix = raw.selector_prefix.filter(|p| !p.trim().is_empty());

    if selector_prefix.is_some() && assets.is_empty() {
        return Err(if has_include {
            ConfigError::TemplateOptionsMissing
        } else {
            ConfigError::PrefixAssetsMissing
        });
    }

    Ok(TemplateOptions {
        title: raw
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        selector_prefix,
        assets,
    })
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Css => "css",
            Mode::Script => "script",
            Mode::Markup => "markup",
            Mode::Variable => "variable",
        })
    }
}
