//! JSON renderer — structured output for tooling integration.
//!
//! Serializes the populated library directly, sections → files → records,
//! including per-file diagnostics.

use crate::model::Library;
use crate::render::Renderer;
use anyhow::Result;

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, library: &Library) -> Result<String> {
        let mut out = serde_json::to_string_pretty(library)?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}
