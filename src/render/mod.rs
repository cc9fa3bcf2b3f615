//! Renderer module — trait-based format dispatch.

pub mod html;
pub mod json;

use crate::model::Library;
use anyhow::{anyhow, Result};

/// Trait for rendering a populated library into a specific output format.
pub trait Renderer: Send + Sync {
    fn render(&self, library: &Library) -> Result<String>;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>> {
    match format {
        "html" => Ok(Box::new(html::HtmlRenderer)),
        "json" => Ok(Box::new(json::JsonRenderer)),
        _ => Err(anyhow!("unknown format: {}. Use html or json", format)),
    }
}
