//! sugarcoat — build a pattern library document from annotated comments in
//! stylesheets, markup and scripts.
//!
//! A run takes a [`RawConfig`], validates it, expands each section's file
//! patterns, reads and parses every file, then renders the populated
//! [`Library`](model::Library) into a single document.

pub mod config;
pub mod discover;
pub mod error;
pub mod log;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod section;
pub mod toc;

pub use config::{Config, ConfigError, RawConfig};
pub use error::{Error, Result};
pub use pipeline::{run, Pipeline};
