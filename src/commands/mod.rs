pub mod check;
pub mod render;
pub mod stats;

use anyhow::{Context, Result};
use std::path::Path;

use inkdag::config::Config;
use inkdag::model::Diagram;

/// Load the layout configuration, defaulting when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => {
            Config::load(p).with_context(|| format!("failed to load config {}", p.display()))
        }
        None => Ok(Config::default()),
    }
}

/// Load and validate the input document.
pub fn load_document(path: &Path) -> Result<Diagram> {
    inkdag::parser::load_diagram(path)
        .with_context(|| format!("failed to load diagram {}", path.display()))
}
