use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;

use inkdag::diag::Diagnostic;
use inkdag::icons::IconRegistry;
use inkdag::layout;
use inkdag::svg::write_svg;

#[derive(Serialize)]
struct RenderJsonOutput {
    canvas_width: f64,
    canvas_height: f64,
    nodes: usize,
    edges: usize,
    diagnostics: Vec<Diagnostic>,
    output: Option<String>,
}

pub fn run(input: &Path, output: Option<&Path>, config: Option<&Path>, json: bool) -> Result<()> {
    let cfg = super::load_config(config)?;
    let diagram = super::load_document(input)?;

    let result = layout::compute(&diagram, &cfg)?;
    let icons = IconRegistry::new(diagram.icons.clone());
    let svg = write_svg(&result.render, &icons);

    match output {
        Some(path) => fs::write(path, &svg)?,
        None if !json => print!("{}", svg),
        None => {}
    }

    if json {
        let out = RenderJsonOutput {
            canvas_width: result.render.canvas.width,
            canvas_height: result.render.canvas.height,
            nodes: result.layout.nodes.len(),
            edges: result.layout.edges.len(),
            diagnostics: result.layout.diagnostics.clone(),
            output: output.map(|p| p.display().to_string()),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for diagnostic in &result.layout.diagnostics {
        eprintln!("Warning: {}", diagnostic);
    }
    if let Some(path) = output {
        eprintln!(
            "Rendered {} nodes, {} edges to {} ({}x{})",
            result.layout.nodes.len(),
            result.layout.edges.len(),
            path.display(),
            result.render.canvas.width,
            result.render.canvas.height
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn write_doc(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_render_writes_svg_file() {
        let doc = write_doc(
            r#"{"elements":[{"id":"a","type":"server"},{"id":"b"}],
                "connections":[{"from":"a","to":"b","direction":"forward"}]}"#,
        );
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("diagram.svg");

        run(doc.path(), Some(&out), None, false).unwrap();

        let svg = std::fs::read_to_string(&out).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("ndfn:icon:server:a"));
    }

    #[test]
    fn test_render_fails_on_duplicate_id() {
        let doc = write_doc(r#"{"elements":[{"id":"a"},{"id":"a"}],"connections":[]}"#);
        let result = run(doc.path(), None, None, true);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_render_fails_on_missing_input() {
        let result = run(Path::new("/nonexistent/doc.json"), None, None, false);
        assert!(result.is_err());
    }

    #[test]
    fn test_render_applies_config_override() {
        let doc = write_doc(r#"{"elements":[{"id":"a"}],"connections":[]}"#);
        let mut cfg = NamedTempFile::new().unwrap();
        writeln!(cfg, "canvas_width = 3000.0\ncanvas_height = 2000.0").unwrap();
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("diagram.svg");

        run(doc.path(), Some(&out), Some(cfg.path()), false).unwrap();

        let svg = std::fs::read_to_string(&out).unwrap();
        assert!(svg.contains("width=\"3000\""));
    }
}
