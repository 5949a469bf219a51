use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use inkdag::diag::Diagnostic;
use inkdag::layout;

#[derive(Serialize)]
struct CheckJsonOutput {
    ok: bool,
    nodes: usize,
    edges: usize,
    containers: usize,
    levels: usize,
    diagnostics: Vec<Diagnostic>,
}

pub fn run(input: &Path, config: Option<&Path>, json: bool) -> Result<()> {
    let cfg = super::load_config(config)?;
    let diagram = super::load_document(input)?;

    let result = layout::compute(&diagram, &cfg)?;
    let layout = &result.layout;
    let containers = layout.nodes.values().filter(|n| n.is_container()).count();
    let levels = layout
        .nodes
        .values()
        .map(|n| n.level)
        .max()
        .map(|m| m + 1)
        .unwrap_or(0);
    let ok = layout.diagnostics.is_empty();

    if json {
        let output = CheckJsonOutput {
            ok,
            nodes: layout.nodes.len(),
            edges: layout.edges.len(),
            containers,
            levels,
            diagnostics: layout.diagnostics.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for diagnostic in &layout.diagnostics {
        eprintln!("Warning: {}", diagnostic);
    }
    if ok {
        println!(
            "Document OK: {} nodes ({} containers), {} edges, {} levels",
            layout.nodes.len(),
            containers,
            layout.edges.len(),
            levels
        );
    } else {
        println!(
            "Document has {} warning(s): {} nodes, {} edges",
            layout.diagnostics.len(),
            layout.nodes.len(),
            layout.edges.len()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_doc(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_check_ok_clean_document() {
        let doc = write_doc(
            r#"{"elements":[{"id":"a"},{"id":"b"}],
                "connections":[{"from":"a","to":"b"}]}"#,
        );
        assert!(run(doc.path(), None, false).is_ok());
    }

    #[test]
    fn test_check_tolerates_dangling_edge() {
        // A missing endpoint is a warning, not a fatal error.
        let doc = write_doc(
            r#"{"elements":[{"id":"a"}],
                "connections":[{"from":"a","to":"ghost"}]}"#,
        );
        assert!(run(doc.path(), None, false).is_ok());
    }

    #[test]
    fn test_check_fails_on_containment_cycle() {
        let doc = write_doc(
            r#"{"elements":[{"id":"a","contains":["b"]},{"id":"b","contains":["a"]}],
                "connections":[]}"#,
        );
        let result = run(doc.path(), None, false);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("containment cycle"));
    }

    #[test]
    fn test_check_fails_on_malformed_json() {
        let doc = write_doc("{ this is not json");
        assert!(run(doc.path(), None, false).is_err());
    }
}
