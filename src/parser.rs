use crate::model::Diagram;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate element id '{id}'")]
    DuplicateId { id: String },
}

/// Load a diagram document from a JSON file.
pub fn load_diagram<P: AsRef<Path>>(path: P) -> Result<Diagram, ParseError> {
    let content = fs::read_to_string(path)?;
    parse_diagram(&content)
}

/// Parse and validate a diagram document from a JSON string.
///
/// Validation here covers only what must hold before the pipeline starts:
/// unique element ids. Dangling references are the structure analyser's
/// concern and degrade to diagnostics there.
pub fn parse_diagram(content: &str) -> Result<Diagram, ParseError> {
    let diagram: Diagram = serde_json::from_str(content)?;

    let mut seen = HashSet::new();
    for element in &diagram.elements {
        if !seen.insert(element.id.as_str()) {
            return Err(ParseError::DuplicateId {
                id: element.id.clone(),
            });
        }
    }

    Ok(diagram)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn minimal_doc() -> &'static str {
        r#"{
            "elements": [
                {"id": "a", "type": "server"},
                {"id": "b", "type": "database"}
            ],
            "connections": [
                {"from": "a", "to": "b"}
            ]
        }"#
    }

    #[test]
    fn test_parse_minimal_document() {
        let diagram = parse_diagram(minimal_doc()).unwrap();
        assert_eq!(diagram.elements.len(), 2);
        assert_eq!(diagram.connections.len(), 1);
    }

    #[test]
    fn test_parse_duplicate_id_rejected() {
        let doc = r#"{
            "elements": [{"id": "a"}, {"id": "a"}],
            "connections": []
        }"#;
        let err = parse_diagram(doc).unwrap_err();
        assert!(matches!(err, ParseError::DuplicateId { ref id } if id == "a"));
    }

    #[test]
    fn test_parse_missing_required_key_rejected() {
        let doc = r#"{"elements": []}"#;
        assert!(matches!(parse_diagram(doc), Err(ParseError::Json(_))));
    }

    #[test]
    fn test_parse_invalid_json_rejected() {
        assert!(matches!(
            parse_diagram("not json at all"),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", minimal_doc()).unwrap();

        let diagram = load_diagram(file.path()).unwrap();
        assert_eq!(diagram.elements.len(), 2);
    }

    #[test]
    fn test_load_nonexistent_file_returns_io_error() {
        let result = load_diagram("/nonexistent/path/diagram.json");
        assert!(matches!(result.unwrap_err(), ParseError::Io(_)));
    }

    #[test]
    fn test_error_messages_are_single_line() {
        let err = ParseError::DuplicateId {
            id: "web".to_string(),
        };
        assert!(!err.to_string().contains('\n'));
    }
}
