use crate::error::{DocumentError, Result};
use crate::types::ClauseDocument;
use std::fs;
use std::path::Path;

/// Load one clause document from a JSON file.
pub fn load_document(path: &Path) -> Result<ClauseDocument> {
    let raw = fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let doc: ClauseDocument =
        serde_json::from_str(&raw).map_err(|source| DocumentError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    log::debug!(
        "Loaded clause {} ({} requirements) from {}",
        doc.chunk_id,
        doc.requirements.len(),
        path.display()
    );
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_document_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"chunk_id": "c1", "document_id": "STD-1", "clause_id": "1.1"}}"#
        )
        .unwrap();

        let doc = load_document(file.path()).unwrap();
        assert_eq!(doc.chunk_id, "c1");
        assert_eq!(doc.document_id, "STD-1");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let err = load_document(file.path()).unwrap_err();
        assert!(matches!(err, DocumentError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_document(Path::new("/nonexistent/doc.json")).unwrap_err();
        assert!(matches!(err, DocumentError::Read { .. }));
    }
}
