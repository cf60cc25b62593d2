//! Loading record batches from files.
//!
//! A record file holds one of:
//! - a FHIR Bundle (records are taken from `entry[].resource`)
//! - a JSON array of resources
//! - a single resource
//! - NDJSON, one resource per line

use std::path::Path;

use serde_json::Value;

use crate::search::LoaderError;

/// Reads a record file into a batch of raw resources.
///
/// Records are returned unvalidated; the builder reports malformed records by
/// position.
pub fn load_records(path: &Path) -> Result<Vec<Value>, LoaderError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoaderError::RecordLoadFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let records = parse_records(&content).map_err(|message| LoaderError::RecordLoadFailed {
        path: path.display().to_string(),
        message,
    })?;

    tracing::debug!(
        path = %path.display(),
        count = records.len(),
        "Loaded records"
    );

    Ok(records)
}

/// Parses record file content. See the module docs for accepted shapes.
pub fn parse_records(content: &str) -> Result<Vec<Value>, String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(json) => Ok(flatten_document(json)),
        Err(_) => parse_ndjson(trimmed),
    }
}

fn flatten_document(json: Value) -> Vec<Value> {
    match json {
        Value::Array(items) => items,
        Value::Object(mut object)
            if object.get("resourceType").and_then(Value::as_str) == Some("Bundle") =>
        {
            match object.remove("entry") {
                Some(Value::Array(entries)) => entries
                    .into_iter()
                    .filter_map(|mut entry| entry.get_mut("resource").map(Value::take))
                    .collect(),
                _ => Vec::new(),
            }
        }
        other => vec![other],
    }
}

fn parse_ndjson(content: &str) -> Result<Vec<Value>, String> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line).map_err(|e| format!("Invalid JSON on line {}: {}", n + 1, e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_bundle() {
        let content = json!({
            "resourceType": "Bundle",
            "type": "collection",
            "entry": [
                {"resource": {"resourceType": "Patient", "id": "1"}},
                {"fullUrl": "urn:uuid:no-resource"},
                {"resource": {"resourceType": "Patient", "id": "2"}}
            ]
        })
        .to_string();

        let records = parse_records(&content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["id"], "2");
    }

    #[test]
    fn test_parse_array_and_single() {
        let array = r#"[{"resourceType": "Patient", "id": "1"}, {"resourceType": "Patient", "id": "2"}]"#;
        assert_eq!(parse_records(array).unwrap().len(), 2);

        let single = r#"{"resourceType": "Patient", "id": "1"}"#;
        assert_eq!(parse_records(single).unwrap().len(), 1);

        assert!(parse_records("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_ndjson() {
        let content = "{\"resourceType\": \"Patient\", \"id\": \"1\"}\n\n{\"resourceType\": \"Patient\", \"id\": \"2\"}\n";
        let records = parse_records(content).unwrap();
        assert_eq!(records.len(), 2);

        let err = parse_records("{\"id\": \"1\"}\n{oops").unwrap_err();
        assert!(err.contains("line 2"));
    }

    #[test]
    fn test_load_records_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"[{{"resourceType": "Patient", "id": "1"}}]"#).unwrap();

        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 1);

        let missing = load_records(Path::new("/nonexistent/records.json")).unwrap_err();
        assert!(matches!(missing, LoaderError::RecordLoadFailed { .. }));
    }
}
