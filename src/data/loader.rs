use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::info;

/// Parse a JSON array of records
pub fn parse_records<R: DeserializeOwned>(json: &str) -> Result<Vec<R>> {
    let records: Vec<R> = serde_json::from_str(json).context("Failed to parse record set")?;
    Ok(records)
}

/// Load a JSON array of records from a file
pub fn load_records<R: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<R>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read records from {}", path.display()))?;
    let records: Vec<R> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse records in {}", path.display()))?;

    info!(target: "loader", "Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u32,
        name: String,
    }

    #[test]
    fn test_parse_records() {
        let items: Vec<Item> =
            parse_records(r#"[{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]"#).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].name, "b");
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(parse_records::<Item>(r#"{"id": 1, "name": "a"}"#).is_err());
    }

    #[test]
    fn test_load_records_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"[{{"id": 7, "name": "seven"}}]"#).unwrap();
        let items: Vec<Item> = load_records(file.path()).unwrap();
        assert_eq!(
            items,
            vec![Item {
                id: 7,
                name: "seven".to_string()
            }]
        );
    }

    #[test]
    fn test_missing_file_error_names_path() {
        let err = load_records::<Item>("/nonexistent/records.json").unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/records.json"));
    }
}
