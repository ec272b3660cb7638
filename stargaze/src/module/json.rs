//! JSON output shared by the comet finder and the dataset generator

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// Serialize as UTF-8 JSON with four-space indentation.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .context("Failed to serialize JSON")?;
    String::from_utf8(buf).context("JSON output is not UTF-8")
}

/// Write `value` to `path`, creating parent directories as needed.
pub async fn write_json_file<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = to_pretty_json(value)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_space_indent() {
        let json = to_pretty_json(&vec![1, 2]).unwrap();
        assert_eq!(json, "[\n    1,\n    2\n]");
    }

    #[tokio::test]
    async fn test_write_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.json");
        write_json_file(&["a"], &path).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[\n    \"a\"\n]");
    }
}
