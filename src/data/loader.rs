use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value as JsonValue;

use super::dashboard::assemble_value;
use super::model::Section;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a saved analytics response from disk and assemble it.
///
/// Supported formats:
/// * `.json` – the body of `GET /api/analytics/` as saved by a browser or
///   written by the `generate_sample` binary
pub fn load_file(path: &Path) -> Result<Vec<Section>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "json" => load_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

fn load_json(path: &Path) -> Result<Vec<Section>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    let sections = assemble_value(root).context("assembling analytics")?;
    Ok(sections)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn loads_saved_payload() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"table": {{"name": "t", "data": {{"f1": {{"0": 1}}, "model": {{"0": "A"}}}}}},
                "confussion_matrixes": []}}"#
        )
        .unwrap();

        let sections = load_file(file.path()).unwrap();
        assert_eq!(sections.len(), 2);
    }

    #[test]
    fn rejects_other_extensions() {
        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    #[test]
    fn reports_invalid_payload() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"table": {{"name": "t", "data": {{}}}}}}"#).unwrap();
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("validation error"));
    }
}
