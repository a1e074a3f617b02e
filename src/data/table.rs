use crate::error::ViewError;

use super::model::{
    cell_text, coerce_number, format_metric, record_keys, Record, RenderedTable, MODEL_KEY,
};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Build a display table from a column-oriented record.
///
/// Dispatch by shape:
/// * has a `model` column → metrics table (one row per model row, four
///   decimal metrics)
/// * otherwise            → matrix (first column's keys are the row names,
///   cells emitted as-is)
pub fn render(caption: &str, data: &Record) -> Result<RenderedTable, ViewError> {
    if data.contains_key(MODEL_KEY) {
        render_metrics(caption, data)
    } else {
        render_matrix(caption, data)
    }
}

// ---------------------------------------------------------------------------
// Metrics mode
// ---------------------------------------------------------------------------

fn render_metrics(caption: &str, data: &Record) -> Result<RenderedTable, ViewError> {
    let models = data
        .get(MODEL_KEY)
        .and_then(|m| m.as_object())
        .ok_or_else(|| ViewError::validation(format!("'{caption}': '{MODEL_KEY}' is not an object")))?;

    let metrics: Vec<&str> = record_keys(data)
        .into_iter()
        .filter(|k| *k != MODEL_KEY)
        .collect();

    let mut header = Vec::with_capacity(metrics.len() + 1);
    header.push("Model".to_string());
    header.extend(metrics.iter().map(|m| m.to_string()));

    let rows = record_keys(models)
        .into_iter()
        .map(|i| {
            let mut row = Vec::with_capacity(metrics.len() + 1);
            row.push(cell_text(models.get(i)));
            for metric in &metrics {
                // A non-object column yields no cell, which coerces to NaN.
                let cell = data.get(*metric).and_then(|col| col.get(i));
                row.push(format_metric(coerce_number(cell)));
            }
            row
        })
        .collect();

    Ok(RenderedTable {
        caption: caption.to_string(),
        header,
        rows,
    })
}

// ---------------------------------------------------------------------------
// Matrix mode
// ---------------------------------------------------------------------------

fn render_matrix(caption: &str, data: &Record) -> Result<RenderedTable, ViewError> {
    let columns = record_keys(data);
    let first = columns
        .first()
        .ok_or_else(|| ViewError::validation(format!("'{caption}': matrix has no columns")))?;
    let row_names = data
        .get(*first)
        .and_then(|c| c.as_object())
        .map(record_keys)
        .ok_or_else(|| {
            ViewError::validation(format!("'{caption}': column '{first}' is not an object"))
        })?;

    let mut header = Vec::with_capacity(columns.len() + 1);
    header.push(String::new());
    header.extend(columns.iter().map(|c| c.to_string()));

    let rows = row_names
        .iter()
        .map(|row_name| {
            let mut row = Vec::with_capacity(columns.len() + 1);
            row.push(row_name.to_string());
            for col in &columns {
                let cell = data.get(*col).and_then(|c| c.get(*row_name));
                row.push(cell_text(cell));
            }
            row
        })
        .collect();

    Ok(RenderedTable {
        caption: caption.to_string(),
        header,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value as JsonValue};

    fn record(v: JsonValue) -> Record {
        v.as_object().cloned().unwrap()
    }

    fn strings(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn metrics_mode_formats_four_decimals() {
        let data = record(json!({
            "a": {"0": 1.23456, "1": 2},
            "b": {"0": 0, "1": -1},
            "model": {"0": "X", "1": "Y"}
        }));
        let t = render("Scores", &data).unwrap();
        assert_eq!(t.caption, "Scores");
        assert_eq!(t.header, vec!["Model", "a", "b"]);
        assert_eq!(
            t.rows,
            strings(&[&["X", "1.2346", "0.0000"], &["Y", "2.0000", "-1.0000"]])
        );
    }

    #[test]
    fn metrics_mode_rounds_ties_up() {
        let data = record(json!({
            "acc": {"0": 0.03125, "1": 0.65625, "2": -0.03125},
            "model": {"0": "A", "1": "B", "2": "C"}
        }));
        let t = render("", &data).unwrap();
        assert_eq!(
            t.rows,
            strings(&[&["A", "0.0313"], &["B", "0.6563"], &["C", "-0.0313"]])
        );
    }

    #[test]
    fn metrics_mode_rows_follow_numeric_index_order() {
        let data = record(json!({
            "model": {"10": "C", "2": "B", "0": "A"},
            "f1": {"0": 0.1, "2": 0.2, "10": 0.3}
        }));
        let t = render("", &data).unwrap();
        let names: Vec<&str> = t.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(t.rows[2][1], "0.3000");
    }

    #[test]
    fn metrics_mode_shows_nan_for_bad_cells() {
        let data = record(json!({
            "model": {"0": "X", "1": "Y"},
            "acc": {"0": "oops"},
            "broken": 3
        }));
        let t = render("", &data).unwrap();
        assert_eq!(t.rows, strings(&[&["X", "NaN", "NaN"], &["Y", "NaN", "NaN"]]));
    }

    #[test]
    fn metrics_mode_requires_model_object() {
        let data = record(json!({"model": "X", "acc": {"0": 1}}));
        assert!(matches!(render("", &data), Err(ViewError::Validation(_))));
    }

    #[test]
    fn matrix_mode_emits_raw_values() {
        let data = record(json!({"A": {"A": 5, "B": 1}, "B": {"A": 2, "B": 9}}));
        let t = render("cm", &data).unwrap();
        assert_eq!(t.header, vec!["", "A", "B"]);
        assert_eq!(t.rows, strings(&[&["A", "5", "1"], &["B", "2", "9"]]));
    }

    #[test]
    fn matrix_mode_keeps_unformatted_floats_and_gaps() {
        let data = record(json!({"p0": {"r0": 0.5, "r1": 3}, "p1": {"r0": 1}}));
        let t = render("", &data).unwrap();
        assert_eq!(
            t.rows,
            strings(&[&["r0", "0.5", "1"], &["r1", "3", "undefined"]])
        );
    }

    #[test]
    fn matrix_mode_rejects_empty_input() {
        let err = render("cm", &Record::new()).unwrap_err();
        assert!(matches!(err, ViewError::Validation(_)));
    }

    #[test]
    fn matrix_mode_rejects_scalar_first_column() {
        let data = record(json!({"A": 3}));
        assert!(render("", &data).is_err());
    }
}
