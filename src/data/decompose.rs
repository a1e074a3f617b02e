use serde_json::Value as JsonValue;

use crate::error::ViewError;

use super::model::{cell_text, record_keys, Record, MODEL_KEY};

/// The rows of one model, cut out of a combined metrics table.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTable {
    pub name: String,
    pub data: Record,
}

/// Split a combined metrics table into one sub-table per distinct model.
///
/// Models come out in first-seen order. Each sub-table keeps every column
/// (including `model`) in the original column order and only the row keys
/// whose model matches; row keys are not renumbered. The sub-tables'
/// row sets partition the original rows.
pub fn decompose(table: &Record) -> Result<Vec<ModelTable>, ViewError> {
    let models = table
        .get(MODEL_KEY)
        .ok_or_else(|| ViewError::validation(format!("metrics table has no '{MODEL_KEY}' column")))?
        .as_object()
        .ok_or_else(|| ViewError::validation(format!("'{MODEL_KEY}' column is not an object")))?;

    let columns = record_keys(table);
    for col in &columns {
        let values = table
            .get(*col)
            .and_then(|v| v.as_object())
            .ok_or_else(|| ViewError::validation(format!("column '{col}' is not an object")))?;
        if let Some(missing) = models.keys().find(|i| !values.contains_key(*i)) {
            return Err(ViewError::validation(format!(
                "column '{col}' has no value for row '{missing}'"
            )));
        }
        if let Some(extra) = values.keys().find(|i| !models.contains_key(*i)) {
            return Err(ViewError::validation(format!(
                "column '{col}' has row '{extra}' with no model"
            )));
        }
    }

    // Models are told apart by their JSON value, so `1` and `"1"` differ.
    let mut seen: Vec<&JsonValue> = Vec::new();
    let mut out: Vec<ModelTable> = Vec::new();
    for row in record_keys(models) {
        let Some(model) = models.get(row) else {
            continue;
        };
        let pos = match seen.iter().position(|m| *m == model) {
            Some(pos) => pos,
            None => {
                let data = columns
                    .iter()
                    .map(|col| (col.to_string(), JsonValue::Object(Record::new())))
                    .collect();
                seen.push(model);
                out.push(ModelTable {
                    name: cell_text(Some(model)),
                    data,
                });
                out.len() - 1
            }
        };

        let sub = &mut out[pos].data;
        for col in &columns {
            if let (Some(value), Some(JsonValue::Object(cells))) =
                (table[*col].get(row), sub.get_mut(*col))
            {
                cells.insert(row.to_string(), value.clone());
            }
        }
    }

    log::debug!("decomposed {} rows into {} models", models.len(), out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use serde_json::json;

    fn record(v: JsonValue) -> Record {
        v.as_object().cloned().unwrap()
    }

    fn row_keys(t: &ModelTable) -> BTreeSet<String> {
        t.data[MODEL_KEY].as_object().unwrap().keys().cloned().collect()
    }

    fn sample() -> Record {
        record(json!({
            "accuracy": {"0": 0.9, "1": 0.8, "2": 0.7, "3": 0.95},
            "f1":       {"0": 0.5, "1": 0.4, "2": 0.3, "3": 0.55},
            "model":    {"0": "KNN", "1": "LogReg", "2": "KNN", "3": "Forest"}
        }))
    }

    #[test]
    fn models_in_first_seen_order() {
        let parts = decompose(&sample()).unwrap();
        let names: Vec<&str> = parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["KNN", "LogReg", "Forest"]);
    }

    #[test]
    fn sub_tables_keep_row_keys_and_columns() {
        let parts = decompose(&sample()).unwrap();
        let knn = &parts[0];
        assert_eq!(
            knn.data,
            record(json!({
                "accuracy": {"0": 0.9, "2": 0.7},
                "f1":       {"0": 0.5, "2": 0.3},
                "model":    {"0": "KNN", "2": "KNN"}
            }))
        );
        let cols: Vec<&String> = knn.data.keys().collect();
        assert_eq!(cols, vec!["accuracy", "f1", "model"]);
    }

    #[test]
    fn row_sets_partition_the_table() {
        let table = sample();
        let parts = decompose(&table).unwrap();

        let mut union = BTreeSet::new();
        let mut total = 0;
        for p in &parts {
            let keys = row_keys(p);
            total += keys.len();
            union.extend(keys);
        }
        let all: BTreeSet<String> = table[MODEL_KEY].as_object().unwrap().keys().cloned().collect();
        assert_eq!(union, all);
        // Disjoint: no key counted twice.
        assert_eq!(total, all.len());
    }

    #[test]
    fn missing_model_column_is_rejected() {
        let table = record(json!({"accuracy": {"0": 1}}));
        assert!(matches!(decompose(&table), Err(ViewError::Validation(_))));
    }

    #[test]
    fn ragged_column_is_rejected() {
        let table = record(json!({"accuracy": {"0": 1}, "model": {"0": "A", "1": "B"}}));
        let err = decompose(&table).unwrap_err();
        assert_eq!(
            err,
            ViewError::Validation("column 'accuracy' has no value for row '1'".into())
        );
    }

    #[test]
    fn row_without_model_is_rejected() {
        let table = record(json!({
            "acc": {"0": 0.1, "1": 0.2, "7": 0.9},
            "model": {"0": "A", "1": "B"}
        }));
        let err = decompose(&table).unwrap_err();
        assert_eq!(
            err,
            ViewError::Validation("column 'acc' has row '7' with no model".into())
        );
    }

    #[test]
    fn number_and_string_models_stay_apart() {
        let table = record(json!({
            "acc": {"0": 0.1, "1": 0.2, "2": 0.3},
            "model": {"0": 1, "1": "1", "2": 1}
        }));
        let parts = decompose(&table).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].data["model"], json!({"0": 1, "2": 1}));
        assert_eq!(parts[1].data["model"], json!({"1": "1"}));
        assert_eq!(parts[1].name, "1");
    }

    #[test]
    fn empty_model_column_gives_no_models() {
        let table = record(json!({"model": {}}));
        assert!(decompose(&table).unwrap().is_empty());
    }
}
