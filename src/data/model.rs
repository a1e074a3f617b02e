use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

// ---------------------------------------------------------------------------
// Record – a column-oriented JSON object
// ---------------------------------------------------------------------------

/// A JSON object as produced by `DataFrame.to_dict()`: column name →
/// (row key → cell). `serde_json` is built with `preserve_order`, so the
/// map keeps document order; iteration order is still always taken from
/// [`record_keys`], never from the map directly.
pub type Record = Map<String, JsonValue>;

/// Reserved column of a metrics table holding the model name of each row.
pub const MODEL_KEY: &str = "model";

/// Keys of `record` in *record key order*: canonical array-index keys
/// (`"0"`, `"1"`, … below 2^32 - 1) first in ascending numeric order, then
/// every other key in document order.
pub fn record_keys(record: &Record) -> Vec<&str> {
    let mut indexed: Vec<(u32, &str)> = Vec::new();
    let mut named: Vec<&str> = Vec::new();

    for key in record.keys() {
        match array_index(key) {
            Some(n) => indexed.push((n, key.as_str())),
            None => named.push(key.as_str()),
        }
    }
    indexed.sort_by_key(|(n, _)| *n);

    indexed
        .into_iter()
        .map(|(_, k)| k)
        .chain(named)
        .collect()
}

fn array_index(key: &str) -> Option<u32> {
    let canonical = key == "0"
        || (!key.is_empty()
            && !key.starts_with('0')
            && key.bytes().all(|b| b.is_ascii_digit()));
    if !canonical {
        return None;
    }
    key.parse::<u32>().ok().filter(|n| *n != u32::MAX)
}

// ---------------------------------------------------------------------------
// Cell conversions
// ---------------------------------------------------------------------------

/// Plain text of a cell: strings unquoted, integral numbers without a
/// fractional part, a missing cell as `undefined`.
pub fn cell_text(value: Option<&JsonValue>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(format_plain).unwrap_or_else(|| n.to_string())
            }
        }
        Some(JsonValue::Bool(b)) => b.to_string(),
        Some(JsonValue::Null) => "null".to_string(),
        Some(other) => other.to_string(),
    }
}

fn format_plain(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        let marker = if v > 0.0 { "Infinity" } else { "-Infinity" };
        marker.to_string()
    } else if v == 0.0 {
        "0".to_string()
    } else {
        format!("{v}")
    }
}

/// Loose numeric coercion: numbers as-is, booleans 1/0, null 0, strings
/// trimmed and parsed (blank → 0). Anything else is NaN; failures are
/// never hidden.
pub fn coerce_number(value: Option<&JsonValue>) -> f64 {
    match value {
        Some(JsonValue::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(JsonValue::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(JsonValue::Null) => 0.0,
        Some(JsonValue::String(s)) => parse_numeric_text(s),
        _ => f64::NAN,
    }
}

fn parse_numeric_text(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }
    match t {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    // Rust also accepts "inf" / "nan" spellings; those are not numbers here.
    if t.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') {
        return f64::NAN;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}

/// Format a metric with exactly four decimals. NaN and infinities keep
/// their visible markers. Exact ties round away from zero (`0.03125` →
/// `0.0313`), not to even.
pub fn format_metric(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        let marker = if v > 0.0 { "Infinity" } else { "-Infinity" };
        marker.to_string()
    } else if v == 0.0 {
        // Avoid "-0.0000".
        "0.0000".to_string()
    } else if let Some(units) = tie_rounded_up(v.abs()) {
        let sign = if v < 0.0 { "-" } else { "" };
        format!("{sign}{}.{:04}", units / 10_000, units % 10_000)
    } else {
        format!("{v:.4}")
    }
}

/// For a magnitude lying exactly halfway between two multiples of 1e-4,
/// the larger multiple in units of 1e-4.
///
/// `m * 1e4 = k + 0.5` with `m` a finite double only when `m = j / 32` for
/// odd `j`; scaling by 32 is exact, so the check is too.
fn tie_rounded_up(m: f64) -> Option<u64> {
    let scaled = m * 32.0;
    if scaled.fract() != 0.0 || scaled % 2.0 != 1.0 || scaled >= 9.0e15 {
        return None;
    }
    let j = scaled as u64;
    // m * 1e4 = 625 * j / 2 = k + 0.5
    Some((625 * j + 1) / 2)
}

// ---------------------------------------------------------------------------
// Analytics payload
// ---------------------------------------------------------------------------

/// `GET /api/analytics/` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsPayload {
    pub table: NamedTable,
    /// Wire name carries the service's spelling.
    #[serde(rename = "confussion_matrixes")]
    pub confusion_matrices: Vec<ConfusionEntry>,
    /// Model name → image path.
    #[serde(default)]
    pub graphs: Option<BTreeMap<String, String>>,
}

/// Caption plus a metrics table.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedTable {
    pub name: String,
    pub data: Record,
}

/// Confusion matrix of one model: predicted column → actual row → count.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfusionEntry {
    pub method: String,
    pub matrix: Record,
    #[serde(default)]
    pub roc_curve: Option<String>,
}

// ---------------------------------------------------------------------------
// Rendered values
// ---------------------------------------------------------------------------

/// A caption, a header row and data rows, all as display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub caption: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Everything shown for one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSection {
    /// Model name; unique across a dashboard.
    pub id: String,
    pub metrics: RenderedTable,
    /// Server-provided image path (ROC curve or generic graph).
    pub image: Option<String>,
    pub matrix: Option<RenderedTable>,
}

/// One entry of an assembled dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// The combined metrics table of all models.
    Overall(RenderedTable),
    Model(ModelSection),
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// `GET /api/users/me` response body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentUser {
    pub user_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Role {
    pub role_name: String,
}

/// `POST /api/auth/login` response body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Error body of the service. Validation failures carry a list of
/// `{ msg }` items, handler-raised errors a bare string.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub detail: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Items(Vec<ErrorItem>),
    Message(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorItem {
    pub msg: String,
}

impl ErrorBody {
    pub fn messages(self) -> Vec<String> {
        match self.detail {
            ErrorDetail::Items(items) => items.into_iter().map(|i| i.msg).collect(),
            ErrorDetail::Message(msg) => vec![msg],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: JsonValue) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn record_keys_put_indices_first_in_numeric_order() {
        let r = record(json!({"b": 1, "10": 2, "a": 3, "2": 4, "01": 5, "0": 6}));
        assert_eq!(record_keys(&r), vec!["0", "2", "10", "b", "a", "01"]);
    }

    #[test]
    fn cell_text_is_plain() {
        assert_eq!(cell_text(Some(&json!("SVC"))), "SVC");
        assert_eq!(cell_text(Some(&json!(5))), "5");
        assert_eq!(cell_text(Some(&json!(2.0))), "2");
        assert_eq!(cell_text(Some(&json!(0.25))), "0.25");
        assert_eq!(cell_text(None), "undefined");
    }

    #[test]
    fn coercion_keeps_failures_visible() {
        assert_eq!(coerce_number(Some(&json!("  0.5 "))), 0.5);
        assert_eq!(coerce_number(Some(&json!(""))), 0.0);
        assert_eq!(coerce_number(Some(&json!(true))), 1.0);
        assert_eq!(coerce_number(Some(&JsonValue::Null)), 0.0);
        assert!(coerce_number(Some(&json!("n/a"))).is_nan());
        assert!(coerce_number(Some(&json!("inf"))).is_nan());
        assert!(coerce_number(None).is_nan());
        assert_eq!(coerce_number(Some(&json!("1e-3"))), 0.001);
    }

    #[test]
    fn metric_formatting() {
        assert_eq!(format_metric(1.23456), "1.2346");
        assert_eq!(format_metric(-1.0), "-1.0000");
        assert_eq!(format_metric(-0.0), "0.0000");
        assert_eq!(format_metric(f64::NAN), "NaN");
        assert_eq!(format_metric(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn metric_ties_round_away_from_zero() {
        assert_eq!(format_metric(0.03125), "0.0313");
        assert_eq!(format_metric(-0.03125), "-0.0313");
        assert_eq!(format_metric(0.65625), "0.6563");
        assert_eq!(format_metric(3.03125), "3.0313");
        assert_eq!(format_metric(2.5), "2.5000");
        assert_eq!(format_metric(1.0 / 3.0), "0.3333");
        // 1.00005 is stored slightly below the tie.
        assert_eq!(format_metric(1.00005), format!("{:.4}", 1.00005_f64));
    }

    #[test]
    fn error_body_accepts_both_shapes() {
        let items: ErrorBody =
            serde_json::from_value(json!({"detail": [{"msg": "a", "loc": []}, {"msg": "b"}]}))
                .unwrap();
        assert_eq!(items.messages(), vec!["a", "b"]);

        let plain: ErrorBody = serde_json::from_value(json!({"detail": "nope"})).unwrap();
        assert_eq!(plain.messages(), vec!["nope"]);
    }

    #[test]
    fn payload_reads_service_field_names() {
        let payload: AnalyticsPayload = serde_json::from_value(json!({
            "table": {"name": "t", "data": {"model": {"0": "SVC"}}},
            "confussion_matrixes": [{"method": "SVC", "matrix": {}}],
        }))
        .unwrap();
        assert_eq!(payload.confusion_matrices.len(), 1);
        assert!(payload.graphs.is_none());
        assert!(payload.confusion_matrices[0].roc_curve.is_none());
    }
}
