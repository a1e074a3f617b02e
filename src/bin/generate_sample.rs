use anyhow::{Context, Result};
use serde_json::{json, Map, Value};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Counts of a binary classifier on the test split.
struct Confusion {
    tn: u64,
    fp: u64,
    fn_: u64,
    tp: u64,
}

impl Confusion {
    fn simulate(truth: &[bool], skill: f64, rng: &mut SimpleRng) -> Self {
        let mut c = Confusion { tn: 0, fp: 0, fn_: 0, tp: 0 };
        for &actual in truth {
            let predicted = if rng.next_f64() < skill { actual } else { !actual };
            match (actual, predicted) {
                (false, false) => c.tn += 1,
                (false, true) => c.fp += 1,
                (true, false) => c.fn_ += 1,
                (true, true) => c.tp += 1,
            }
        }
        c
    }

    fn scores(&self) -> [(&'static str, f64); 5] {
        let ratio = |a: u64, b: u64| if b == 0 { 0.0 } else { a as f64 / b as f64 };
        let total = self.tn + self.fp + self.fn_ + self.tp;
        let precision = ratio(self.tp, self.tp + self.fp);
        let recall = ratio(self.tp, self.tp + self.fn_);
        let specificity = ratio(self.tn, self.tn + self.fp);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        [
            ("accuracy", ratio(self.tp + self.tn, total)),
            ("precision", precision),
            ("recall", recall),
            ("balanced_accuracy", (recall + specificity) / 2.0),
            ("f1", f1),
        ]
    }

    /// Predicted column → actual row, the layout of `DataFrame.to_dict()`.
    fn matrix(&self) -> Value {
        json!({
            "Предсказанное 0": {"Настоящее 0": self.tn, "Настоящее 1": self.fn_},
            "Предсказанное 1": {"Настоящее 0": self.fp, "Настоящее 1": self.tp},
        })
    }
}

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_analytics.json".to_string());
    let mut rng = SimpleRng::new(42);

    // Test split: 200 rows, about 40% relevant.
    let truth: Vec<bool> = (0..200).map(|_| rng.next_f64() < 0.4).collect();

    let models = [
        ("KNeighborsClassifier", 0.78, None),
        ("LogisticRegression", 0.84, Some("/static/roc/LogisticRegression.png")),
        ("RandomForestClassifier", 0.91, Some("/static/roc/RandomForestClassifier.png")),
    ];

    let mut columns: Map<String, Value> = Map::new();
    let mut model_column = Map::new();
    let mut matrices = Vec::new();
    let mut graphs = Map::new();

    for (row, (name, skill, roc)) in models.iter().enumerate() {
        let c = Confusion::simulate(&truth, *skill, &mut rng);
        for (metric, value) in c.scores() {
            let column = columns
                .entry(metric)
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(cells) = column {
                cells.insert(row.to_string(), json!(value));
            }
        }
        model_column.insert(row.to_string(), json!(name));

        let mut entry = json!({"method": name, "matrix": c.matrix()});
        if let Some(path) = roc {
            entry["roc_curve"] = json!(path);
        }
        matrices.push(entry);
        graphs.insert(name.to_string(), json!(format!("/static/graphs/{name}.png")));
    }
    columns.insert("model".to_string(), Value::Object(model_column));

    let payload = json!({
        "table": {
            "name": "Оценка ошибки классификации",
            "data": columns,
        },
        "confussion_matrixes": matrices,
        "graphs": graphs,
    });

    let text = serde_json::to_string_pretty(&payload).context("serializing payload")?;
    std::fs::write(&output_path, text).with_context(|| format!("writing {output_path}"))?;

    println!(
        "Wrote {} models ({} test rows each) to {output_path}",
        models.len(),
        truth.len()
    );
    Ok(())
}
