// src/export/model.rs

use serde_json::{Map, Value};

/// Titled table handed to every writer.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(title: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            title: title.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn header_refs(&self) -> Vec<&str> {
        self.headers.iter().map(String::as_str).collect()
    }

    /// Rows as JSON objects keyed by header. Numeric cells stay numbers.
    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut obj = Map::new();
                for (h, cell) in self.headers.iter().zip(row) {
                    obj.insert(h.clone(), cell_value(cell));
                }
                Value::Object(obj)
            })
            .collect()
    }
}

fn cell_value(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    match cell.parse::<f64>() {
        Ok(n) if n.is_finite() && !cell.starts_with('+') => serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(cell.to_string())),
        _ => Value::String(cell.to_string()),
    }
}

/// Format a number for a cell without trailing zeros noise.
pub fn num(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

pub fn opt(v: &Option<String>) -> String {
    v.clone().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_keep_numbers_numeric() {
        let mut ds = Dataset::new("t", &["code", "value", "note"]);
        ds.push(vec!["IKU-01".into(), "87.5".into(), String::new()]);
        let rec = &ds.to_records()[0];
        assert_eq!(rec["code"], "IKU-01");
        assert_eq!(rec["value"], 87.5);
        assert!(rec["note"].is_null());
    }

    #[test]
    fn num_drops_zero_fraction() {
        assert_eq!(num(100.0), "100");
        assert_eq!(num(66.666), "66.67");
    }
}
