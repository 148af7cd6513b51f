//! Lenient accessors over opaque JSON records.
//!
//! Records from the data files are kept as `serde_json::Value` so that the
//! generic dump shows every field, in file order. The helpers here read the
//! few well-known fields the pages need and never fail: a missing or
//! mistyped field reads as `None`.

use serde_json::Value;

/// Coerce a value to text the way a browser would when concatenating it into
/// markup: strings raw, arrays comma-joined, objects opaque.
pub fn js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_string(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::Null => String::new(),
                other => js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Whole floats print without a fraction (`1.0` reads `1`, `-0.0` reads `0`).
fn number_string(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f == 0.0 => "0".to_string(),
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
        _ => n.to_string(),
    }
}

/// The record's `id` as text, if it has one.
pub fn record_id(record: &Value) -> Option<String> {
    record.get("id").map(js_string)
}

pub fn field_text(record: &Value, key: &str) -> Option<String> {
    record.get(key).map(js_string)
}

/// True for `""`, `[]` and `{}`; these render as "not found" placeholders.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// The elements of an array field; absent or non-array fields are empty.
pub fn array_field<'a>(record: &'a Value, key: &str) -> &'a [Value] {
    match record.get(key) {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

/// One entry of a `stack_trace` array.
///
/// Unresolved traces are bare return addresses; resolved ones are objects
/// with `file`/`line` (or `frameName`/`lineNumber` from older exports).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackFrame {
    pub addr: Option<String>,
    pub name: Option<String>,
    pub file: Option<String>,
    pub line: Option<String>,
}

impl StackFrame {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(_) => {
                let text = |key: &str| {
                    value
                        .get(key)
                        .filter(|v| !v.is_null() && !is_blank(v))
                        .map(js_string)
                };
                StackFrame {
                    addr: text("addr"),
                    name: text("frameName"),
                    file: text("file"),
                    line: text("line").or_else(|| text("lineNumber")),
                }
            }
            other => StackFrame {
                addr: Some(js_string(other)),
                ..StackFrame::default()
            },
        }
    }

    /// Text shown for the frame in the dropdown.
    pub fn label(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        match (&self.file, &self.line, &self.addr) {
            (Some(file), Some(line), _) => format!("{}:{}", file, line),
            (Some(file), None, _) => file.clone(),
            (None, _, Some(addr)) => addr.clone(),
            (None, Some(line), None) => format!("line {}", line),
            (None, None, None) => "unknown frame".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn js_string_matches_browser_coercion() {
        assert_eq!(js_string(&json!("abc")), "abc");
        assert_eq!(js_string(&json!(12)), "12");
        assert_eq!(js_string(&json!(true)), "true");
        assert_eq!(js_string(&json!(null)), "null");
        assert_eq!(js_string(&json!([1, "a", null])), "1,a,");
        assert_eq!(js_string(&json!({"a": 1})), "[object Object]");
    }

    #[test]
    fn whole_floats_print_without_fraction() {
        assert_eq!(js_string(&json!(1.0)), "1");
        assert_eq!(js_string(&json!(-3.0)), "-3");
        assert_eq!(js_string(&json!(-0.0)), "0");
        assert_eq!(js_string(&json!(2.5)), "2.5");
        assert_eq!(js_string(&json!(12)), "12");
        assert_eq!(js_string(&json!([1.0, 2.5])), "1,2.5");
    }

    #[test]
    fn record_id_reads_numbers_and_strings() {
        assert_eq!(record_id(&json!({"id": 7})), Some("7".to_string()));
        assert_eq!(record_id(&json!({"id": "n7"})), Some("n7".to_string()));
        assert_eq!(record_id(&json!({"name": "x"})), None);
    }

    #[test]
    fn array_field_tolerates_missing_and_mistyped() {
        let rec = json!({"clocks": ["clk"], "meta": {}});
        assert_eq!(array_field(&rec, "clocks").len(), 1);
        assert!(array_field(&rec, "meta").is_empty());
        assert!(array_field(&rec, "nope").is_empty());
    }

    #[test]
    fn stack_frame_labels() {
        assert_eq!(StackFrame::from_value(&json!(4096)).label(), "4096");
        assert_eq!(
            StackFrame::from_value(&json!({"addr": 1, "file": "a.cpp", "line": 3})).label(),
            "a.cpp:3"
        );
        let old = StackFrame::from_value(&json!({"frameName": "main", "lineNumber": 9}));
        assert_eq!(old.label(), "main");
        assert_eq!(old.line.as_deref(), Some("9"));
        assert_eq!(StackFrame::from_value(&json!({})).label(), "unknown frame");
    }
}
