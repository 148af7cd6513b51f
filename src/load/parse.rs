use crate::Result;
use crate::diagnostics;
use crate::load::source::DataFile;

use anyhow::{Context, bail};
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use std::fs;
use std::path::Path;

/// Contents of a script-global data file.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptGlobal {
    /// The assigned global, or `None` for a bare JSON array.
    pub name: Option<String>,
    pub entries: Vec<Value>,
}

/// Parse a script-global data file.
///
/// Accepted shapes:
/// const hierarchyNodeData = [ ... ];
/// var logMessages = [ ... ]
/// prerenderedSubnets = [ ... ];
/// [ ... ]
pub fn parse_script_global(text: &str) -> Result<ScriptGlobal> {
    // 1) optional declaration keyword
    // 2) global identifier
    const ASSIGN_RE: &str = r#"^\s*(?:(?:var|let|const)\s+)?([A-Za-z_$][A-Za-z0-9_$]*)\s*=\s*"#;
    let re = Regex::new(ASSIGN_RE)?;

    let (name, body) = match re.captures(text) {
        Some(caps) => {
            let whole = caps.get(0).map_or(0, |m| m.end());
            (caps.get(1).map(|m| m.as_str().to_string()), &text[whole..])
        }
        None => (None, text),
    };

    let body = body.trim_end();
    let body = body.strip_suffix(';').unwrap_or(body).trim();
    if body.is_empty() {
        bail!(
            "{}",
            diagnostics::error_message("data file has no array after the assignment")
        );
    }

    let body = strip_line_continuations(body);
    let value: Value = serde_json::from_str(&body).context("data file is not valid JSON")?;
    let entries = match value {
        Value::Array(items) => items,
        other => bail!(
            "{}",
            diagnostics::error_message(format!(
                "expected an array of records, found {}",
                kind_of(&other)
            ))
        ),
    };

    Ok(ScriptGlobal { name, entries })
}

/// Read one data file from `dir` and return its records.
///
/// A global name that differs from the expected one is only a warning: the
/// records are still usable.
pub fn load_data_file(dir: &Path, file: DataFile) -> Result<Vec<Value>> {
    let path = dir.join(file.file_name());
    let text = fs::read_to_string(&path)
        .with_context(|| diagnostics::error_message(format!("read {}", path.display())))?;

    let global = parse_script_global(&text)
        .with_context(|| diagnostics::error_message(format!("parse {}", path.display())))?;

    if let Some(name) = &global.name {
        if name != file.global_name() {
            diagnostics::warn(format!(
                "{} assigns '{}', expected '{}'",
                path.display(),
                name,
                file.global_name()
            ));
        }
    }

    tracing::debug!(file = %path.display(), records = global.entries.len(), "loaded data file");
    Ok(global.entries)
}

/// Write `entries` as a script-global data file.
pub fn write_data_file(path: &Path, file: DataFile, entries: &[Value]) -> Result<()> {
    let json = serde_json::to_string_pretty(entries)?;
    let text = format!("const {} = {};\n", file.global_name(), json);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
    }
    fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Remove JS line continuations (an unescaped backslash before a newline).
///
/// Prerendered SVG strings are written with every newline continued this
/// way, which JSON does not accept.
fn strip_line_continuations(body: &str) -> Cow<'_, str> {
    if !body.contains("\\\n") && !body.contains("\\\r\n") {
        return Cow::Borrowed(body);
    }

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('\n') => {
                chars.next();
            }
            Some('\r') => {
                chars.next();
                if chars.peek() == Some(&'\n') {
                    chars.next();
                } else {
                    out.push_str("\\\r");
                }
            }
            // Escape pair: copy both so an escaped backslash is not
            // mistaken for a continuation.
            Some(_) => {
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
