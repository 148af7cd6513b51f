//! Record-to-markup serialization shared by all pages.
//!
//! A record becomes nested `<ul>` lists: scalars are labeled lines, arrays
//! and objects open a nested list under their key. Stack traces get a
//! dropdown of source links instead of a plain list.

use crate::spec::{StackFrame, is_blank, js_string};

use serde_json::Value;

/// How source links for stack frames are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLinks {
    /// Prepended to `file:line`, e.g. `vscode://file`.
    pub prefix: String,
    /// Source file used for frames that do not name one. Empty means those
    /// frames get no link target.
    pub fallback_source: String,
}

impl Default for FrameLinks {
    fn default() -> Self {
        FrameLinks {
            prefix: "vscode://file".to_string(),
            fallback_source: String::new(),
        }
    }
}

impl FrameLinks {
    pub fn href(&self, frame: &StackFrame) -> String {
        let file = match frame.file.as_deref() {
            Some(file) => file,
            None if !self.fallback_source.is_empty() => self.fallback_source.as_str(),
            None => return "#".to_string(),
        };
        match &frame.line {
            Some(line) => format!("{}{}:{}", self.prefix, file, line),
            None => format!("{}{}", self.prefix, file),
        }
    }
}

/// Whether `stack_trace` arrays inside a dump are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackTraces {
    /// Leave the list under the key empty (popover dumps).
    Hidden,
    /// Render the frame dropdown.
    Dropdown,
}

const STACK_TRACE_KEY: &str = "stack_trace";

/// Serializer configuration; cheap to copy around.
#[derive(Debug, Clone, Copy)]
pub struct Markup<'a> {
    pub links: &'a FrameLinks,
    pub stack_traces: StackTraces,
}

impl<'a> Markup<'a> {
    pub fn new(links: &'a FrameLinks, stack_traces: StackTraces) -> Self {
        Markup {
            links,
            stack_traces,
        }
    }

    /// List items for every field of `value` (no enclosing `<ul>`).
    ///
    /// Arrays are walked with their indices as keys. A bare scalar becomes a
    /// single item.
    pub fn fields(&self, value: &Value) -> String {
        let mut out = String::new();
        self.write_fields(value, &mut out);
        out
    }

    /// A complete popover body: the field list wrapped in `<ul>`.
    ///
    /// `None` stands for a record that no longer exists.
    pub fn entity(&self, entity: Option<&Value>) -> String {
        match entity {
            Some(value) => format!("<ul>{}</ul>", self.fields(value)),
            None => "<ul><li>This node has been removed during post processing.</li></ul>"
                .to_string(),
        }
    }

    /// One labeled property, with a placeholder when it is missing or blank.
    pub fn property(&self, record: &Value, key: &str, description: &str) -> String {
        match record.get(key) {
            None => missing_property(description),
            Some(value) if is_blank(value) => missing_property(description),
            Some(value @ (Value::Array(_) | Value::Object(_))) => {
                format!("{}:\n<ul>{}</ul>", description, self.fields(value))
            }
            Some(value) => format!("{}: {}", description, escape_html(&js_string(value))),
        }
    }

    /// Dropdown of source links for a stack trace.
    pub fn stack_trace(&self, frames: &[Value]) -> String {
        if frames.is_empty() {
            return "<div class=\"stack-trace\">Stacktrace: No stacktrace found for this node.</div>"
                .to_string();
        }

        let mut out = String::from("<div class=\"stack-trace dropdown\">");
        out.push_str(
            "<button class=\"custom-btn btn-sm dropdown-toggle\" type=\"button\" \
             data-bs-toggle=\"dropdown\" aria-expanded=\"false\">Stack Trace</button>",
        );
        out.push_str("<ul class=\"dropdown-menu dropdown-menu-end\">");
        for frame in frames.iter().map(StackFrame::from_value) {
            out.push_str(&format!(
                "<li><a class=\"dropdown-item\" href=\"{}\">{}</a></li>",
                escape_html(&self.links.href(&frame)),
                escape_html(&frame.label())
            ));
        }
        out.push_str("</ul></div>");
        out
    }

    fn write_fields(&self, value: &Value, out: &mut String) {
        match value {
            Value::Object(map) => {
                for (key, field) in map {
                    self.write_field(key, field, out);
                }
            }
            Value::Array(items) => {
                for (idx, item) in items.iter().enumerate() {
                    self.write_field(&idx.to_string(), item, out);
                }
            }
            scalar => {
                out.push_str(&format!("<li>{}</li>", escape_html(&js_string(scalar))));
            }
        }
    }

    fn write_field(&self, key: &str, value: &Value, out: &mut String) {
        let key_html = escape_html(key);
        match value {
            Value::Array(items) => {
                out.push_str(&format!("<li><strong>{}:</strong><ul>", key_html));
                if items.is_empty() {
                    out.push_str("<li>Empty</li>");
                } else if key == STACK_TRACE_KEY {
                    if self.stack_traces == StackTraces::Dropdown {
                        out.push_str(&self.stack_trace(items));
                    }
                } else {
                    for item in items {
                        match item {
                            // Object elements contribute their fields directly.
                            Value::Object(_) => self.write_fields(item, out),
                            other => out.push_str(&format!(
                                "<li>{}</li>",
                                escape_html(&js_string(other))
                            )),
                        }
                    }
                }
                out.push_str("</ul></li>");
            }
            Value::Object(_) => {
                out.push_str(&format!("<li><strong>{}:</strong><ul>", key_html));
                self.write_fields(value, out);
                out.push_str("</ul></li>");
            }
            scalar => {
                out.push_str(&format!(
                    "<li><strong>{}:</strong> {}</li>",
                    key_html,
                    escape_html(&js_string(scalar))
                ));
            }
        }
    }
}

fn missing_property(description: &str) -> String {
    format!("{}: No {} found for this node.", description, description)
}

/// Escape text for HTML bodies and quoted attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
