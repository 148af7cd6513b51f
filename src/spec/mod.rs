//! Record layer: typed views over the externally produced data records.
//!
//! This module is intentionally separate from loading and rendering.
//! It owns:
//! - lenient field accessors and stack frames (node / group records)
//! - log message records and their typed parts

pub mod message;
pub mod record;

pub use message::{LogMessage, MessagePart, severity_color};
pub use record::{StackFrame, array_field, is_blank, js_string, record_id};
