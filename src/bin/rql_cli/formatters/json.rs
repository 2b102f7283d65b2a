use anyhow::Result;
use serde_json::{json, Value};

use crate::formatters::Formatter;

/// JSON formatter
pub struct JsonFormatter {
    /// Whether output is indented
    pretty: bool,
}

impl JsonFormatter {
    /// Create an indenting JSON formatter
    pub fn new() -> Self {
        JsonFormatter { pretty: true }
    }

    /// Create a single-line JSON formatter
    pub fn compact() -> Self {
        JsonFormatter { pretty: false }
    }

    fn render(&self, value: &Value) -> serde_json::Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }
}

impl Formatter for JsonFormatter {
    fn format_query(&self, query: &Value) -> Result<String> {
        Ok(self.render(query)?)
    }

    fn format_error(&self, error: &str) -> String {
        self.render(&json!({ "error": error }))
            .unwrap_or_else(|_| format!("{{\"error\":\"{}\"}}", error))
    }

    fn format_success(&self, success: &str) -> String {
        self.render(&json!({ "success": success }))
            .unwrap_or_else(|_| format!("{{\"success\":\"{}\"}}", success))
    }
}
