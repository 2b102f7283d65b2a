use anyhow::Result;
use colored::*;
use serde_json::Value;

use crate::formatters::Formatter;

/// Indented text formatter
pub struct TextFormatter {
    /// Whether colors are enabled
    colored: bool,
}

impl TextFormatter {
    /// Create a colored text formatter
    pub fn new() -> Self {
        TextFormatter { colored: true }
    }

    /// Create a text formatter without colors
    pub fn without_colors() -> Self {
        TextFormatter { colored: false }
    }

    fn key(&self, key: &str) -> String {
        if self.colored {
            format!("{}", key.cyan())
        } else {
            key.to_string()
        }
    }

    fn write_value(&self, out: &mut String, value: &Value, depth: usize) {
        let indent = "  ".repeat(depth);

        match value {
            Value::Object(map) if !map.is_empty() => {
                for (key, nested) in map {
                    match nested {
                        Value::Object(m) if !m.is_empty() => {
                            out.push_str(&format!("{}{}:\n", indent, self.key(key)));
                            self.write_value(out, nested, depth + 1);
                        },
                        Value::Array(items) if !items.is_empty() => {
                            out.push_str(&format!("{}{}:\n", indent, self.key(key)));
                            self.write_value(out, nested, depth + 1);
                        },
                        scalar => out.push_str(&format!("{}{}: {}\n", indent, self.key(key), scalar)),
                    }
                }
            },
            Value::Array(items) if !items.is_empty() => {
                for item in items {
                    match item {
                        Value::Object(m) if !m.is_empty() => {
                            out.push_str(&format!("{}-\n", indent));
                            self.write_value(out, item, depth + 1);
                        },
                        scalar => out.push_str(&format!("{}- {}\n", indent, scalar)),
                    }
                }
            },
            scalar => out.push_str(&format!("{}{}\n", indent, scalar)),
        }
    }
}

impl Formatter for TextFormatter {
    fn format_query(&self, query: &Value) -> Result<String> {
        let mut out = String::new();
        self.write_value(&mut out, query, 0);
        Ok(out.trim_end().to_string())
    }

    fn format_error(&self, error: &str) -> String {
        if self.colored {
            format!("{}", error.red().bold())
        } else {
            format!("Error: {}", error)
        }
    }

    fn format_success(&self, success: &str) -> String {
        if self.colored {
            format!("{}", success.green().bold())
        } else {
            format!("OK: {}", success)
        }
    }
}
