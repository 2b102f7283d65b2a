use anyhow::Result;
use serde_json::Value;

/// Output formatter
pub trait Formatter {
    /// Format a compiled query for display
    fn format_query(&self, query: &Value) -> Result<String>;

    /// Format an error message
    fn format_error(&self, error: &str) -> String;

    /// Format a success message
    fn format_success(&self, success: &str) -> String;
}
