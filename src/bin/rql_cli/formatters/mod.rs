pub mod formatter;
pub mod text;
pub mod json;

pub use formatter::Formatter;
use clap::ValueEnum;

/// Available output formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON, one line
    Json,

    /// Indented JSON
    Pretty,

    /// Indented text with colored keys
    Text,
}
