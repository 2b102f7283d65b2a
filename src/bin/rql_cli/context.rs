use std::fs;
use std::io::{self, Read};
use std::path::Path;
use log::debug;

use rql_builder::{Builder, Dialect, Tree};

use crate::formatters::json::JsonFormatter;
use crate::formatters::text::TextFormatter;
use crate::formatters::{Formatter, OutputFormat};
use crate::utils::error::CliError;

/// Execution context of the CLI
pub struct Context {
    /// Dialect every compile uses
    dialect: Dialect,

    /// Verbosity level
    verbosity: u8,

    /// Current formatter
    formatter: Box<dyn Formatter>,
}

impl Context {
    /// Create a new context
    pub fn new(verbosity: u8, format: OutputFormat, dialect: Dialect, color: bool) -> Self {
        let formatter: Box<dyn Formatter> = match format {
            OutputFormat::Json => Box::new(JsonFormatter::compact()),
            OutputFormat::Pretty => Box::new(JsonFormatter::new()),
            OutputFormat::Text if color => Box::new(TextFormatter::new()),
            OutputFormat::Text => Box::new(TextFormatter::without_colors()),
        };

        Context {
            dialect,
            verbosity,
            formatter,
        }
    }

    /// Get a builder for the configured dialect
    pub fn builder(&self) -> Builder {
        Builder::with_dialect(self.dialect)
    }

    /// Get the current formatter
    pub fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    /// Get the verbosity level
    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    /// Read a tree from `file`, or from stdin when no file is given
    pub fn read_tree(&self, file: Option<&Path>) -> Result<Tree, CliError> {
        let input = match file {
            Some(path) => {
                debug!("Reading tree from {}", path.display());
                fs::read_to_string(path)?
            },
            None => {
                debug!("Reading tree from stdin");
                let mut input = String::new();
                io::stdin().read_to_string(&mut input)?;
                input
            },
        };

        if input.trim().is_empty() {
            return Err(CliError::EmptyInput);
        }

        Ok(Tree::from_json(&input)?)
    }
}
