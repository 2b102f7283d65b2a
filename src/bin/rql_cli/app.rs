use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use rql_builder::{CountStyle, Dialect, LikeStyle, OutputShape};

use crate::commands;
use crate::context::Context;
use crate::formatters::OutputFormat;

#[derive(Parser)]
#[command(name = "rql-cli")]
#[command(about = "Compile analyzed RQL trees into MongoDB queries", long_about = None)]
pub struct Cli {
    /// Verbosity level (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty, global = true)]
    format: OutputFormat,

    /// Disable colors in text output
    #[arg(long, global = true)]
    no_color: bool,

    /// Dialect file (JSON) to start from
    #[arg(short, long, global = true)]
    dialect: Option<PathBuf>,

    /// Output shape, overrides the dialect file
    #[arg(long, value_enum, global = true)]
    shape: Option<ShapeArg>,

    /// COUNT spelling, overrides the dialect file
    #[arg(long, value_enum, global = true)]
    count_style: Option<CountArg>,

    /// LIKE spelling, overrides the dialect file
    #[arg(long, value_enum, global = true)]
    like_style: Option<LikeArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a tree and print the query
    Compile {
        /// Tree file, stdin when omitted
        file: Option<PathBuf>,
    },

    /// Compile a tree and print a one-line summary
    Check {
        /// Tree file, stdin when omitted
        file: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ShapeArg {
    Wire,
    Criteria,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum CountArg {
    Pipeline,
    Exists,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LikeArg {
    Regex,
    Literal,
}

impl Cli {
    fn dialect(&self) -> Result<Dialect> {
        let mut dialect = match &self.dialect {
            Some(path) => Dialect::from_file(path)?,
            None => Dialect::new(),
        };

        if let Some(shape) = self.shape {
            dialect = dialect.with_shape(match shape {
                ShapeArg::Wire => OutputShape::Wire,
                ShapeArg::Criteria => OutputShape::Criteria,
            });
        }
        if let Some(count) = self.count_style {
            dialect = dialect.with_count(match count {
                CountArg::Pipeline => CountStyle::Pipeline,
                CountArg::Exists => CountStyle::Exists,
            });
        }
        if let Some(like) = self.like_style {
            dialect = dialect.with_like(match like {
                LikeArg::Regex => LikeStyle::Regex,
                LikeArg::Literal => LikeStyle::Literal,
            });
        }

        Ok(dialect)
    }
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    let dialect = cli.dialect()?;
    let context = Context::new(cli.verbose, cli.format, dialect, !cli.no_color);

    match cli.command {
        Commands::Compile { file } => commands::compile::execute(&context, file.as_deref()),
        Commands::Check { file } => commands::check::execute(&context, file.as_deref()),
    }
}
