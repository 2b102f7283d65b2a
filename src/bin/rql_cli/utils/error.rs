use thiserror::Error;
use rql_builder::BuildError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Compile error: {0}")]
    Build(#[from] BuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No tree given on input")]
    EmptyInput,
}
