use anyhow::Result;
use std::path::Path;
use log::info;

use crate::context::Context;
use crate::utils::error::CliError;

/// Compile a tree and print the query
pub fn execute(context: &Context, file: Option<&Path>) -> Result<()> {
    let tree = context.read_tree(file)?;
    info!("Compiling {} token group(s)", tree.len());

    match context.builder().build(&tree) {
        Ok(query) => {
            let formatted = context.formatter().format_query(&query)?;
            println!("{}", formatted);
            Ok(())
        },
        Err(e) => {
            eprintln!("{}", context.formatter().format_error(&e.to_string()));
            Err(CliError::from(e).into())
        },
    }
}
