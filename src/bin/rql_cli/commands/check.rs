use anyhow::Result;
use std::path::Path;

use crate::context::Context;
use crate::utils::error::CliError;

/// Compile a tree and print a one-line summary of the statement
pub fn execute(context: &Context, file: Option<&Path>) -> Result<()> {
    let tree = context.read_tree(file)?;

    match context.builder().compile_model(&tree) {
        Ok(model) => {
            let mut summary = format!(
                "{} on '{}' ({} filter entr{})",
                model.kind(),
                model.collection(),
                model.filter().len(),
                if model.filter().len() == 1 { "y" } else { "ies" }
            );
            if context.verbosity() > 0 {
                summary.push_str(&format!(
                    ", {} projected, {} sorted, skip {}, limit {}",
                    model.projection().len(),
                    model.sort_spec().len(),
                    model.skip_count(),
                    model.limit_count()
                ));
            }
            println!("{}", context.formatter().format_success(&summary));
            Ok(())
        },
        Err(e) => {
            eprintln!("{}", context.formatter().format_error(&e.to_string()));
            Err(CliError::from(e).into())
        },
    }
}
