//! Show command

use anyhow::{anyhow, Result};
use genconf_core::Error;

use super::{load_project, print_error_table, Context};
use crate::cli::ShowArgs;
use crate::output;

/// Print the normalized document, with every default filled in
pub fn run(args: ShowArgs, ctx: &Context) -> Result<()> {
    let project = load_project(args.file.as_deref(), &ctx.settings)?;

    let config = match project.validate(&ctx.validator, args.kind) {
        Ok(config) => config,
        Err(Error::Validation(errors)) => {
            output::error(&format!(
                "{} is not a valid {} document",
                project.path, args.kind
            ));
            print_error_table(&errors);
            return Err(anyhow!("Validation failed with {} error(s)", errors.len()));
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print!("{}", serde_yaml_ng::to_string(&config)?);
    }

    Ok(())
}
