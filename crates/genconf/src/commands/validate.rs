//! Validate command

use anyhow::{anyhow, Result};
use genconf_core::Error;

use super::{load_project, print_error_table, Context};
use crate::cli::ValidateArgs;
use crate::output;

pub fn run(args: ValidateArgs, ctx: &Context) -> Result<()> {
    let project = load_project(args.file.as_deref(), &ctx.settings)?;

    match project.validate(&ctx.validator, args.kind) {
        Ok(config) => {
            if args.json {
                println!("[]");
            } else {
                output::success(&format!("{} is a valid {} document", project.path, args.kind));
                for (key, value) in config.summary() {
                    output::kv(&key, &value);
                }
            }
            Ok(())
        }
        Err(Error::Validation(errors)) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&errors)?);
            } else {
                output::error(&format!(
                    "{} is not a valid {} document",
                    project.path, args.kind
                ));
                print_error_table(&errors);
            }
            Err(anyhow!("Validation failed with {} error(s)", errors.len()))
        }
        Err(e) => Err(e.into()),
    }
}
