//! Version command

use anyhow::Result;

use crate::cli::VersionArgs;
use crate::output;
use crate::version::VersionInfo;

pub fn run(args: VersionArgs) -> Result<()> {
    let info = VersionInfo::current();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", info);
    for (label, value) in info.rows() {
        output::kv(label, &value);
    }
    Ok(())
}
