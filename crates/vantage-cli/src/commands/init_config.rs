//! Init-config command implementation.

use crate::cli::InitConfigArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;
use vantage_pipeline::PipelineConfig;

/// Execute the init-config command.
pub fn execute_init_config(args: InitConfigArgs, path: &Path, formatter: &Formatter) -> Result<()> {
    write_starter(path, args.force)?;
    println!("{}", formatter.success(&format!("Wrote {}", path.display())));
    Ok(())
}

fn write_starter(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::AlreadyExists(path.to_path_buf()));
    }
    let contents = PipelineConfig::starter().to_toml()?;
    std::fs::write(path, contents)?;
    Ok(())
}
