//! Write a starter configuration.

use std::path::Path;

use crate::config::{default_base_dir, CliConfig};
use crate::error::{CliError, CliResult};
use crate::output::{InitOutput, OutputFormat, Render};

/// Execute the init command.
///
/// The data directory is the directory holding `config_path`.
pub fn init(config_path: &Path, format: OutputFormat, force: bool) -> CliResult<String> {
    if config_path.exists() && !force {
        return Err(CliError::ConfigExists(
            config_path.to_string_lossy().to_string(),
        ));
    }

    let base_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(default_base_dir);

    let config = CliConfig::example(&base_dir);
    config.validate()?;
    config.save(config_path)?;

    let output = InitOutput {
        config_path: config_path.to_string_lossy().to_string(),
        database: config.storage.database.to_string_lossy().to_string(),
        paths: config.paths.len(),
    };

    Ok(output.render(format))
}
