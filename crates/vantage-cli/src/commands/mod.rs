//! Command implementations.

pub mod cleanup;
pub mod init_config;
pub mod run;
pub mod show;

pub use self::cleanup::execute_cleanup;
pub use self::init_config::execute_init_config;
pub use self::run::execute_run;
pub use self::show::execute_show;

use crate::error::{CliError, Result};
use std::path::Path;
use tracing::warn;
use vantage_pipeline::PipelineConfig;

/// Load the configuration file, or the built-in defaults when it is absent.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    if !path.exists() {
        warn!(path = %path.display(), "Configuration file not found, using defaults");
        return Ok(PipelineConfig::default());
    }
    PipelineConfig::load(path).map_err(|e| CliError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vantage.toml");
        std::fs::write(&path, "[sources.unknown]\nenabled = true\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
