//! Cross-Platform Path Utilities
//!
//! Functions for resolving application directories across platforms.
//! Handles ~/.agent-orchestrator/ and the per-project data directory.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Name of the per-user and per-project data directory
pub const APP_DIR_NAME: &str = ".agent-orchestrator";

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the application directory (~/.agent-orchestrator/)
pub fn app_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(APP_DIR_NAME))
}

/// Get the config file path (~/.agent-orchestrator/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(app_dir()?.join("config.json"))
}

/// Get the proposal data directory inside a project (<project>/.agent-orchestrator/)
pub fn project_data_dir(project_root: &Path) -> PathBuf {
    project_root.join(APP_DIR_NAME)
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the application directory, creating if it doesn't exist
pub fn ensure_app_dir() -> AppResult<PathBuf> {
    let path = app_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_dir() {
        let dir = app_dir();
        assert!(dir.is_ok());
        assert!(dir.unwrap().to_string_lossy().contains(APP_DIR_NAME));
    }

    #[test]
    fn test_config_path() {
        let path = config_path();
        assert!(path.is_ok());
        assert!(path.unwrap().to_string_lossy().ends_with("config.json"));
    }

    #[test]
    fn test_project_data_dir() {
        let dir = project_data_dir(Path::new("/work/app"));
        assert_eq!(dir, PathBuf::from("/work/app/.agent-orchestrator"));
    }

    #[test]
    fn test_ensure_dir_creates_nested() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir(&nested).unwrap();
    }
}
