//! OS-specific path resolution for persisted flow state

use cp_types::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Get the CastPoll data directory
///
/// Priority:
/// 1. Runtime override via `CASTPOLL_ENV` environment variable: `~/.castpoll-{env}/`
/// 2. Development mode (debug builds): `~/.castpoll-dev/`
/// 3. Production mode (release builds): `~/.castpoll/`
pub fn data_dir() -> AppResult<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| AppError::Config("Could not determine home directory".to_string()))?;

    // Runtime override via environment variable (for testing)
    if let Ok(env_suffix) = std::env::var("CASTPOLL_ENV") {
        return Ok(home.join(format!(".castpoll-{}", env_suffix)));
    }

    #[cfg(debug_assertions)]
    let dir = home.join(".castpoll-dev");

    #[cfg(not(debug_assertions))]
    let dir = home.join(".castpoll");

    Ok(dir)
}

/// Get the inline-mode auth handoff file path
pub fn handoff_file() -> AppResult<PathBuf> {
    Ok(data_dir()?.join("auth_handoff.json"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir_exists(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| {
            AppError::Config(format!(
                "Failed to create directory {}: {}",
                path.display(),
                e
            ))
        })?;
    }
    Ok(())
}
