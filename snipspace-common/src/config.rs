//! Configuration loading and root folder resolution

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `SNIPSPACE_ROOT_FOLDER` environment variable
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&Path>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("SNIPSPACE_ROOT_FOLDER") {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = find_config_file() {
        if let Ok(contents) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&contents) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent default
    default_root_folder()
}

/// Locate the config file: `<config dir>/snipspace/config.toml`, with
/// `/etc/snipspace/config.toml` as a unix-wide fallback.
fn find_config_file() -> Result<PathBuf> {
    if let Some(user_config) = dirs::config_dir().map(|d| d.join("snipspace").join("config.toml"))
    {
        if user_config.exists() {
            return Ok(user_config);
        }
    }

    #[cfg(unix)]
    {
        let system_config = PathBuf::from("/etc/snipspace/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("snipspace"))
        .unwrap_or_else(|| PathBuf::from("./snipspace_data"))
}

/// Path of the SQLite database inside the root folder.
pub fn database_path(root: &Path) -> PathBuf {
    root.join("snipspace.db")
}

/// Directory receiving uploaded entry images.
pub fn images_dir(root: &Path) -> PathBuf {
    root.join("entry-images")
}

/// Create the root folder and image directory if missing.
pub fn ensure_directories(root: &Path) -> Result<()> {
    std::fs::create_dir_all(root)?;
    std::fs::create_dir_all(images_dir(root))?;
    Ok(())
}
