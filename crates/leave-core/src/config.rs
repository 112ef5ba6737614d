//! File-system locations for the leave bot.
//!
//! ```text
//! ~/.leave-bot/
//! ├── config/
//! │   └── .env.local   # secrets (bot token, API keys)
//! └── data/            # JSON collections of the file backend
//! ```
//!
//! `LEAVEBOT_STATE_DIR` overrides the base directory.

use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::debug;

/// Environment variable for a custom state directory.
pub const STATE_DIR_ENV: &str = "LEAVEBOT_STATE_DIR";

const DEFAULT_STATE_DIR: &str = ".leave-bot";
const CONFIG_SUBDIR: &str = "config";
const DATA_SUBDIR: &str = "data";

static STATE_DIR_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Get the state directory.
///
/// Resolved once from `LEAVEBOT_STATE_DIR`, then `~/.leave-bot`, then
/// `.leave-bot` in the current directory.
pub fn state_dir() -> PathBuf {
    STATE_DIR_CACHE
        .get_or_init(|| {
            std::env::var(STATE_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    dirs::home_dir()
                        .map(|h| h.join(DEFAULT_STATE_DIR))
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
                })
        })
        .clone()
}

pub fn config_dir() -> PathBuf {
    state_dir().join(CONFIG_SUBDIR)
}

/// Default directory for the JSON-file backend.
pub fn data_dir() -> PathBuf {
    state_dir().join(DATA_SUBDIR)
}

/// The `.env.local` file holding secrets.
pub fn env_file() -> PathBuf {
    config_dir().join(".env.local")
}

/// Loads environment files, first match wins per variable.
///
/// Order: [`env_file`], then `.env.local` and `.env` in the working
/// directory. Missing files are skipped.
pub fn load_env_files() {
    let candidates = [env_file(), PathBuf::from(".env.local"), PathBuf::from(".env")];
    for path in candidates {
        if dotenvy::from_path(&path).is_ok() {
            debug!(path = %path.display(), "Loaded environment file");
        }
    }
}

/// Ensures the data directory exists.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn ensure_data_dir() -> std::io::Result<PathBuf> {
    let dir = data_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}
