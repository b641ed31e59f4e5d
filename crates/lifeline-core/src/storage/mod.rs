mod config;
mod log_db;

pub use config::{AlertConfig, CmsConfig, Config, EmailConfig};
pub use log_db::LogDb;

use std::path::PathBuf;

/// Returns `~/.config/lifeline[-dev]/` based on LIFELINE_ENV.
///
/// Set LIFELINE_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("LIFELINE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("lifeline-dev")
    } else {
        base_dir.join("lifeline")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
