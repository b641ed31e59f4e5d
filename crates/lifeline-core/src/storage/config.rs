//! TOML-based application configuration.
//!
//! Stores collaborator credentials and workflow settings:
//! - CMS (Storyblok) token and space id
//! - Email gateway credentials
//! - Countdown and fan-out defaults
//! - The emergency contact book
//!
//! Configuration is stored at `~/.config/lifeline/config.toml`. The core
//! never reads environment variables for any of this -- a loaded `Config`
//! is injected into collaborator constructors.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::model::{Contact, ContactDirectory};

use super::data_dir;

/// Storyblok access configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CmsConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub space_id: String,
}

/// HTTP email gateway configuration. All fields empty means "use the mock
/// channel".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub gateway_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_from_address")]
    pub from_address: String,
}

/// Alert workflow configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// False-alarm confirmation window.
    #[serde(default = "default_timeout_secs")]
    pub confirmation_timeout_secs: u64,
    /// How many contacts to fan out to, by priority.
    #[serde(default = "default_max_contacts")]
    pub max_contacts: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout_secs: default_timeout_secs(),
            max_contacts: default_max_contacts(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/lifeline/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cms: CmsConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub alert: AlertConfig,
    /// Maps/geocoding API key (used by the location-aware UI layer).
    #[serde(default)]
    pub maps_api_key: String,
    /// Public base URL of the deployment, if any.
    #[serde(default)]
    pub base_url: String,
    /// Emergency contact book.
    #[serde(default, rename = "contact")]
    pub contacts: Vec<Contact>,
}

// Default functions
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_contacts() -> usize {
    3
}
fn default_from_address() -> String {
    "alerts@lifeline.local".to_string()
}

impl Config {
    /// Load from the default location, falling back to defaults when the
    /// file does not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/lifeline"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Whether the CMS collaborator can be used at all.
    pub fn cms_configured(&self) -> bool {
        !self.cms.token.is_empty() && !self.cms.space_id.is_empty()
    }
}

impl ContactDirectory for Config {
    /// Single-user config file: the user id is accepted for interface
    /// parity but ignored.
    fn list_contacts(&self, _user_id: &str) -> Result<Vec<Contact>, Box<dyn std::error::Error>> {
        Ok(self.contacts.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.alert.confirmation_timeout_secs, 30);
        assert_eq!(config.alert.max_contacts, 3);
        assert!(!config.cms_configured());
        assert!(config.contacts.is_empty());
    }

    #[test]
    fn roundtrip_through_toml() {
        let mut config = Config::default();
        config.cms.token = "tok".to_string();
        config.cms.space_id = "123".to_string();
        config.contacts.push(Contact {
            name: "Ada".to_string(),
            relationship: "daughter".to_string(),
            phone: "+15550100".to_string(),
            email: Some("ada@example.com".to_string()),
            is_primary: true,
            priority_order: 1,
        });

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.cms_configured());
        assert_eq!(loaded.contacts.len(), 1);
        assert_eq!(loaded.contacts[0].name, "Ada");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[cms]\ntoken = \"t\"\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.cms.token, "t");
        assert_eq!(loaded.alert.confirmation_timeout_secs, 30);
        assert_eq!(loaded.email.from_address, "alerts@lifeline.local");
    }

    #[test]
    fn directory_returns_contact_book() {
        let mut config = Config::default();
        config.contacts.push(Contact {
            name: "Grace".to_string(),
            relationship: "neighbor".to_string(),
            phone: "+15550111".to_string(),
            email: None,
            is_primary: false,
            priority_order: 2,
        });
        let listed = config.list_contacts("any-user").unwrap();
        assert_eq!(listed.len(), 1);
    }
}
