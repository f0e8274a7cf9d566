//! Configuration Management
//!
//! Handles persistent configuration storage for khair.

use crate::api::client::DEFAULT_API_URL;
use crate::i18n::Locale;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding the configured API base
pub const API_URL_ENV: &str = "KHAIR_API_URL";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// API base URL, e.g. `https://khair.example.org/api`
    #[serde(default)]
    pub api_url: Option<String>,
    /// Email of the last successful sign-in
    #[serde(default)]
    pub last_email: Option<String>,
    #[serde(default)]
    pub locale: Option<Locale>,
    /// Last viewed resource
    #[serde(default)]
    pub last_resource: Option<String>,
    /// Report range, `YYYY-MM-DD`
    #[serde(default)]
    pub report_start: Option<String>,
    #[serde(default)]
    pub report_end: Option<String>,
}

impl Config {
    /// Directory holding config.json and khair.log
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("khair"))
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        // Unit tests never touch the user's file
        if cfg!(test) {
            return None;
        }
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content),
            Err(e) => {
                tracing::warn!("could not read {:?}: {}", path, e);
                Self::default()
            },
        }
    }

    /// Parse a config file; a malformed file is ignored
    pub fn parse(content: &str) -> Self {
        serde_json::from_str(content).unwrap_or_else(|e| {
            tracing::warn!("ignoring malformed config: {}", e);
            Self::default()
        })
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Get effective API URL (CLI > env > config > default)
    pub fn effective_api_url(&self, cli: Option<&str>) -> String {
        let env = std::env::var(API_URL_ENV).ok();
        resolve_api_url(cli, env.as_deref(), self.api_url.as_deref())
    }

    /// Get effective locale (CLI > config > English)
    pub fn effective_locale(&self, cli: Option<Locale>) -> Locale {
        cli.or(self.locale).unwrap_or_default()
    }

    /// Remember the signed-in email and save
    pub fn set_last_email(&mut self, email: &str) -> Result<()> {
        self.last_email = Some(email.to_string());
        self.save()
    }

    /// Set resource and save
    pub fn set_last_resource(&mut self, key: &str) -> Result<()> {
        self.last_resource = Some(key.to_string());
        self.save()
    }

    /// Set report range and save
    pub fn set_report_range(&mut self, start: &str, end: &str) -> Result<()> {
        self.report_start = Some(start.to_string());
        self.report_end = Some(end.to_string());
        self.save()
    }
}

fn resolve_api_url(cli: Option<&str>, env: Option<&str>, file: Option<&str>) -> String {
    [cli, env, file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .unwrap_or(DEFAULT_API_URL)
        .to_string()
}
