// harborctl - CLI for the Harbor container registry API
// Copyright (C) 2026 harborctl contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::render::OutputFormat;
use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    pub url: Option<String>,
    pub username: Option<String>,
    pub secret: Option<String>,
    pub output: Option<OutputSettings>,
}

/// Settings for the result formatter. Any of these can be overridden per
/// invocation from the command line.
#[derive(Debug, Serialize, Deserialize, Default, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct OutputSettings {
    pub format: OutputFormat,
    pub table: TableSettings,
    pub json: JsonSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct TableSettings {
    /// Prefer the curated compact layout over the generic field tree.
    pub compact: bool,
    /// Include field descriptions in generic tables.
    pub description: bool,
    /// Nesting levels to expand; negative means unlimited, `0` renders only
    /// the top level.
    pub max_depth: i64,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            compact: false,
            description: false,
            max_depth: -1,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct JsonSettings {
    pub indent: usize,
    pub sort_keys: bool,
}

impl Default for JsonSettings {
    fn default() -> Self {
        Self {
            indent: 2,
            sort_keys: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Local,
    User,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not locate a writable config directory for the current user")]
    MissingConfigDir,
    #[error(
        "Harbor URL and credentials are required; set them with `harborctl configure --url <url> --username <user> --secret <secret>`"
    )]
    MissingCredentials,
}

#[derive(Debug)]
pub struct EffectiveConfig {
    pub url: String,
    pub username: String,
    pub secret: String,
    pub output: OutputSettings,
}

pub fn config_path(scope: Scope, cwd: &Path) -> Result<PathBuf> {
    match scope {
        Scope::Local => Ok(cwd.join(".harborctl.yaml")),
        Scope::User => {
            if let Ok(custom) = env::var("HARBORCTL_CONFIG_DIR") {
                return Ok(PathBuf::from(custom).join("config.yaml"));
            }
            let base = config_dir().ok_or(ConfigError::MissingConfigDir)?;
            Ok(base.join("harborctl").join("config.yaml"))
        }
    }
}

pub fn load(cwd: &Path) -> Result<Config> {
    let user = read_if_exists(&config_path(Scope::User, cwd)?)?.unwrap_or_default();
    let local = read_if_exists(&config_path(Scope::Local, cwd)?)?.unwrap_or_default();
    Ok(merge(user, local))
}

pub fn load_scope(scope: Scope, cwd: &Path) -> Result<Config> {
    Ok(read_if_exists(&config_path(scope, cwd)?)?.unwrap_or_default())
}

pub fn save(scope: Scope, config: &Config, cwd: &Path) -> Result<PathBuf> {
    let path = config_path(scope, cwd)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let serialized = serde_yaml::to_string(config).context("serializing config")?;
    fs::write(&path, serialized).with_context(|| format!("writing {:?}", path))?;
    Ok(path)
}

pub fn resolve(
    cwd: &Path,
    url_override: Option<String>,
    username_override: Option<String>,
    secret_override: Option<String>,
) -> Result<EffectiveConfig> {
    let mut merged = load(cwd)?;

    if let Some(url) = url_override {
        merged.url = Some(url);
    }
    if let Some(username) = username_override {
        merged.username = Some(username);
    }
    if let Some(secret) = secret_override {
        merged.secret = Some(secret);
    }

    let url = merged.url.ok_or(ConfigError::MissingCredentials)?;
    let username = merged.username.ok_or(ConfigError::MissingCredentials)?;
    let secret = merged.secret.ok_or(ConfigError::MissingCredentials)?;

    Ok(EffectiveConfig {
        url: url.trim_end_matches('/').to_string(),
        username,
        secret,
        output: merged.output.unwrap_or_default(),
    })
}

fn read_if_exists(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    let config = serde_yaml::from_str(&contents).with_context(|| format!("parsing {:?}", path))?;
    Ok(Some(config))
}

fn merge(user: Config, local: Config) -> Config {
    Config {
        url: local.url.or(user.url),
        username: local.username.or(user.username),
        secret: local.secret.or(user.secret),
        output: local.output.or(user.output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;
    use tempfile::tempdir;

    static ENV_LOCK: OnceLock<std::sync::Mutex<()>> = OnceLock::new();

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK
            .get_or_init(|| std::sync::Mutex::new(()))
            .lock()
            .unwrap()
    }

    #[test]
    fn merges_user_and_local_and_overrides() {
        let _guard = lock_env();
        let cwd = tempdir().unwrap();
        unsafe {
            env::set_var("HARBORCTL_CONFIG_DIR", cwd.path().join("config"));
        }
        fs::create_dir_all(cwd.path().join("config")).unwrap();

        let user_cfg = Config {
            url: Some("https://harbor.user.test".into()),
            username: Some("user".into()),
            secret: Some("user-secret".into()),
            output: Some(OutputSettings {
                format: OutputFormat::Json,
                ..Default::default()
            }),
        };
        save(Scope::User, &user_cfg, cwd.path()).unwrap();

        let local_cfg = Config {
            url: Some("https://harbor.local.test/".into()),
            username: None,
            secret: Some("local-secret".into()),
            output: None,
        };
        save(Scope::Local, &local_cfg, cwd.path()).unwrap();

        let effective = resolve(cwd.path(), None, None, None).unwrap();
        assert_eq!(effective.url, "https://harbor.local.test");
        assert_eq!(effective.username, "user");
        assert_eq!(effective.secret, "local-secret");
        assert_eq!(effective.output.format, OutputFormat::Json);

        let overridden = resolve(
            cwd.path(),
            Some("https://other.test".into()),
            Some("admin".into()),
            None,
        )
        .unwrap();
        assert_eq!(overridden.url, "https://other.test");
        assert_eq!(overridden.username, "admin");
    }

    #[test]
    fn errors_when_missing_credentials() {
        let _guard = lock_env();
        let cwd = tempdir().unwrap();
        unsafe {
            env::set_var("HARBORCTL_CONFIG_DIR", cwd.path().join("config"));
        }
        fs::create_dir_all(cwd.path().join("config")).unwrap();
        let err = resolve(cwd.path(), None, None, None).unwrap_err();
        assert!(err.to_string().contains("credentials are required"));
    }

    #[test]
    fn output_settings_have_documented_defaults() {
        let settings = OutputSettings::default();
        assert_eq!(settings.format, OutputFormat::Table);
        assert!(!settings.table.compact);
        assert!(!settings.table.description);
        assert_eq!(settings.table.max_depth, -1);
        assert_eq!(settings.json.indent, 2);
        assert!(settings.json.sort_keys);
    }

    #[test]
    fn partial_output_settings_parse_from_yaml() {
        let config: Config = serde_yaml::from_str(
            "url: https://harbor.test\noutput:\n  format: jsonschema\n  table:\n    max_depth: 2\n",
        )
        .unwrap();
        let output = config.output.unwrap();
        assert_eq!(output.format, OutputFormat::Jsonschema);
        assert_eq!(output.table.max_depth, 2);
        // Unspecified settings keep their defaults.
        assert_eq!(output.json.indent, 2);
    }
}
