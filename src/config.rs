// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsLimits;
use crate::db::SqliteStore;
use crate::error::{Error, Result};
use crate::remote::RestClient;
use crate::screens::form::KindSwitchPolicy;
use crate::store::{FinanceStore, Session};

static DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("com.spendwise", "Spendwise", "spendwise"));

pub const ENV_BACKEND: &str = "SPENDWISE_BACKEND";
pub const ENV_URL: &str = "SPENDWISE_URL";
pub const ENV_ANON_KEY: &str = "SPENDWISE_ANON_KEY";
pub const ENV_DB: &str = "SPENDWISE_DB";

fn dirs() -> Result<&'static ProjectDirs> {
    DIRS.as_ref()
        .ok_or_else(|| Error::Config("could not determine platform-specific dirs".into()))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(dirs()?.config_dir().join("config.json"))
}

pub fn session_path() -> Result<PathBuf> {
    Ok(dirs()?.data_dir().join("session.json"))
}

pub fn default_db_path() -> Result<PathBuf> {
    Ok(dirs()?.data_dir().join("spendwise.sqlite"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Rest,
    Local,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" | "remote" => Ok(BackendKind::Rest),
            "local" | "sqlite" => Ok(BackendKind::Local),
            other => Err(format!("unknown backend '{other}', expected rest|local")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendKind,
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub db_path: Option<PathBuf>,
    pub kind_switch: KindSwitchPolicy,
    pub months_limit: usize,
    pub categories_limit: usize,
    pub days_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        let limits = AnalyticsLimits::default();
        Self {
            backend: BackendKind::default(),
            url: None,
            anon_key: None,
            db_path: None,
            kind_switch: KindSwitchPolicy::default(),
            months_limit: limits.months,
            categories_limit: limits.categories,
            days_limit: limits.days,
        }
    }
}

pub const KEYS: &[&str] = &[
    "backend",
    "url",
    "anon_key",
    "db_path",
    "kind_switch",
    "months_limit",
    "categories_limit",
    "days_limit",
];

impl Config {
    /// Config file from the platform config dir, then environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?, |k| std::env::var(k).ok())
    }

    pub fn load_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = if path.exists() {
            let text = fs::read_to_string(path)?;
            serde_json::from_str(&text).map_err(|e| {
                Error::Config(format!("malformed config file {}: {e}", path.display()))
            })?
        } else {
            Config::default()
        };
        cfg.apply_env(env)?;
        Ok(cfg)
    }

    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = env(ENV_BACKEND) {
            self.set("backend", &v)?;
        }
        if let Some(v) = env(ENV_URL) {
            self.url = Some(v);
        }
        if let Some(v) = env(ENV_ANON_KEY) {
            self.anon_key = Some(v);
        }
        if let Some(v) = env(ENV_DB) {
            self.db_path = Some(PathBuf::from(v));
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());
        let limit = |v: &str| -> Result<usize> {
            v.parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| Error::Config(format!("{key} must be a positive integer")))
        };
        match key {
            "backend" => self.backend = value.parse().map_err(Error::Config)?,
            "url" => self.url = optional(value),
            "anon_key" => self.anon_key = optional(value),
            "db_path" => self.db_path = optional(value).map(PathBuf::from),
            "kind_switch" => self.kind_switch = value.parse().map_err(Error::Config)?,
            "months_limit" => self.months_limit = limit(value)?,
            "categories_limit" => self.categories_limit = limit(value)?,
            "days_limit" => self.days_limit = limit(value)?,
            other => {
                return Err(Error::Config(format!(
                    "unknown key '{other}', expected one of: {}",
                    KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }

    pub fn limits(&self) -> AnalyticsLimits {
        AnalyticsLimits {
            months: self.months_limit,
            categories: self.categories_limit,
            days: self.days_limit,
        }
    }

    pub fn rest_client(&self) -> Result<RestClient> {
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| Error::Config(format!("backend url not set (config key `url` or {ENV_URL})")))?;
        let key = self.anon_key.as_deref().ok_or_else(|| {
            Error::Config(format!("anon key not set (config key `anon_key` or {ENV_ANON_KEY})"))
        })?;
        RestClient::new(url, key)
    }

    /// Store selected by `backend`. The REST store carries the saved session.
    pub fn open_store(&self) -> Result<Box<dyn FinanceStore>> {
        match self.backend {
            BackendKind::Rest => {
                let session = load_session(&session_path()?)?;
                Ok(Box::new(self.rest_client()?.with_session(session)))
            }
            BackendKind::Local => {
                let path = match &self.db_path {
                    Some(p) => p.clone(),
                    None => default_db_path()?,
                };
                Ok(Box::new(SqliteStore::open(&path)?))
            }
        }
    }
}

pub fn load_session(path: &Path) -> Result<Option<Session>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&text)?))
}

pub fn save_session(path: &Path, session: &Session) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, serde_json::to_string_pretty(session)?)?;
    Ok(())
}

pub fn clear_session(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file_cfg = Config::default();
        file_cfg.url = Some("https://file.example".into());
        file_cfg.months_limit = 12;
        file_cfg.save(&path).unwrap();

        let env: HashMap<&str, &str> = [
            (ENV_URL, "https://env.example"),
            (ENV_BACKEND, "local"),
        ]
        .into_iter()
        .collect();
        let cfg = Config::load_from(&path, |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.url.as_deref(), Some("https://env.example"));
        assert_eq!(cfg.backend, BackendKind::Local);
        assert_eq!(cfg.limits().months, 12);
        assert_eq!(cfg.limits().categories, 7);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.json"), |_| None).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn malformed_file_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = Config::load_from(&path, |_| None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.user_message().contains("config.json"), "{}", err.user_message());
    }

    #[test]
    fn set_validates_values() {
        let mut cfg = Config::default();
        cfg.set("kind_switch", "clear").unwrap();
        assert_eq!(cfg.kind_switch, KindSwitchPolicy::Clear);
        cfg.set("url", "  ").unwrap();
        assert_eq!(cfg.url, None);
        assert!(cfg.set("days_limit", "0").is_err());
        assert!(cfg.set("backend", "ftp").is_err());
        assert!(cfg.set("colour", "blue").is_err());
    }

    #[test]
    fn session_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        assert_eq!(load_session(&path).unwrap(), None);
        let s = Session {
            access_token: "tok".into(),
            refresh_token: None,
            user_id: "u1".into(),
            email: Some("a@b.c".into()),
            expires_at: Some(1_700_000_000),
        };
        save_session(&path, &s).unwrap();
        assert_eq!(load_session(&path).unwrap(), Some(s));
        clear_session(&path).unwrap();
        assert_eq!(load_session(&path).unwrap(), None);
    }

    #[test]
    fn rest_client_needs_url_and_key() {
        let cfg = Config::default();
        assert!(matches!(cfg.rest_client(), Err(Error::Config(_))));
    }
}
