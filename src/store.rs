//! Persisted state: stored network credentials and the monitor toggle.
//!
//! Both files live under the user config directory and follow load-on-start,
//! save-on-mutation semantics. A missing or unparseable file is never fatal;
//! it loads as empty defaults with a logged warning.

use crate::config;
use crate::error::{WifiError, WifiResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(config::CONFIG_DIR_NAME)
}

/// Durable mapping of network name to pre-shared key, plus the designated
/// default entry.
///
/// The default always names an existing profile or is unset; it never
/// dangles, including across profile removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileStore {
    default: Option<String>,
    profiles: BTreeMap<String, String>,
}

impl ProfileStore {
    pub fn file_path() -> PathBuf {
        config_dir().join(config::PROFILE_FILE_NAME)
    }

    pub fn load() -> Self {
        Self::load_from(&Self::file_path())
    }

    pub fn load_from(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    log::warn!("could not read {}: {e}", path.display());
                }
                return Self::default();
            }
        };
        match Self::parse(&text) {
            Ok(store) => store,
            Err(e) => {
                log::warn!("could not parse {}: {e}; treating as empty", path.display());
                Self::default()
            }
        }
    }

    fn parse(text: &str) -> serde_json::Result<Self> {
        let mut map: Map<String, Value> = serde_json::from_str(text)?;

        // Files that predate the default pointer held a single network as
        // {"ssid": ..., "password": ...}.
        if !map.contains_key(config::DEFAULT_KEY)
            && let (Some(Value::String(ssid)), Some(Value::String(password))) =
                (map.get("ssid"), map.get("password"))
        {
            let mut profiles = BTreeMap::new();
            profiles.insert(ssid.clone(), password.clone());
            return Ok(Self {
                default: None,
                profiles,
            });
        }

        let default = match map.remove(config::DEFAULT_KEY) {
            Some(Value::String(name)) => Some(name),
            _ => None,
        };
        let mut profiles = BTreeMap::new();
        for (name, value) in map {
            match value {
                Value::String(secret) => {
                    profiles.insert(name, secret);
                }
                other => log::warn!("ignoring non-string entry {name}: {other}"),
            }
        }
        let default = default.filter(|name| {
            let known = profiles.contains_key(name);
            if !known {
                log::warn!("default network {name} is not stored; clearing it");
            }
            known
        });
        Ok(Self { default, profiles })
    }

    pub fn save(&self) -> WifiResult<()> {
        self.save_to(&Self::file_path())
    }

    /// Serialize the full mapping, the default pointer first.
    pub fn save_to(&self, path: &Path) -> WifiResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| WifiError::StoreSave {
                path: path.to_path_buf(),
                source,
            })?;
        }

        let mut map = Map::new();
        let default = match &self.default {
            Some(name) => Value::String(name.clone()),
            None => Value::Null,
        };
        map.insert(config::DEFAULT_KEY.to_string(), default);
        for (name, secret) in &self.profiles {
            map.insert(name.clone(), Value::String(secret.clone()));
        }

        let text = serde_json::to_string_pretty(&map).map_err(|source| WifiError::StoreEncode {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text).map_err(|source| WifiError::StoreSave {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Insert or overwrite a stored network. The first network added becomes
    /// the default.
    pub fn add(&mut self, name: &str, secret: &str) -> WifiResult<()> {
        let name = name.trim();
        let secret = secret.trim();
        if name.is_empty() {
            return Err(WifiError::EmptyName);
        }
        if secret.is_empty() {
            return Err(WifiError::EmptySecret);
        }
        if name == config::DEFAULT_KEY {
            return Err(WifiError::ReservedName);
        }
        self.profiles.insert(name.to_string(), secret.to_string());
        if self.default.is_none() {
            self.default = Some(name.to_string());
        }
        Ok(())
    }

    /// Remove a stored network; clears the default when it pointed there.
    /// Returns whether anything was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let removed = self.profiles.remove(name).is_some();
        if removed && self.default.as_deref() == Some(name) {
            self.default = None;
        }
        removed
    }

    /// Mark `name` as the default network. No-op when `name` is not stored.
    pub fn set_default(&mut self, name: &str) {
        if self.profiles.contains_key(name) {
            self.default = Some(name.to_string());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    pub fn secret(&self, name: &str) -> Option<&str> {
        self.profiles.get(name).map(String::as_str)
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Resolve the `(ssid, secret)` pair of the default network, if any.
    pub fn default_profile(&self) -> Option<(&str, &str)> {
        let name = self.default.as_deref()?;
        let secret = self.profiles.get(name)?;
        Some((name, secret.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Two-value monitor toggle, persisted with its historical localized values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorChoice {
    #[serde(rename = "是")]
    Enabled,
    #[default]
    #[serde(rename = "否")]
    Disabled,
}

impl MonitorChoice {
    pub fn is_enabled(self) -> bool {
        matches!(self, MonitorChoice::Enabled)
    }
}

/// User settings, read once at startup and rewritten on toggle.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MonitorSettings {
    #[serde(default)]
    pub monitor_enabled: MonitorChoice,
}

impl MonitorSettings {
    pub fn file_path() -> PathBuf {
        config_dir().join(config::SETTINGS_FILE_NAME)
    }

    pub fn load() -> Self {
        Self::load_from(&Self::file_path())
    }

    pub fn load_from(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    log::warn!("could not read {}: {e}", path.display());
                }
                return Self::default();
            }
        };
        serde_json::from_str(&text).unwrap_or_else(|e| {
            log::warn!("could not parse {}: {e}; using defaults", path.display());
            Self::default()
        })
    }

    pub fn save(&self) -> WifiResult<()> {
        self.save_to(&Self::file_path())
    }

    pub fn save_to(&self, path: &Path) -> WifiResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| WifiError::StoreSave {
                path: path.to_path_buf(),
                source,
            })?;
        }
        let text = serde_json::to_string_pretty(self).map_err(|source| WifiError::StoreEncode {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text).map_err(|source| WifiError::StoreSave {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> ProfileStore {
        let mut store = ProfileStore::default();
        store.add("Home", "pw1").unwrap();
        store.add("Office", "pw2").unwrap();
        store.set_default("Office");
        store
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wifi_profiles.json");
        let store = sample_store();

        store.save_to(&path).unwrap();
        let loaded = ProfileStore::load_from(&path);

        assert_eq!(loaded, store);
        assert_eq!(loaded.default_profile(), Some(("Office", "pw2")));
    }

    #[test]
    fn default_key_is_written_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wifi_profiles.json");
        sample_store().save_to(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let first_key = text.lines().nth(1).unwrap();
        assert!(first_key.trim_start().starts_with("\"default\""));
    }

    #[test]
    fn removing_the_default_clears_the_pointer() {
        let mut store = sample_store();
        assert!(store.remove("Office"));
        assert_eq!(store.default_name(), None);
        assert!(store.contains("Home"));

        // removing a non-default profile leaves the pointer alone
        let mut store = sample_store();
        assert!(store.remove("Home"));
        assert_eq!(store.default_name(), Some("Office"));
    }

    #[test]
    fn first_added_network_becomes_default() {
        let mut store = ProfileStore::default();
        store.add("Home", "pw1").unwrap();
        assert_eq!(store.default_name(), Some("Home"));
        store.add("Office", "pw2").unwrap();
        assert_eq!(store.default_name(), Some("Home"));
    }

    #[test]
    fn add_rejects_invalid_input() {
        let mut store = ProfileStore::default();
        assert!(matches!(store.add("", "pw"), Err(WifiError::EmptyName)));
        assert!(matches!(store.add("  ", "pw"), Err(WifiError::EmptyName)));
        assert!(matches!(store.add("Home", ""), Err(WifiError::EmptySecret)));
        assert!(matches!(
            store.add("default", "pw"),
            Err(WifiError::ReservedName)
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn set_default_ignores_unknown_names() {
        let mut store = sample_store();
        store.set_default("Ghost");
        assert_eq!(store.default_name(), Some("Office"));
    }

    #[test]
    fn dangling_default_is_cleared_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wifi_profiles.json");
        fs::write(&path, r#"{"default": "Ghost", "Home": "pw1"}"#).unwrap();

        let store = ProfileStore::load_from(&path);
        assert_eq!(store.default_name(), None);
        assert_eq!(store.secret("Home"), Some("pw1"));
    }

    #[test]
    fn unparseable_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wifi_profiles.json");
        fs::write(&path, "not json at all").unwrap();

        let store = ProfileStore::load_from(&path);
        assert!(store.is_empty());
        assert_eq!(store.default_name(), None);
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::load_from(&dir.path().join("nope.json"));
        assert!(store.is_empty());
    }

    #[test]
    fn legacy_single_network_file_migrates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wifi_profiles.json");
        fs::write(&path, r#"{"ssid": "OldNet", "password": "oldpw"}"#).unwrap();

        let store = ProfileStore::load_from(&path);
        assert_eq!(store.secret("OldNet"), Some("oldpw"));
        assert_eq!(store.default_name(), None);
    }

    #[test]
    fn monitor_choice_keeps_localized_values() {
        let settings = MonitorSettings {
            monitor_enabled: MonitorChoice::Enabled,
        };
        let text = serde_json::to_string(&settings).unwrap();
        assert_eq!(text, r#"{"monitor_enabled":"是"}"#);

        let parsed: MonitorSettings = serde_json::from_str(r#"{"monitor_enabled":"否"}"#).unwrap();
        assert_eq!(parsed.monitor_enabled, MonitorChoice::Disabled);
        assert!(!parsed.monitor_enabled.is_enabled());
    }

    #[test]
    fn settings_round_trip_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_settings.json");

        assert!(!MonitorSettings::load_from(&path).monitor_enabled.is_enabled());

        let settings = MonitorSettings {
            monitor_enabled: MonitorChoice::Enabled,
        };
        settings.save_to(&path).unwrap();
        assert!(MonitorSettings::load_from(&path).monitor_enabled.is_enabled());
    }
}
