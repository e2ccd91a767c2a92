//! Front-end settings: where the monitoring configuration files live
//!
//! Stored as TOML in `~/.monconf/settings.toml`:
//!
//! ```toml
//! config_dir = "/etc/icingaweb2/modules/monitoring"
//!
//! [files]
//! backends = "backends.ini"
//! instances = "instances.ini"
//! module = "config.ini"
//! ```
//!
//! Every field is optional. `settings set` edits the file in place and keeps
//! its comments.

use crate::entity::EntityKind;
use crate::error::SettingsError;
use monconf_ini::atomic::write_atomically;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Keys accepted by `settings set`
pub const KNOWN_KEYS: &[&str] = &[
    "config_dir",
    "files.backends",
    "files.instances",
    "files.module",
];

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding the monitoring module's INI files
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// File names inside `config_dir`
    #[serde(default)]
    pub files: FileNames,
}

/// Names of the INI files inside the config directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNames {
    #[serde(default = "default_backends_file")]
    pub backends: String,

    #[serde(default = "default_instances_file")]
    pub instances: String,

    /// Module-wide settings such as `[security]`
    #[serde(default = "default_module_file")]
    pub module: String,
}

fn default_config_dir() -> PathBuf {
    PathBuf::from("/etc/icingaweb2/modules/monitoring")
}

fn default_backends_file() -> String {
    "backends.ini".to_string()
}

fn default_instances_file() -> String {
    "instances.ini".to_string()
}

fn default_module_file() -> String {
    "config.ini".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            files: FileNames::default(),
        }
    }
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            backends: default_backends_file(),
            instances: default_instances_file(),
            module: default_module_file(),
        }
    }
}

/// Get the default settings directory (~/.monconf)
pub fn settings_dir() -> Result<PathBuf, SettingsError> {
    dirs::home_dir()
        .map(|home| home.join(".monconf"))
        .ok_or(SettingsError::NoHomeDir)
}

/// Get the default settings file path
pub fn settings_file() -> Result<PathBuf, SettingsError> {
    Ok(settings_dir()?.join("settings.toml"))
}

impl Settings {
    /// Load settings from `path`, falling back to defaults
    ///
    /// A missing file is normal; an unreadable or invalid one is reported and
    /// ignored.
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("Failed to parse settings file {}: {}", path.display(), e);
                    warn!("Using default settings");
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("Failed to read settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Path of the INI file for an entity kind
    pub fn file_for(&self, kind: EntityKind) -> PathBuf {
        let name = match kind {
            EntityKind::Backend => &self.files.backends,
            EntityKind::Instance => &self.files.instances,
        };
        self.config_dir.join(name)
    }

    /// Path of the module-wide INI file
    pub fn module_file(&self) -> PathBuf {
        self.config_dir.join(&self.files.module)
    }
}

/// Set one key in the settings file, keeping the rest of it as written
pub fn set_value(path: &Path, key: &str, value: &str) -> Result<(), SettingsError> {
    if !KNOWN_KEYS.contains(&key) {
        return Err(SettingsError::UnknownKey(key.to_string()));
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut doc = content
        .parse::<toml_edit::Document>()
        .map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    match key.split_once('.') {
        Some((table, field)) => {
            match doc.get(table).map(|item| item.is_table_like()) {
                None => doc[table] = toml_edit::table(),
                Some(false) => return Err(SettingsError::NotATable(table.to_string())),
                Some(true) => {}
            }
            doc[table][field] = toml_edit::value(value);
        }
        None => doc[key] = toml_edit::value(value),
    }

    let rendered = doc.to_string();
    toml::from_str::<Settings>(&rendered).map_err(SettingsError::Invalid)?;

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir).map_err(SettingsError::CreateDir)?;
        }
    }
    write_atomically(path, &rendered)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(
            settings.file_for(EntityKind::Backend),
            PathBuf::from("/etc/icingaweb2/modules/monitoring/backends.ini")
        );
        assert_eq!(
            settings.module_file(),
            PathBuf::from("/etc/icingaweb2/modules/monitoring/config.ini")
        );
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings = toml::from_str("[files]\ninstances = \"cmd.ini\"\n").unwrap();
        assert_eq!(settings.files.instances, "cmd.ini");
        assert_eq!(settings.files.backends, "backends.ini");
        assert_eq!(settings.config_dir, default_config_dir());
    }

    #[test]
    fn test_load_missing_or_broken_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        assert_eq!(Settings::load_or_default(&path), Settings::default());

        std::fs::write(&path, "config_dir = [").unwrap();
        assert_eq!(Settings::load_or_default(&path), Settings::default());
    }

    #[test]
    fn test_set_value_keeps_comments() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            "# where icingaweb keeps module config\nconfig_dir = \"/etc/a\"\n",
        )
        .unwrap();

        set_value(&path, "config_dir", "/etc/b").unwrap();
        set_value(&path, "files.backends", "b.ini").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# where icingaweb keeps module config\n"));
        let settings = Settings::load_or_default(&path);
        assert_eq!(settings.config_dir, PathBuf::from("/etc/b"));
        assert_eq!(settings.files.backends, "b.ini");
    }

    #[test]
    fn test_set_unknown_key() {
        let dir = TempDir::new().unwrap();
        let err = set_value(&dir.path().join("s.toml"), "colour", "red").unwrap_err();
        assert!(matches!(err, SettingsError::UnknownKey(_)));
    }
}
