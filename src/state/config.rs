//! Configuration management

use crate::speech::{BackendChoice, EngineOptions};
use crate::{ReaderError, Result};
use ini::Ini;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Application configuration
///
/// Speech engine settings, where messages are stored, and whether to
/// register a desktop launcher.
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path (~/.msgreader.cfg)
    path: PathBuf,
}

impl Config {
    /// Load configuration from the home directory or create the default
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from a specific file, creating it if missing
    ///
    /// Keys missing from an existing file are filled in with their defaults
    /// and written back.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        debug!("Loading config from {:?}", path);

        if !path.exists() {
            info!("Config file not found, creating default");
            let config = Self {
                ini: Self::default_config(),
                path,
            };
            config.save()?;
            return Ok(config);
        }

        let ini = Ini::load_from_file(&path)
            .map_err(|e| ReaderError::IniParse(format!("Failed to load config: {}", e)))?;
        let mut config = Self { ini, path };

        let added = config.add_missing_defaults();
        if added > 0 {
            info!("Added {} new settings to {:?}", added, config.path);
            if let Err(e) = config.save() {
                warn!("{}", e);
            }
        }

        Ok(config)
    }

    /// Set every default key the file lacks; returns how many were added
    fn add_missing_defaults(&mut self) -> usize {
        let defaults = Self::default_config();
        let mut added = 0;

        for (section, props) in defaults.iter() {
            let Some(section) = section else { continue };
            for (key, value) in props.iter() {
                if self.ini.get_from(Some(section), key).is_none() {
                    debug!("Adding missing setting [{}] {}", section, key);
                    self.set(section, key, value);
                    added += 1;
                }
            }
        }

        added
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| ReaderError::Config(format!("Failed to save config: {}", e)))
    }

    /// Get config file path (~/.msgreader.cfg)
    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".msgreader.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create default configuration
    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("speech"))
            .set("locale", crate::LOCALE)
            .set("backend", "auto")
            .set("rate", "")
            .set("volume", "");

        ini.with_section(Some("storage")).set("dir", "");

        ini.with_section(Some("install")).set("register", "true");

        ini
    }

    /// Get a boolean value from config
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
            .to_string()
    }

    /// Get an integer value from config
    pub fn get_int(&self, section: &str, key: &str, default: i32) -> i32 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    /// Speech locale. Always a Hindi tag; anything else falls back to `hi-IN`.
    pub fn locale(&self) -> String {
        let locale = self.get_string("speech", "locale", crate::LOCALE);
        let lang = locale.split(['-', '_']).next().unwrap_or("");
        if lang.eq_ignore_ascii_case("hi") {
            locale
        } else {
            warn!("Ignoring non-Hindi locale {:?}", locale);
            crate::LOCALE.to_string()
        }
    }

    /// Which speech backend to use
    pub fn backend(&self) -> BackendChoice {
        let value = self.get_string("speech", "backend", "auto");
        value.parse().unwrap_or_else(|e| {
            warn!("{}; using auto", e);
            BackendChoice::Auto
        })
    }

    /// Speech rate (0-100)
    pub fn rate(&self) -> Option<u8> {
        self.get_int("speech", "rate", -1)
            .try_into()
            .ok()
            .filter(|&r| r <= 100)
    }

    /// Speech volume (0-100)
    pub fn volume(&self) -> Option<u8> {
        self.get_int("speech", "volume", -1)
            .try_into()
            .ok()
            .filter(|&v| v <= 100)
    }

    /// Options for creating the speech engine
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            backend: self.backend(),
            locale: self.locale(),
            rate: self.rate(),
            volume: self.volume(),
        }
    }

    /// Message storage directory, if overridden
    pub fn storage_dir(&self) -> Option<PathBuf> {
        self.ini
            .get_from(Some("storage"), "dir")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(expand_home)
    }

    /// Should a desktop launcher be registered at startup?
    pub fn register_install(&self) -> bool {
        self.get_bool("install", "register", true)
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/var/lib/x"), PathBuf::from("/var/lib/x"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/msgs"), home.join("msgs"));
        }
    }

    #[test]
    fn test_missing_keys_are_added() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.cfg");
        std::fs::write(&path, "[speech]\nbackend = espeak\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.backend(), BackendChoice::Espeak);
        assert!(config.register_install());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[install]"));
        assert!(contents.contains("register"));
        assert!(contents.contains("backend=espeak") || contents.contains("backend = espeak"));
    }

    #[test]
    fn test_locale_stays_hindi() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::load_from(dir.path().join("c.cfg")).unwrap();

        assert_eq!(config.locale(), "hi-IN");
        config.set("speech", "locale", "hi");
        assert_eq!(config.locale(), "hi");
        config.set("speech", "locale", "en-US");
        assert_eq!(config.locale(), "hi-IN");
    }
}
