// [[FLEET]]/apps/fleet-console/src/locale.rs
// Purpose: Active locale, its persistence, and key-based translation with English fallback.
// Architecture: Shell Layer (injectable context, no ambient storage)
// Dependencies: parking_lot, serde_json, thiserror

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::translations;

/// Fixed key the locale preference is stored under.
pub const LOCALE_STORAGE_KEY: &str = "locale";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
        }
    }

    fn table(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Locale::En => translations::EN,
            Locale::Fr => translations::FR,
        }
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Locale::En),
            "fr" => Ok(Locale::Fr),
            other => Err(LocaleError::Unsupported(other.to_string())),
        }
    }
}

#[derive(Error, Debug)]
pub enum LocaleError {
    #[error("Unsupported locale: {0}")]
    Unsupported(String),
    #[error("Preference storage failed: {0}")]
    Storage(#[from] std::io::Error),
    #[error("Preference file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

/// Key/value preference storage (the browser-storage seam).
pub trait PreferenceStore: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str) -> Result<(), LocaleError>;
}

#[derive(Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.values.lock().insert(key.to_string(), value.to_string());
        store
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) -> Result<(), LocaleError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences kept as a flat JSON object in a single file.
pub struct FilePreferenceStore {
    path: PathBuf,
    // serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl FilePreferenceStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> Result<HashMap<String, String>, LocaleError> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock();
        match self.read_all() {
            Ok(mut values) => values.remove(key),
            Err(e) => {
                tracing::warn!("Ignoring unreadable preference file {:?}: {}", self.path, e);
                None
            }
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), LocaleError> {
        let _guard = self.lock.lock();
        // a corrupt file is replaced rather than blocking the preference
        let mut values = self.read_all().unwrap_or_default();
        values.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&values)?)?;
        Ok(())
    }
}

/// Locale context: holds the active locale and translates keys.
pub struct I18n {
    locale: RwLock<Locale>,
    store: Arc<dyn PreferenceStore>,
}

impl I18n {
    /// Restore the stored locale; anything absent or unrecognized means English.
    pub fn restore(store: Arc<dyn PreferenceStore>) -> Self {
        let locale = match store.load(LOCALE_STORAGE_KEY) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!("Stored locale '{}' is not supported, using en", raw);
                Locale::En
            }),
            None => Locale::En,
        };
        tracing::debug!("Locale restored: {}", locale.as_str());
        Self {
            locale: RwLock::new(locale),
            store,
        }
    }

    pub fn locale(&self) -> Locale {
        *self.locale.read()
    }

    /// The active locale only changes once the preference is stored.
    pub fn set_locale(&self, locale: Locale) -> Result<(), LocaleError> {
        let mut active = self.locale.write();
        self.store.save(LOCALE_STORAGE_KEY, locale.as_str())?;
        *active = locale;
        tracing::info!("Locale changed to {}", locale.as_str());
        Ok(())
    }

    pub fn t(&self, key: &str) -> String {
        self.t_with(key, &[])
    }

    /// Translate `key`, substituting `{name}` placeholders.
    ///
    /// Lookup order is the active locale, then English, then the key itself.
    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        let locale = self.locale();
        let template = match lookup(locale, key) {
            Some(text) => text,
            None if locale != Locale::En => match lookup(Locale::En, key) {
                Some(text) => {
                    tracing::debug!("Key '{}' missing in '{}', using en", key, locale.as_str());
                    text
                }
                None => return missing(key),
            },
            None => return missing(key),
        };

        params
            .iter()
            .fold(template.to_string(), |acc, (name, value)| {
                acc.replace(&format!("{{{}}}", name), value)
            })
    }
}

fn lookup(locale: Locale, key: &str) -> Option<&'static str> {
    locale
        .table()
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

fn missing(key: &str) -> String {
    tracing::warn!("Translation key '{}' not found in any locale", key);
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_defaults_to_english() {
        let empty = I18n::restore(Arc::new(MemoryPreferenceStore::new()));
        assert_eq!(empty.locale(), Locale::En);

        let bogus = I18n::restore(Arc::new(MemoryPreferenceStore::with_value("locale", "de")));
        assert_eq!(bogus.locale(), Locale::En);

        let fr = I18n::restore(Arc::new(MemoryPreferenceStore::with_value("locale", "fr")));
        assert_eq!(fr.locale(), Locale::Fr);
    }

    #[test]
    fn test_set_locale_persists() {
        let store = Arc::new(MemoryPreferenceStore::new());
        let i18n = I18n::restore(store.clone());
        i18n.set_locale(Locale::Fr).unwrap();
        assert_eq!(store.load(LOCALE_STORAGE_KEY).as_deref(), Some("fr"));
        assert_eq!(I18n::restore(store).locale(), Locale::Fr);
    }

    struct ReadOnlyStore;

    impl PreferenceStore for ReadOnlyStore {
        fn load(&self, _key: &str) -> Option<String> {
            None
        }

        fn save(&self, _key: &str, _value: &str) -> Result<(), LocaleError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }
    }

    #[test]
    fn test_failed_persist_keeps_locale() {
        let i18n = I18n::restore(Arc::new(ReadOnlyStore));
        assert!(matches!(i18n.set_locale(Locale::Fr), Err(LocaleError::Storage(_))));
        assert_eq!(i18n.locale(), Locale::En);
        assert_eq!(i18n.t("common.invalidJson"), "Invalid JSON format");
    }

    #[test]
    fn test_translation_fallback_chain() {
        let i18n = I18n::restore(Arc::new(MemoryPreferenceStore::with_value("locale", "fr")));
        assert_eq!(i18n.t("common.invalidJson"), "Format JSON invalide");
        // only present in English
        assert_eq!(i18n.t("menuDescriptions.logs"), "Browse agent logs");
        assert_eq!(i18n.t("no.such.key"), "no.such.key");
    }

    #[test]
    fn test_placeholders() {
        let i18n = I18n::restore(Arc::new(MemoryPreferenceStore::new()));
        assert_eq!(
            i18n.t_with("queryMemory.sampleQuery", &[("schema", "metrics"), ("table", "system_metrics")]),
            "SELECT * FROM metrics.system_metrics LIMIT 10;"
        );
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");
        let store = FilePreferenceStore::new(&path);
        assert!(store.load(LOCALE_STORAGE_KEY).is_none());
        store.save(LOCALE_STORAGE_KEY, "fr").unwrap();
        store.save("theme", "dark").unwrap();

        let reopened = FilePreferenceStore::new(&path);
        assert_eq!(reopened.load(LOCALE_STORAGE_KEY).as_deref(), Some("fr"));
        assert_eq!(reopened.load("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "not json").unwrap();
        let i18n = I18n::restore(Arc::new(FilePreferenceStore::new(&path)));
        assert_eq!(i18n.locale(), Locale::En);
    }
}
