use std::{collections::HashMap, fmt};

use crate::telemetry::{log_event, LogLevel};

pub const THEME_KEY: &str = "theme";

/// Storage failures are reported at a level the browser build prints by default.
const STORE_FAILURE_LEVEL: LogLevel = LogLevel::Warn;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn toggle_label(self) -> String {
        let next = self.toggled().as_str();
        format!("Switch to {next} theme")
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Light => "☾",
            Self::Dark => "☀",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Unavailable,
    Rejected(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => f.write_str("preference storage is unavailable"),
            Self::Rejected(reason) => write!(f, "preference storage rejected the write: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// String key-value storage that survives page loads.
pub trait PreferenceStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Default, Debug, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl PreferenceStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Stand-in for a disabled storage backend (private browsing, blocked cookies).
#[derive(Default, Debug, Clone, Copy)]
pub struct UnavailableStore;

impl PreferenceStore for UnavailableStore {
    fn read(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable)
    }

    fn write(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }
}

/// Stored choice first, then the OS colour-scheme signal, then dark.
///
/// Unreadable storage and unrecognised stored values both fall through to the
/// OS signal.
pub fn resolve_theme(store: &dyn PreferenceStore, os_prefers_dark: Option<bool>) -> Theme {
    let stored = match store.read(THEME_KEY) {
        Ok(value) => value.as_deref().and_then(Theme::parse),
        Err(error) => {
            log_event(
                STORE_FAILURE_LEVEL,
                "theme_store_read_failed",
                serde_json::json!({ "error": error.to_string() }),
            );
            None
        }
    };

    stored.unwrap_or(match os_prefers_dark {
        Some(true) => Theme::Dark,
        Some(false) => Theme::Light,
        None => Theme::default(),
    })
}

pub fn persist_theme(store: &mut dyn PreferenceStore, theme: Theme) -> Result<(), StoreError> {
    store.write(THEME_KEY, theme.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_dark_signal_wins_without_stored_preference() {
        let store = MemoryStore::default();
        assert_eq!(resolve_theme(&store, Some(true)), Theme::Dark);
        assert_eq!(resolve_theme(&store, Some(false)), Theme::Light);
    }

    #[test]
    fn stored_light_overrides_os_signal() {
        let mut store = MemoryStore::default();
        persist_theme(&mut store, Theme::Light).expect("memory store accepts writes");

        assert_eq!(resolve_theme(&store, Some(true)), Theme::Light);
        assert_eq!(resolve_theme(&store, None), Theme::Light);
    }

    #[test]
    fn defaults_to_dark_without_any_signal() {
        assert_eq!(resolve_theme(&MemoryStore::default(), None), Theme::Dark);
    }

    #[test]
    fn garbage_stored_value_falls_back_to_os_signal() {
        let mut store = MemoryStore::default();
        store.write(THEME_KEY, "sepia").expect("memory store accepts writes");

        assert_eq!(resolve_theme(&store, Some(false)), Theme::Light);
    }

    #[test]
    fn unavailable_store_falls_back_to_os_signal() {
        assert_eq!(resolve_theme(&UnavailableStore, Some(false)), Theme::Light);
        assert_eq!(resolve_theme(&UnavailableStore, None), Theme::Dark);
        assert_eq!(
            persist_theme(&mut UnavailableStore, Theme::Light),
            Err(StoreError::Unavailable)
        );
    }

    #[test]
    fn toggle_label_names_the_next_theme() {
        assert_eq!(Theme::Dark.toggle_label(), "Switch to light theme");
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }

    #[test]
    fn storage_failures_are_logged_at_the_default_level() {
        assert!(crate::telemetry::enabled(STORE_FAILURE_LEVEL));
        assert_eq!(resolve_theme(&UnavailableStore, Some(false)), Theme::Light);
    }

    #[test]
    fn page_shell_applies_the_stored_theme_before_the_app_loads() {
        let shell = include_str!("../index.html");
        let head = &shell[..shell.find("</head>").expect("shell has a head")];

        assert!(head.contains(&format!("localStorage.getItem(\"{THEME_KEY}\")")));
        assert!(head.contains("prefers-color-scheme: dark"));
        for theme in [Theme::Light, Theme::Dark] {
            assert!(head.contains(&format!("\"{}\"", theme.as_str())));
        }
    }
}
