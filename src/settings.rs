use serde::Deserialize;
use tracing::warn;

/// Client configuration, as sent in `initializationOptions` or
/// `workspace/didChangeConfiguration`.
///
/// ```json
/// { "markdown": { "suggest": { "paths": { "enabled": true } } } }
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub markdown: MarkdownSettings,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarkdownSettings {
    pub suggest: SuggestSettings,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SuggestSettings {
    pub paths: PathSuggestSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathSuggestSettings {
    pub enabled: bool,
}

impl Default for PathSuggestSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Settings {
    /// Parse settings from a client-supplied JSON value.
    ///
    /// Missing or malformed configuration falls back to the defaults.
    pub fn from_value(value: Option<&serde_json::Value>) -> Self {
        match value {
            None | Some(serde_json::Value::Null) => Self::default(),
            Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                warn!(error = %e, "settings: invalid configuration, using defaults");
                Self::default()
            }),
        }
    }

    pub fn path_suggestions_enabled(&self) -> bool {
        self.markdown.suggest.paths.enabled
    }
}
