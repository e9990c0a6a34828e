//! Settings service
//!
//! Per-user preferences persisted as a JSON document in the settings
//! table. Missing or partial documents fall back to defaults via
//! serde, so new preference fields never break existing users.

use crate::config;
use crate::database::Repository;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Storage key for the preferences document
const PREFERENCES_KEY: &str = "preferences";

/// User-facing preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    /// UI theme: "light", "dark" or "system"
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Color assigned to newly created notes
    #[serde(default = "default_note_color")]
    pub default_note_color: String,
}

fn default_theme() -> String {
    "system".to_string()
}

fn default_note_color() -> String {
    config::DEFAULT_NOTE_COLOR.to_string()
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            default_note_color: default_note_color(),
        }
    }
}

/// Service for managing user preferences
#[derive(Clone)]
pub struct SettingsService {
    repo: Repository,
}

impl SettingsService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Get a user's preferences, falling back to defaults
    pub async fn get_preferences(&self, user_id: &str) -> Result<UserPreferences> {
        match self.repo.get_setting(user_id, PREFERENCES_KEY).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(UserPreferences::default()),
        }
    }

    /// Persist a user's preferences
    pub async fn set_preferences(&self, user_id: &str, prefs: UserPreferences) -> Result<()> {
        if !config::VALID_THEMES.contains(&prefs.theme.as_str()) {
            return Err(AppError::Validation(format!(
                "Invalid theme: {}",
                prefs.theme
            )));
        }
        if !config::VALID_NOTE_COLORS.contains(&prefs.default_note_color.as_str()) {
            return Err(AppError::Validation(format!(
                "Invalid color: {}",
                prefs.default_note_color
            )));
        }

        let json = serde_json::to_string(&prefs)?;
        self.repo.set_setting(user_id, PREFERENCES_KEY, &json).await?;

        tracing::debug!("Preferences updated for user {}", user_id);
        Ok(())
    }
}
