/// The start page's settings form: search engine and theme colours
use crate::error::{ApiError, Result};
use crate::store::{SettingKey, SettingsStore};
use crate::theme::{BackgroundTheme, Color, DEFAULT_ACCENT};

pub const DEFAULT_SEARCH_ENGINE_URL: &str = "https://www.google.com";

#[derive(Debug, Clone, PartialEq)]
pub struct SettingsForm {
    pub search_engine_url: String,
    pub accent_color: String,
    pub background: BackgroundTheme,
}

impl Default for SettingsForm {
    fn default() -> Self {
        SettingsForm {
            search_engine_url: DEFAULT_SEARCH_ENGINE_URL.to_string(),
            accent_color: DEFAULT_ACCENT.to_string(),
            background: BackgroundTheme::default(),
        }
    }
}

impl SettingsForm {
    /// Pre-fill the form. Missing or unreadable settings keep their defaults.
    pub async fn load<S: SettingsStore>(settings: &S) -> SettingsForm {
        let mut form = SettingsForm::default();

        match settings.get_setting(SettingKey::SearchEngineUrl).await {
            Ok(Some(url)) if !url.trim().is_empty() => form.search_engine_url = url,
            Ok(_) => {}
            Err(e) => log::debug!("Failed to load search engine url: {}", e),
        }

        match settings.get_setting(SettingKey::AccentColor).await {
            Ok(Some(accent)) if Color::from_hex(&accent).is_some() => form.accent_color = accent,
            Ok(_) => {}
            Err(e) => log::debug!("Failed to load accent color: {}", e),
        }

        match settings.get_setting(SettingKey::BackgroundTheme).await {
            Ok(Some(raw)) => form.background = BackgroundTheme::parse_or_default(&raw),
            Ok(None) => {}
            Err(e) => log::debug!("Failed to load background theme: {}", e),
        }

        form
    }

    fn validated(&self) -> Result<SettingsForm> {
        let search_engine_url = self.search_engine_url.trim();
        if search_engine_url.is_empty() {
            return Err(ApiError::Validation("Search engine URL is required.".to_string()));
        }

        let colors = [
            &self.accent_color,
            &self.background.primary,
            &self.background.secondary,
            &self.background.card,
        ];
        if let Some(bad) = colors.iter().find(|c| Color::from_hex(c).is_none()) {
            return Err(ApiError::Validation(format!("Invalid color: {}", bad)));
        }

        Ok(SettingsForm {
            search_engine_url: search_engine_url.to_string(),
            ..self.clone()
        })
    }

    /// Write all three settings, stopping at the first failure
    pub async fn save<S: SettingsStore>(&self, settings: &S) -> Result<()> {
        let form = self.validated()?;

        settings
            .put_setting(SettingKey::SearchEngineUrl, &form.search_engine_url)
            .await?;
        settings
            .put_setting(SettingKey::AccentColor, &form.accent_color)
            .await?;
        settings
            .put_setting(SettingKey::BackgroundTheme, &form.background.to_json())
            .await?;

        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::MemorySettings;
    use futures::executor::block_on;

    #[test]
    fn test_load_defaults() {
        let settings = MemorySettings::default();
        assert_eq!(block_on(SettingsForm::load(&settings)), SettingsForm::default());
    }

    #[test]
    fn test_load_stored_values() {
        let settings = MemorySettings::default()
            .with(SettingKey::SearchEngineUrl, "https://duckduckgo.com")
            .with(SettingKey::AccentColor, "#22c55e")
            .with(
                SettingKey::BackgroundTheme,
                r##"{"primary":"#000000","secondary":"#101010","card":"#202020"}"##,
            );

        let form = block_on(SettingsForm::load(&settings));

        assert_eq!(form.search_engine_url, "https://duckduckgo.com");
        assert_eq!(form.accent_color, "#22c55e");
        assert_eq!(form.background.card, "#202020");
    }

    #[test]
    fn test_load_ignores_failures() {
        let settings = MemorySettings::default()
            .with(SettingKey::AccentColor, "pink")
            .failing(SettingKey::SearchEngineUrl, ApiError::Transport("offline".to_string()));

        let form = block_on(SettingsForm::load(&settings));

        assert_eq!(form, SettingsForm::default());
    }

    #[test]
    fn test_save_writes_all_keys() {
        let settings = MemorySettings::default();
        let form = SettingsForm {
            search_engine_url: "  https://www.bing.com ".to_string(),
            ..SettingsForm::default()
        };

        block_on(form.save(&settings)).unwrap();

        assert_eq!(
            settings.value(SettingKey::SearchEngineUrl).as_deref(),
            Some("https://www.bing.com")
        );
        assert_eq!(settings.value(SettingKey::AccentColor).as_deref(), Some(DEFAULT_ACCENT));
        let stored = settings.value(SettingKey::BackgroundTheme).unwrap();
        assert_eq!(BackgroundTheme::parse_or_default(&stored), BackgroundTheme::default());
    }

    #[test]
    fn test_save_rejects_invalid_color() {
        let settings = MemorySettings::default();
        let form = SettingsForm {
            accent_color: "#12345".to_string(),
            ..SettingsForm::default()
        };

        let err = block_on(form.save(&settings)).unwrap_err();

        assert_eq!(err, ApiError::Validation("Invalid color: #12345".to_string()));
        assert_eq!(settings.value(SettingKey::AccentColor), None);
    }

    #[test]
    fn test_save_rejects_signed_hex() {
        let settings = MemorySettings::default();
        let mut form = SettingsForm::default();
        form.background.card = "#+1+2+3".to_string();

        let err = block_on(form.save(&settings)).unwrap_err();

        assert_eq!(err, ApiError::Validation("Invalid color: #+1+2+3".to_string()));
        assert_eq!(settings.value(SettingKey::SearchEngineUrl), None);
    }

    #[test]
    fn test_save_surfaces_server_error() {
        let settings = MemorySettings::default().failing(
            SettingKey::AccentColor,
            ApiError::Server {
                status: 500,
                message: "Database locked".to_string(),
            },
        );

        let err = block_on(SettingsForm::default().save(&settings)).unwrap_err();

        assert_eq!(err.to_string(), "Database locked");
        assert!(settings.value(SettingKey::SearchEngineUrl).is_some());
        assert_eq!(settings.value(SettingKey::BackgroundTheme), None);
    }
}
