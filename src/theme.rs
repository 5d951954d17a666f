/// Accent and background theme: colour parsing, shade derivation and the CSS
/// variables consumed by the page and the injected toolbar
use serde::{Deserialize, Serialize};

use crate::store::{SettingKey, SettingsStore};

pub const DEFAULT_ACCENT: &str = "#f8a5c2";

/// Brightness offsets for derived shades
pub const ACCENT_SECONDARY_DELTA: i32 = 20;
pub const CARD_HOVER_DELTA: i32 = 15;
pub const CARD_BORDER_DELTA: i32 = 10;

/// An opaque RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional). Shorthand and alpha forms are rejected.
    pub fn from_hex(hex: &str) -> Option<Color> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        let byte = |s: &str| u8::from_str_radix(s, 16).ok();
        Some(Color {
            r: byte(&hex[0..2])?,
            g: byte(&hex[2..4])?,
            b: byte(&hex[4..6])?,
        })
    }

    /// Lowercase `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Add `delta` to each channel independently, clamped to `[0, 255]`.
pub fn derive(base: Color, delta: i32) -> Color {
    let shift = |channel: u8| (channel as i32 + delta).clamp(0, 255) as u8;
    Color {
        r: shift(base.r),
        g: shift(base.g),
        b: shift(base.b),
    }
}

/// The `background_theme` setting, stored as a JSON string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackgroundTheme {
    pub primary: String,
    pub secondary: String,
    pub card: String,
}

impl Default for BackgroundTheme {
    fn default() -> Self {
        BackgroundTheme {
            primary: "#111827".to_string(),
            secondary: "#1f2937".to_string(),
            card: "#374151".to_string(),
        }
    }
}

impl BackgroundTheme {
    /// Parse the stored JSON, falling back to the default theme on any problem.
    pub fn parse_or_default(raw: &str) -> BackgroundTheme {
        match serde_json::from_str::<BackgroundTheme>(raw) {
            Ok(theme)
                if [&theme.primary, &theme.secondary, &theme.card]
                    .iter()
                    .all(|c| Color::from_hex(c).is_some()) =>
            {
                theme
            }
            Ok(_) => {
                log::warn!("Background theme has invalid colours, using default");
                BackgroundTheme::default()
            }
            Err(e) => {
                log::warn!("Invalid background theme JSON ({}), using default", e);
                BackgroundTheme::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// All theme colours, base and derived
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeSettings {
    pub accent_primary: Color,
    pub accent_secondary: Color,
    pub bg_primary: Color,
    pub bg_secondary: Color,
    pub bg_card: Color,
    pub bg_card_hover: Color,
    pub border: Color,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        ThemeSettings::from_parts(DEFAULT_ACCENT, &BackgroundTheme::default())
    }
}

impl ThemeSettings {
    /// Build settings from the two stored values. Unparseable colours fall
    /// back to their defaults individually.
    pub fn from_parts(accent: &str, background: &BackgroundTheme) -> ThemeSettings {
        let fallback = BackgroundTheme::default();
        let color_or = |value: &str, default: &str| {
            Color::from_hex(value)
                .or_else(|| Color::from_hex(default))
                .unwrap_or(Color::rgb(0, 0, 0))
        };

        let accent = color_or(accent, DEFAULT_ACCENT);
        let card = color_or(&background.card, &fallback.card);

        ThemeSettings {
            accent_primary: accent,
            accent_secondary: derive(accent, ACCENT_SECONDARY_DELTA),
            bg_primary: color_or(&background.primary, &fallback.primary),
            bg_secondary: color_or(&background.secondary, &fallback.secondary),
            bg_card: card,
            bg_card_hover: derive(card, CARD_HOVER_DELTA),
            border: derive(card, CARD_BORDER_DELTA),
        }
    }

    /// CSS custom properties, e.g. prefix `--` for the page or `--tvbox-`
    /// for the injected toolbar.
    pub fn css_variables(&self, prefix: &str) -> Vec<(String, String)> {
        let accent = self.accent_primary.to_hex();
        vec![
            (format!("{}accent-primary", prefix), accent.clone()),
            (format!("{}accent-secondary", prefix), self.accent_secondary.to_hex()),
            // 40 = 25% alpha
            (format!("{}shadow-glow", prefix), format!("0 0 20px {}40", accent)),
            (format!("{}bg-primary", prefix), self.bg_primary.to_hex()),
            (format!("{}bg-secondary", prefix), self.bg_secondary.to_hex()),
            (format!("{}bg-card", prefix), self.bg_card.to_hex()),
            (format!("{}bg-card-hover", prefix), self.bg_card_hover.to_hex()),
            (format!("{}border-color", prefix), self.border.to_hex()),
        ]
    }

    /// The same variables as an inline `style` attribute value
    pub fn inline_style(&self, prefix: &str) -> String {
        self.css_variables(prefix)
            .into_iter()
            .map(|(name, value)| format!("{}: {};", name, value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Loads the two theme settings. Never fails: every problem silently
/// falls back to the default for that setting.
pub struct ThemeApplier<'a, S: SettingsStore> {
    settings: &'a S,
}

impl<'a, S: SettingsStore> ThemeApplier<'a, S> {
    pub fn new(settings: &'a S) -> Self {
        ThemeApplier { settings }
    }

    pub async fn load(&self) -> ThemeSettings {
        let accent = match self.settings.get_setting(SettingKey::AccentColor).await {
            Ok(Some(value)) if Color::from_hex(&value).is_some() => value,
            Ok(_) => {
                log::debug!("Using default accent color");
                DEFAULT_ACCENT.to_string()
            }
            Err(e) => {
                log::debug!("Failed to load accent color, using default: {}", e);
                DEFAULT_ACCENT.to_string()
            }
        };

        let background = match self.settings.get_setting(SettingKey::BackgroundTheme).await {
            Ok(Some(raw)) => BackgroundTheme::parse_or_default(&raw),
            Ok(None) => BackgroundTheme::default(),
            Err(e) => {
                log::debug!("Failed to load background theme, using default: {}", e);
                BackgroundTheme::default()
            }
        };

        ThemeSettings::from_parts(&accent, &background)
    }
}
