/// Glyph identifiers offered by the custom icon picker
use std::collections::BTreeSet;

use regex::Regex;

/// Most glyphs rendered in the picker at once
pub const MAX_VISIBLE_ICONS: usize = 200;

/// Used when the icon stylesheet cannot be read or parsed
pub const FALLBACK_ICONS: &[&str] = &[
    "bi-alarm", "bi-app", "bi-archive", "bi-arrow-down", "bi-arrow-left", "bi-arrow-right", "bi-arrow-up",
    "bi-bag", "bi-bell", "bi-book", "bi-bookmark", "bi-calendar", "bi-camera", "bi-cart", "bi-chat",
    "bi-check", "bi-circle", "bi-clipboard", "bi-clock", "bi-cloud", "bi-code", "bi-compass",
    "bi-cpu", "bi-credit-card", "bi-cursor", "bi-dash", "bi-disc", "bi-download", "bi-envelope",
    "bi-eye", "bi-file", "bi-film", "bi-flag", "bi-folder", "bi-gear", "bi-gift", "bi-globe",
    "bi-graph-up", "bi-grid", "bi-hammer", "bi-heart", "bi-house", "bi-image", "bi-info",
    "bi-key", "bi-laptop", "bi-link", "bi-list", "bi-lock", "bi-map", "bi-mic", "bi-moon",
    "bi-music-note", "bi-pause", "bi-pencil", "bi-person", "bi-phone", "bi-play", "bi-plus",
    "bi-printer", "bi-search", "bi-share", "bi-shield", "bi-star", "bi-stop", "bi-sun",
    "bi-table", "bi-tag", "bi-trash", "bi-tv", "bi-upload", "bi-volume-up", "bi-wifi", "bi-x",
];

#[derive(Debug, Clone, PartialEq)]
pub struct IconCatalog {
    icons: Vec<String>,
}

impl IconCatalog {
    pub fn fallback() -> Self {
        IconCatalog {
            icons: FALLBACK_ICONS.iter().map(|icon| icon.to_string()).collect(),
        }
    }

    /// Extract `bi-*` glyph classes from the icon font stylesheet.
    /// Returns the fallback catalog when the CSS contains none.
    pub fn from_css(css: &str) -> Self {
        let pattern = match Regex::new(r"\.(bi-[a-z0-9-]+)::before") {
            Ok(pattern) => pattern,
            Err(e) => {
                log::error!("Icon pattern failed to compile: {}", e);
                return IconCatalog::fallback();
            }
        };

        let icons: BTreeSet<String> = pattern
            .captures_iter(css)
            .map(|caps| caps[1].to_string())
            .collect();

        if icons.is_empty() {
            log::warn!("Could not parse icons from CSS, using fallback");
            return IconCatalog::fallback();
        }

        log::info!("Loaded {} icons", icons.len());
        IconCatalog {
            icons: icons.into_iter().collect(),
        }
    }

    /// Fetch the stylesheet and parse it, falling back on any failure
    pub async fn load(stylesheet_url: Option<&str>) -> Self {
        let Some(url) = stylesheet_url else {
            log::warn!("Icon stylesheet not found, using fallback icons");
            return IconCatalog::fallback();
        };

        match crate::bridge::fetch_text(url).await {
            Ok(css) => IconCatalog::from_css(&css),
            Err(e) => {
                log::error!("Error loading icons: {}", e);
                IconCatalog::fallback()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    /// Case-insensitive substring search, returning `(shown, total_matches)`
    pub fn search(&self, term: &str) -> (Vec<&str>, usize) {
        let term = term.trim().to_lowercase();
        let matches: Vec<&str> = self
            .icons
            .iter()
            .map(String::as_str)
            .filter(|icon| term.is_empty() || icon.contains(&term))
            .collect();

        let total = matches.len();
        (matches.into_iter().take(MAX_VISIBLE_ICONS).collect(), total)
    }
}

impl Default for IconCatalog {
    fn default() -> Self {
        Self::fallback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_css_dedupes_and_sorts() {
        let css = r#"
            .bi-tv::before { content: "\f5f4"; }
            .bi-alarm::before { content: "\f102"; }
            .bi-tv::before { content: "\f5f4"; }
            .bi-1-circle::before { content: "\f796"; }
            .bi-tv:hover { color: red; }
        "#;

        let catalog = IconCatalog::from_css(css);

        assert_eq!(catalog.search("").0, vec!["bi-1-circle", "bi-alarm", "bi-tv"]);
    }

    #[test]
    fn test_from_css_without_icons_falls_back() {
        let catalog = IconCatalog::from_css("body { margin: 0; }");
        assert_eq!(catalog, IconCatalog::fallback());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let catalog = IconCatalog::fallback();
        let (shown, total) = catalog.search("ARROW");

        assert_eq!(total, 4);
        assert!(shown.iter().all(|icon| icon.contains("arrow")));
    }

    #[test]
    fn test_search_caps_results() {
        let css: String = (0..250).map(|i| format!(".bi-icon-{}::before {{}}\n", i)).collect();
        let catalog = IconCatalog::from_css(&css);

        let (shown, total) = catalog.search("icon");

        assert_eq!(total, 250);
        assert_eq!(shown.len(), MAX_VISIBLE_ICONS);
    }
}
