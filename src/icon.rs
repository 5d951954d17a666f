/// Site icon resolution with an ordered fallback chain
///
/// Resolution:
/// 1. Custom glyph set on the link → tinted glyph, no network
/// 2. URL does not parse (or has no host) → placeholder glyph, no network
/// 3. Otherwise → an `IconChain` of image candidates, tried in order;
///    the next candidate is only requested after the previous one fails
///    to load, and an exhausted chain ends in the placeholder glyph
///
/// Examples (page preset):
/// - https://www.youtube.com → logo.clearbit.com → apple-touch-icon.png → Google s2 favicon → glyph
/// - "not a url" → glyph
use url::Url;

/// Tint used for glyphs when the link has no colour of its own
pub const DEFAULT_GLYPH_COLOR: &str = "var(--accent-primary)";

/// Which sources a resolver may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconResolverConfig {
    pub include_logo_service: bool,
    pub include_custom_icon: bool,
    pub favicon_size: u32,
}

impl IconResolverConfig {
    /// Link grid cards: large icons, custom glyphs allowed
    pub const PAGE: IconResolverConfig = IconResolverConfig {
        include_logo_service: true,
        include_custom_icon: true,
        favicon_size: 128,
    };

    /// Slim toolbar entries
    pub const TOOLBAR: IconResolverConfig = IconResolverConfig {
        include_logo_service: false,
        include_custom_icon: false,
        favicon_size: 32,
    };
}

/// One step of the fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconSource {
    /// Company logo by domain
    LogoService,
    /// The site's own `apple-touch-icon.png`
    AppleTouchIcon,
    /// High resolution favicon by domain
    Favicon { size: u32 },
}

impl IconSource {
    pub fn url_for(&self, host: &str) -> String {
        match self {
            IconSource::LogoService => format!("https://logo.clearbit.com/{}", host),
            IconSource::AppleTouchIcon => format!("https://{}/apple-touch-icon.png", host),
            IconSource::Favicon { size } => {
                format!("https://www.google.com/s2/favicons?domain={}&sz={}", host, size)
            }
        }
    }
}

/// Ordered image candidates for one host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconChain {
    host: String,
    sources: Vec<IconSource>,
}

impl IconChain {
    pub fn new(host: &str, config: &IconResolverConfig) -> IconChain {
        let mut sources = Vec::with_capacity(3);
        if config.include_logo_service {
            sources.push(IconSource::LogoService);
        }
        sources.push(IconSource::AppleTouchIcon);
        sources.push(IconSource::Favicon {
            size: config.favicon_size,
        });

        IconChain {
            host: host.to_string(),
            sources,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn sources(&self) -> &[IconSource] {
        &self.sources
    }

    /// Candidate URLs in the order they are attempted
    pub fn candidates(&self) -> IconCandidates<'_> {
        IconCandidates {
            chain: self,
            position: 0,
        }
    }

    /// Image URL for the given attempt, `None` once the chain is exhausted
    pub fn candidate(&self, attempt: usize) -> Option<String> {
        self.candidates().nth(attempt)
    }
}

/// Iterator over an `IconChain`; each `next` is one load failure further along
#[derive(Debug, Clone)]
pub struct IconCandidates<'a> {
    chain: &'a IconChain,
    position: usize,
}

impl Iterator for IconCandidates<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let source = self.chain.sources.get(self.position)?;
        self.position += 1;
        Some(source.url_for(&self.chain.host))
    }
}

impl std::iter::FusedIterator for IconCandidates<'_> {}

/// What to render for a link icon
#[derive(Debug, Clone, PartialEq)]
pub enum IconMarkup {
    /// Glyph from the icon font, tinted with `color`
    Glyph { class: String, color: String },
    /// Image with fallbacks
    Image { chain: IconChain, alt: String },
    /// Inline vector glyph; cannot fail to load
    Placeholder,
}

impl IconMarkup {
    /// Number of network requests the markup can trigger in the worst case
    pub fn max_requests(&self) -> usize {
        match self {
            IconMarkup::Image { chain, .. } => chain.sources().len(),
            IconMarkup::Glyph { .. } | IconMarkup::Placeholder => 0,
        }
    }
}

/// How far down its fallback chain one particular markup has got. A position
/// recorded for different markup reads as the start of the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainPosition {
    markup: IconMarkup,
    attempt: usize,
}

impl ChainPosition {
    pub fn new(markup: IconMarkup) -> ChainPosition {
        ChainPosition { markup, attempt: 0 }
    }

    pub fn attempt_for(&self, markup: &IconMarkup) -> usize {
        if &self.markup == markup { self.attempt } else { 0 }
    }

    /// Position after the current source of `markup` failed to load
    pub fn advanced(&self, markup: &IconMarkup) -> ChainPosition {
        ChainPosition {
            markup: markup.clone(),
            attempt: self.attempt_for(markup) + 1,
        }
    }
}

/// Turns links into icon markup according to one configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconResolver {
    config: IconResolverConfig,
}

impl IconResolver {
    pub fn new(config: IconResolverConfig) -> IconResolver {
        IconResolver { config }
    }

    pub fn config(&self) -> &IconResolverConfig {
        &self.config
    }

    pub fn resolve_icon(
        &self,
        url: &str,
        name: &str,
        custom_icon: Option<&str>,
        color: Option<&str>,
    ) -> IconMarkup {
        if self.config.include_custom_icon {
            if let Some(class) = custom_icon.filter(|c| !c.is_empty()) {
                return IconMarkup::Glyph {
                    class: class.to_string(),
                    color: color.unwrap_or(DEFAULT_GLYPH_COLOR).to_string(),
                };
            }
        }

        match extract_host(url) {
            Some(host) => IconMarkup::Image {
                chain: IconChain::new(&host, &self.config),
                alt: name.to_string(),
            },
            None => IconMarkup::Placeholder,
        }
    }
}

/// Host of an absolute URL, `None` when the URL does not parse or has no host
pub fn extract_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .map(|host| host.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> IconResolver {
        IconResolver::new(IconResolverConfig::PAGE)
    }

    fn toolbar() -> IconResolver {
        IconResolver::new(IconResolverConfig::TOOLBAR)
    }

    #[test]
    fn test_extract_host() {
        assert_eq!(extract_host("https://www.youtube.com/watch?v=1"), Some("www.youtube.com".to_string()));
        assert_eq!(extract_host("http://localhost:5000/"), Some("localhost".to_string()));
        assert_eq!(extract_host("https://News.BBC.co.uk"), Some("news.bbc.co.uk".to_string()));
    }

    #[test]
    fn test_extract_host_rejects_non_urls() {
        assert_eq!(extract_host(""), None);
        assert_eq!(extract_host("youtube.com"), None);
        assert_eq!(extract_host("not a url"), None);
        assert_eq!(extract_host("mailto:someone@example.com"), None);
    }

    #[test]
    fn test_page_chain_order() {
        let markup = page().resolve_icon("https://www.netflix.com", "Netflix", None, None);

        let IconMarkup::Image { chain, alt } = markup else {
            panic!("expected image markup");
        };

        assert_eq!(alt, "Netflix");
        let urls: Vec<String> = chain.candidates().collect();
        assert_eq!(
            urls,
            vec![
                "https://logo.clearbit.com/www.netflix.com".to_string(),
                "https://www.netflix.com/apple-touch-icon.png".to_string(),
                "https://www.google.com/s2/favicons?domain=www.netflix.com&sz=128".to_string(),
            ]
        );
    }

    #[test]
    fn test_toolbar_chain_skips_logo_service() {
        let markup = toolbar().resolve_icon("https://github.com/rust-lang", "GitHub", None, None);

        let IconMarkup::Image { chain, .. } = markup else {
            panic!("expected image markup");
        };

        assert_eq!(
            chain.sources(),
            &[IconSource::AppleTouchIcon, IconSource::Favicon { size: 32 }]
        );
    }

    #[test]
    fn test_chain_terminates() {
        let markup = page().resolve_icon("https://unreachable.invalid", "Nope", None, None);
        let IconMarkup::Image { chain, .. } = markup else {
            panic!("expected image markup");
        };

        let mut candidates = chain.candidates();
        for _ in 0..3 {
            assert!(candidates.next().is_some());
        }
        // Exhausted: every further failure keeps pointing at the glyph
        assert_eq!(candidates.next(), None);
        assert_eq!(candidates.next(), None);
        assert_eq!(chain.candidate(3), None);
        assert_eq!(chain.candidate(100), None);
    }

    #[test]
    fn test_unparseable_url_is_placeholder() {
        let markup = page().resolve_icon("just some words", "Words", None, None);

        assert_eq!(markup, IconMarkup::Placeholder);
        assert_eq!(markup.max_requests(), 0);
    }

    #[test]
    fn test_custom_icon_short_circuits() {
        let markup = page().resolve_icon("https://www.youtube.com", "YouTube", Some("bi-tv"), Some("#ff0000"));

        assert_eq!(
            markup,
            IconMarkup::Glyph {
                class: "bi-tv".to_string(),
                color: "#ff0000".to_string()
            }
        );
        assert_eq!(markup.max_requests(), 0);
    }

    #[test]
    fn test_custom_icon_default_color() {
        let markup = page().resolve_icon("not a url", "Home", Some("bi-house"), None);

        assert_eq!(
            markup,
            IconMarkup::Glyph {
                class: "bi-house".to_string(),
                color: DEFAULT_GLYPH_COLOR.to_string()
            }
        );
    }

    #[test]
    fn test_toolbar_ignores_custom_icon() {
        let markup = toolbar().resolve_icon("https://www.youtube.com", "YouTube", Some("bi-tv"), None);

        assert!(matches!(markup, IconMarkup::Image { .. }));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let first = page().resolve_icon("https://example.com/a", "A", None, None);
        let second = page().resolve_icon("https://example.com/a", "A", None, None);

        assert_eq!(first, second);
    }

    #[test]
    fn test_position_restarts_for_new_markup() {
        let youtube = page().resolve_icon("https://www.youtube.com", "YouTube", None, None);
        let netflix = page().resolve_icon("https://www.netflix.com", "Netflix", None, None);

        let position = ChainPosition::new(youtube.clone()).advanced(&youtube).advanced(&youtube);
        assert_eq!(position.attempt_for(&youtube), 2);

        // Markup swapped under an advanced position starts from its first source
        assert_eq!(position.attempt_for(&netflix), 0);
        let IconMarkup::Image { chain, .. } = &netflix else {
            panic!("expected image markup");
        };
        assert_eq!(
            chain.candidate(position.attempt_for(&netflix)).as_deref(),
            Some("https://logo.clearbit.com/www.netflix.com")
        );
        assert_eq!(position.advanced(&netflix).attempt_for(&netflix), 1);
    }
}
