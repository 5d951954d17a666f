/// Toolbar visibility state machine and the content-script link cache
///
/// States: Hidden, Visible. One hide timer at most:
/// - pointer enters trigger zone or panel → Visible, pending hide cancelled
/// - pointer leaves panel → hide scheduled `HIDE_DELAY_MS` later
/// - the timer fires → Hidden, unless it was cancelled or superseded
/// - a link is activated → Hidden immediately
use crate::link::Link;

pub const HIDE_DELAY_MS: u32 = 300;

/// Links fetched by the content script stay fresh for five minutes
pub const CACHE_TTL_MS: f64 = 5.0 * 60.0 * 1000.0;

/// Identifies one scheduled hide; only the most recent ticket is honoured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HideTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingHide {
    ticket: HideTicket,
    due_at: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolbarController {
    visible: bool,
    pending_hide: Option<PendingHide>,
    next_ticket: u64,
}

impl ToolbarController {
    pub fn new() -> Self {
        ToolbarController {
            visible: false,
            pending_hide: None,
            next_ticket: 0,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// When the pending hide is due, if any
    pub fn pending_hide_at(&self) -> Option<f64> {
        self.pending_hide.map(|p| p.due_at)
    }

    /// Pointer entered the trigger zone or the panel.
    /// Returns true if the panel became visible.
    pub fn pointer_enter(&mut self) -> bool {
        self.pending_hide = None;
        let changed = !self.visible;
        self.visible = true;
        changed
    }

    /// Pointer left the panel at `now` (ms). The caller waits
    /// `HIDE_DELAY_MS` and then reports the ticket to `hide_timer_fired`.
    pub fn pointer_leave(&mut self, now: f64) -> HideTicket {
        self.next_ticket += 1;
        let ticket = HideTicket(self.next_ticket);
        self.pending_hide = Some(PendingHide {
            ticket,
            due_at: now + HIDE_DELAY_MS as f64,
        });
        ticket
    }

    /// Returns true if this call hid the panel.
    pub fn hide_timer_fired(&mut self, ticket: HideTicket) -> bool {
        match self.pending_hide {
            Some(pending) if pending.ticket == ticket => {
                self.pending_hide = None;
                let changed = self.visible;
                self.visible = false;
                changed
            }
            _ => false,
        }
    }

    /// A link was clicked: hide without the grace delay
    pub fn link_activated(&mut self) -> bool {
        self.pending_hide = None;
        let changed = self.visible;
        self.visible = false;
        changed
    }
}

impl Default for ToolbarController {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct CacheEntry {
    links: Vec<Link>,
    fetched_at: f64,
}

/// Time-limited copy of the link list
#[derive(Debug, Clone, PartialEq)]
pub struct LinkCache {
    entry: Option<CacheEntry>,
    ttl_ms: f64,
}

impl LinkCache {
    pub fn new() -> Self {
        LinkCache::with_ttl(CACHE_TTL_MS)
    }

    pub fn with_ttl(ttl_ms: f64) -> Self {
        LinkCache { entry: None, ttl_ms }
    }

    /// Cached links if they were fetched less than the TTL before `now`
    pub fn get(&self, now: f64) -> Option<&[Link]> {
        self.entry
            .as_ref()
            .filter(|entry| now - entry.fetched_at < self.ttl_ms)
            .map(|entry| entry.links.as_slice())
    }

    pub fn store(&mut self, links: Vec<Link>, now: f64) {
        self.entry = Some(CacheEntry {
            links,
            fetched_at: now,
        });
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Whether a link with exactly this URL is in the (possibly stale) cache
    pub fn contains_url(&self, url: &str) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|entry| entry.links.iter().any(|link| link.url == url))
    }
}

impl Default for LinkCache {
    fn default() -> Self {
        Self::new()
    }
}
