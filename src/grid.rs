/// Link grid operations: validated CRUD followed by a full re-fetch
use std::cell::RefCell;

use crate::error::{ApiError, Result};
use crate::link::{Link, LinkDraft};
use crate::store::LinkStore;

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this link?";

/// Blocking user prompts
pub trait Dialogs {
    fn alert(&self, message: &str);
    fn confirm(&self, message: &str) -> bool;
}

/// `window.alert` / `window.confirm`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BrowserDialogs;

impl Dialogs for BrowserDialogs {
    fn alert(&self, message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }

    fn confirm(&self, message: &str) -> bool {
        web_sys::window()
            .and_then(|window| window.confirm_with_message(message).ok())
            .unwrap_or(false)
    }
}

/// A mutation the server accepted, with the outcome of the re-fetch that
/// followed it
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub refreshed: Result<Vec<Link>>,
}

/// Owns the displayed link set. The set is only ever replaced by a fresh
/// `list()` from the store, never patched locally.
pub struct LinkGridController<S: LinkStore, D: Dialogs> {
    store: S,
    dialogs: D,
    links: RefCell<Vec<Link>>,
}

impl<S: LinkStore, D: Dialogs> LinkGridController<S, D> {
    pub fn new(store: S, dialogs: D) -> Self {
        LinkGridController {
            store,
            dialogs,
            links: RefCell::new(Vec::new()),
        }
    }

    /// Snapshot of the displayed links
    pub fn links(&self) -> Vec<Link> {
        self.links.borrow().clone()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn report(&self, action: &str, error: &ApiError) {
        log::error!("Failed to {}: {}", action, error);
        self.dialogs.alert(&format!("Error: {}", error));
    }

    /// Fetch the full link set and make it the displayed set
    pub async fn list(&self) -> Result<Vec<Link>> {
        match self.store.list().await {
            Ok(links) => {
                *self.links.borrow_mut() = links.clone();
                Ok(links)
            }
            Err(e) => {
                self.report("load links", &e);
                Err(e)
            }
        }
    }

    fn validated(&self, draft: &LinkDraft) -> Result<LinkDraft> {
        draft.validate().inspect_err(|e| self.dialogs.alert(&e.to_string()))
    }

    /// Re-fetch after an accepted mutation. A failed refresh is alerted by
    /// `list()` but does not undo the mutation.
    async fn refreshed(&self) -> Applied {
        Applied {
            refreshed: self.list().await,
        }
    }

    pub async fn create(&self, draft: &LinkDraft) -> Result<Applied> {
        let draft = self.validated(draft)?;

        if let Err(e) = self.store.create(&draft).await {
            self.report("create link", &e);
            return Err(e);
        }
        log::info!("Created link {}", draft.name);

        Ok(self.refreshed().await)
    }

    pub async fn update(&self, id: i64, draft: &LinkDraft) -> Result<Applied> {
        let draft = self.validated(draft)?;

        if let Err(e) = self.store.update(id, &draft).await {
            self.report("update link", &e);
            return Err(e);
        }
        log::info!("Updated link {}", id);

        Ok(self.refreshed().await)
    }

    /// `Ok(None)` when the user declines the confirmation
    pub async fn delete(&self, id: i64) -> Result<Option<Applied>> {
        if !self.dialogs.confirm(DELETE_CONFIRMATION) {
            return Ok(None);
        }

        if let Err(e) = self.store.delete(id).await {
            self.report("delete link", &e);
            return Err(e);
        }
        log::info!("Deleted link {}", id);

        Ok(Some(self.refreshed().await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::MemoryLinks;
    use futures::executor::block_on;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct FakeDialogs {
        alerts: RefCell<Vec<String>>,
        decline: Cell<bool>,
    }

    impl Dialogs for &FakeDialogs {
        fn alert(&self, message: &str) {
            self.alerts.borrow_mut().push(message.to_string());
        }

        fn confirm(&self, _message: &str) -> bool {
            !self.decline.get()
        }
    }

    fn seeded() -> MemoryLinks {
        MemoryLinks::with_links(&[
            ("YouTube", "https://www.youtube.com"),
            ("Netflix", "https://www.netflix.com"),
        ])
    }

    fn names(links: &[Link]) -> Vec<&str> {
        links.iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn test_list_replaces_grid() {
        let dialogs = FakeDialogs::default();
        let grid = LinkGridController::new(seeded(), &dialogs);

        block_on(grid.list()).unwrap();

        assert_eq!(names(&grid.links()), vec!["YouTube", "Netflix"]);
    }

    #[test]
    fn test_blank_fields_never_hit_the_store() {
        let dialogs = FakeDialogs::default();
        let grid = LinkGridController::new(seeded(), &dialogs);
        block_on(grid.list()).unwrap();
        let before = grid.links();

        let result = block_on(grid.create(&LinkDraft::new("   ", "https://example.com")));
        assert!(matches!(result, Err(ApiError::Validation(_))));

        let result = block_on(grid.update(1, &LinkDraft::new("YouTube", "  ")));
        assert!(matches!(result, Err(ApiError::Validation(_))));

        assert_eq!(grid.store().calls(), vec!["list"]);
        assert_eq!(grid.links(), before);
        assert_eq!(dialogs.alerts.borrow().len(), 2);
    }

    #[test]
    fn test_create_refetches() {
        let dialogs = FakeDialogs::default();
        let grid = LinkGridController::new(seeded(), &dialogs);
        block_on(grid.list()).unwrap();

        // A link added elsewhere shows up with the re-fetch
        grid.store().push_external("Plex", "https://app.plex.tv");
        let links = block_on(grid.create(&LinkDraft::new(" GitHub ", "https://github.com")))
            .unwrap()
            .refreshed
            .unwrap();

        assert_eq!(grid.store().calls(), vec!["list", "create GitHub", "list"]);
        assert_eq!(names(&links), vec!["YouTube", "Netflix", "Plex", "GitHub"]);
        assert_eq!(grid.links(), grid.store().links());
    }

    #[test]
    fn test_update_refetches_without_duplicates() {
        let dialogs = FakeDialogs::default();
        let grid = LinkGridController::new(seeded(), &dialogs);
        block_on(grid.list()).unwrap();

        block_on(grid.update(2, &LinkDraft::new("Netflix Kids", "https://www.netflix.com/kids")))
            .unwrap()
            .refreshed
            .unwrap();

        assert_eq!(grid.store().calls(), vec!["list", "update 2", "list"]);
        assert_eq!(names(&grid.links()), vec!["YouTube", "Netflix Kids"]);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let dialogs = FakeDialogs::default();
        dialogs.decline.set(true);
        let grid = LinkGridController::new(seeded(), &dialogs);
        block_on(grid.list()).unwrap();

        let result = block_on(grid.delete(1)).unwrap();

        assert_eq!(result, None);
        assert_eq!(grid.store().calls(), vec!["list"]);
        assert_eq!(grid.links().len(), 2);
    }

    #[test]
    fn test_delete_refetches() {
        let dialogs = FakeDialogs::default();
        let grid = LinkGridController::new(seeded(), &dialogs);
        block_on(grid.list()).unwrap();

        let links = block_on(grid.delete(1)).unwrap().unwrap().refreshed.unwrap();

        assert_eq!(grid.store().calls(), vec!["list", "delete 1", "list"]);
        assert_eq!(names(&links), vec!["Netflix"]);
        assert_eq!(grid.links(), links);
    }

    #[test]
    fn test_server_error_is_alerted_verbatim() {
        let dialogs = FakeDialogs::default();
        let grid = LinkGridController::new(seeded(), &dialogs);
        block_on(grid.list()).unwrap();

        grid.store()
            .fail_next(ApiError::from_response(400, r#"{"error": "Name and URL are required"}"#));
        let result = block_on(grid.create(&LinkDraft::new("GitHub", "https://github.com")));

        assert!(result.is_err());
        assert_eq!(*dialogs.alerts.borrow(), vec!["Error: Name and URL are required"]);
        // No re-fetch after a failed mutation, grid untouched
        assert_eq!(grid.store().calls(), vec!["list", "create GitHub"]);
        assert_eq!(grid.links().len(), 2);
    }

    #[test]
    fn test_accepted_create_survives_failed_refresh() {
        let dialogs = FakeDialogs::default();
        let grid = LinkGridController::new(seeded(), &dialogs);
        block_on(grid.list()).unwrap();

        grid.store().fail_lists(ApiError::Transport("offline".to_string()));
        let applied = block_on(grid.create(&LinkDraft::new("GitHub", "https://github.com"))).unwrap();

        assert_eq!(applied.refreshed, Err(ApiError::Transport("offline".to_string())));
        assert_eq!(grid.store().links().len(), 3);
        assert_eq!(*dialogs.alerts.borrow(), vec!["Error: Connection failed: offline"]);
        // Displayed set is only ever replaced by a successful list()
        assert_eq!(grid.links().len(), 2);
    }

    #[test]
    fn test_accepted_delete_survives_failed_refresh() {
        let dialogs = FakeDialogs::default();
        let grid = LinkGridController::new(seeded(), &dialogs);
        block_on(grid.list()).unwrap();

        grid.store().fail_lists(ApiError::Transport("offline".to_string()));
        let applied = block_on(grid.delete(1)).unwrap().unwrap();

        assert!(applied.refreshed.is_err());
        assert_eq!(grid.store().calls(), vec!["list", "delete 1", "list"]);
        assert_eq!(grid.store().links().len(), 1);
    }
}
