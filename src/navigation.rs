/// Single managed tab: link navigations reuse one browser tab
use std::cell::Cell;

use serde::{Deserialize, Serialize};

pub type TabId = i32;

/// How an `openUrl` request was satisfied
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OpenAction {
    UpdatedExisting,
    CreatedNew,
    CreatedNewAfterError,
}

/// Browser tab operations used by the policy
#[allow(async_fn_in_trait)]
pub trait TabApi {
    async fn create(&self, url: &str) -> Result<TabId, String>;
    async fn update(&self, tab: TabId, url: &str) -> Result<(), String>;
    async fn remove(&self, tab: TabId) -> Result<(), String>;
}

/// chrome.tabs through the JS bridge
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeTabs;

impl TabApi for ChromeTabs {
    async fn create(&self, url: &str) -> Result<TabId, String> {
        crate::bridge::create_tab(url).await
    }

    async fn update(&self, tab: TabId, url: &str) -> Result<(), String> {
        crate::bridge::update_tab(tab, url).await
    }

    async fn remove(&self, tab: TabId) -> Result<(), String> {
        crate::bridge::remove_tab(tab).await
    }
}

/// Tracks the managed tab and routes navigations into it
pub struct TabManager<T: TabApi> {
    tabs: T,
    current: Cell<Option<TabId>>,
}

impl<T: TabApi> TabManager<T> {
    pub fn new(tabs: T, initial: Option<TabId>) -> Self {
        TabManager {
            tabs,
            current: Cell::new(initial),
        }
    }

    pub fn current(&self) -> Option<TabId> {
        self.current.get()
    }

    pub fn tabs(&self) -> &T {
        &self.tabs
    }

    /// Track `tab` unless a managed tab is already known
    pub fn adopt(&self, tab: TabId) {
        if self.current.get().is_none() {
            self.current.set(Some(tab));
            log::debug!("Initialized with active tab {}", tab);
        }
    }

    /// Navigate the managed tab to `url`, creating it when there is none
    /// or when it has disappeared without us noticing.
    pub async fn open_url(&self, url: &str) -> Result<OpenAction, String> {
        if let Some(tab) = self.current.get() {
            match self.tabs.update(tab, url).await {
                Ok(()) => return Ok(OpenAction::UpdatedExisting),
                Err(e) => log::warn!("Managed tab {} unavailable ({}), creating a new one", tab, e),
            }
            let tab = self.tabs.create(url).await?;
            self.current.set(Some(tab));
            return Ok(OpenAction::CreatedNewAfterError);
        }

        let tab = self.tabs.create(url).await?;
        self.current.set(Some(tab));
        Ok(OpenAction::CreatedNew)
    }

    /// Any new tab becomes the managed tab; the previous one is closed.
    pub async fn tab_created(&self, tab: TabId) {
        let previous = self.current.replace(Some(tab));
        if let Some(previous) = previous.filter(|&p| p != tab) {
            match self.tabs.remove(previous).await {
                Ok(()) => log::debug!("Closed previous tab {} for new tab {}", previous, tab),
                Err(_) => log::debug!("Previous tab {} already closed", previous),
            }
        }
    }

    pub fn tab_removed(&self, tab: TabId) {
        if self.current.get() == Some(tab) {
            self.current.set(None);
            log::debug!("Stopped tracking removed tab {}", tab);
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeSet;

    /// Fake browser: a set of open tab ids
    #[derive(Default)]
    pub struct FakeTabs {
        open: RefCell<BTreeSet<TabId>>,
        next_id: Cell<TabId>,
        pub navigations: RefCell<Vec<(TabId, String)>>,
        pub fail_create: Cell<bool>,
    }

    impl FakeTabs {
        /// Close a tab without telling the manager
        pub fn close_externally(&self, tab: TabId) {
            self.open.borrow_mut().remove(&tab);
        }

        pub fn open_tabs(&self) -> Vec<TabId> {
            self.open.borrow().iter().copied().collect()
        }
    }

    impl TabApi for FakeTabs {
        async fn create(&self, url: &str) -> Result<TabId, String> {
            if self.fail_create.get() {
                return Err("Cannot create tab".to_string());
            }
            let id = self.next_id.get() + 1;
            self.next_id.set(id);
            self.open.borrow_mut().insert(id);
            self.navigations.borrow_mut().push((id, url.to_string()));
            Ok(id)
        }

        async fn update(&self, tab: TabId, url: &str) -> Result<(), String> {
            if !self.open.borrow().contains(&tab) {
                return Err(format!("No tab with id: {}.", tab));
            }
            self.navigations.borrow_mut().push((tab, url.to_string()));
            Ok(())
        }

        async fn remove(&self, tab: TabId) -> Result<(), String> {
            if self.open.borrow_mut().remove(&tab) {
                Ok(())
            } else {
                Err(format!("No tab with id: {}.", tab))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeTabs;
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_second_open_reuses_tab() {
        let manager = TabManager::new(FakeTabs::default(), None);

        assert_eq!(block_on(manager.open_url("https://a.example")), Ok(OpenAction::CreatedNew));
        let tab = manager.current();
        assert_eq!(block_on(manager.open_url("https://b.example")), Ok(OpenAction::UpdatedExisting));

        assert_eq!(manager.current(), tab);
        assert_eq!(manager.tabs().open_tabs().len(), 1);
        assert_eq!(
            *manager.tabs().navigations.borrow(),
            vec![(1, "https://a.example".to_string()), (1, "https://b.example".to_string())]
        );
    }

    #[test]
    fn test_observed_close_creates_new_then_reuses() {
        let manager = TabManager::new(FakeTabs::default(), None);
        block_on(manager.open_url("https://a.example")).unwrap();

        manager.tabs().close_externally(1);
        manager.tab_removed(1);

        assert_eq!(block_on(manager.open_url("https://b.example")), Ok(OpenAction::CreatedNew));
        assert_eq!(manager.current(), Some(2));
        assert_eq!(block_on(manager.open_url("https://c.example")), Ok(OpenAction::UpdatedExisting));
        assert_eq!(manager.current(), Some(2));
    }

    #[test]
    fn test_unobserved_close_recovers() {
        let manager = TabManager::new(FakeTabs::default(), None);
        block_on(manager.open_url("https://a.example")).unwrap();

        manager.tabs().close_externally(1);

        assert_eq!(
            block_on(manager.open_url("https://b.example")),
            Ok(OpenAction::CreatedNewAfterError)
        );
        assert_eq!(block_on(manager.open_url("https://c.example")), Ok(OpenAction::UpdatedExisting));
        assert_eq!(manager.current(), Some(2));
    }

    #[test]
    fn test_create_failure_is_reported() {
        let tabs = FakeTabs::default();
        tabs.fail_create.set(true);
        let manager = TabManager::new(tabs, None);

        assert_eq!(
            block_on(manager.open_url("https://a.example")),
            Err("Cannot create tab".to_string())
        );
        assert_eq!(manager.current(), None);
    }

    #[test]
    fn test_new_tab_replaces_managed_tab() {
        let manager = TabManager::new(FakeTabs::default(), None);
        block_on(manager.open_url("https://a.example")).unwrap();
        let other = block_on(manager.tabs().create("chrome://newtab")).unwrap();

        block_on(manager.tab_created(other));

        assert_eq!(manager.current(), Some(other));
        assert_eq!(manager.tabs().open_tabs(), vec![other]);
    }

    #[test]
    fn test_creating_own_tab_does_not_close_it() {
        let manager = TabManager::new(FakeTabs::default(), None);
        block_on(manager.open_url("https://a.example")).unwrap();

        // chrome.tabs.onCreated also fires for the tab we just created
        block_on(manager.tab_created(1));

        assert_eq!(manager.current(), Some(1));
        assert_eq!(manager.tabs().open_tabs(), vec![1]);
    }

    #[test]
    fn test_removing_other_tab_is_ignored() {
        let manager = TabManager::new(FakeTabs::default(), Some(5));

        manager.tab_removed(9);

        assert_eq!(manager.current(), Some(5));
    }
}
