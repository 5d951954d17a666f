/// Hover toolbar: the shared panel plus the content-script variant

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::platform::time::sleep;
use yew::prelude::*;

use crate::background::contains_url;
use crate::bridge;
use crate::config::{CONFIG_STORAGE_KEY, ExtensionConfig};
use crate::icon::{IconResolver, IconResolverConfig};
use crate::link::{Link, LinkDraft};
use crate::messages::{self, BackgroundSettings, Request};
use crate::store::SettingKey;
use crate::theme::{ThemeApplier, ThemeSettings};
use crate::toolbar::{HIDE_DELAY_MS, LinkCache, ToolbarController};
use crate::ui::components::{LinkIcon, NotificationKind, NotificationToast, use_notification};

pub const DEFAULT_SEARCH_URL: &str = "https://www.google.com";

/// Visibility of one toolbar and the pointer callbacks that drive it
#[derive(Clone, PartialEq)]
pub struct ToolbarHandle {
    pub visible: bool,
    pub enter: Callback<()>,
    pub leave: Callback<()>,
    /// Hide immediately, e.g. after a link was chosen
    pub close: Callback<()>,
}

#[hook]
pub fn use_toolbar() -> ToolbarHandle {
    let controller = use_mut_ref(ToolbarController::new);
    let force_update = use_force_update();

    let enter = {
        let controller = controller.clone();
        let force_update = force_update.clone();
        Callback::from(move |_: ()| {
            if controller.borrow_mut().pointer_enter() {
                force_update.force_update();
            }
        })
    };

    let leave = {
        let controller = controller.clone();
        let force_update = force_update.clone();
        Callback::from(move |_: ()| {
            let ticket = controller.borrow_mut().pointer_leave(js_sys::Date::now());
            let controller = controller.clone();
            let force_update = force_update.clone();
            spawn_local(async move {
                sleep(Duration::from_millis(HIDE_DELAY_MS as u64)).await;
                if controller.borrow_mut().hide_timer_fired(ticket) {
                    force_update.force_update();
                }
            });
        })
    };

    let close = {
        let controller = controller.clone();
        let force_update = force_update.clone();
        Callback::from(move |_: ()| {
            if controller.borrow_mut().link_activated() {
                force_update.force_update();
            }
        })
    };

    let visible = controller.borrow().is_visible();
    ToolbarHandle {
        visible,
        enter,
        leave,
        close,
    }
}

/// What the links area shows
#[derive(Clone, PartialEq)]
pub enum LinksView {
    Loading,
    Loaded(Vec<Link>),
    Failed(String),
}

#[derive(Properties, PartialEq)]
pub struct ToolbarPanelProps {
    pub handle: ToolbarHandle,
    pub links: LinksView,
    pub on_open: Callback<Link>,
    /// CSS class/id namespace, keeps injected markup apart from the host page
    #[prop_or(AttrValue::Static("toolbar"))]
    pub prefix: AttrValue,
    #[prop_or_default]
    pub style: AttrValue,
    #[prop_or_default]
    pub children: Html,
}

#[function_component(ToolbarPanel)]
pub fn toolbar_panel(props: &ToolbarPanelProps) -> Html {
    let prefix = props.prefix.as_str();
    let resolver = IconResolver::new(IconResolverConfig::TOOLBAR);
    let handle = &props.handle;

    let links = match &props.links {
        LinksView::Loading => html! {
            <div class={format!("{}-status", prefix)}>{"Loading links..."}</div>
        },
        LinksView::Failed(message) => html! {
            <div class={format!("{}-error", prefix)}>{message}</div>
        },
        LinksView::Loaded(links) if links.is_empty() => html! {
            <div class={format!("{}-status", prefix)}>{"No links found"}</div>
        },
        LinksView::Loaded(links) => links
            .iter()
            .map(|link| {
                let markup = resolver.resolve_icon(&link.url, &link.name, None, None);
                let onclick = {
                    let link = link.clone();
                    let close = handle.close.clone();
                    let on_open = props.on_open.clone();
                    Callback::from(move |e: MouseEvent| {
                        e.prevent_default();
                        close.emit(());
                        on_open.emit(link.clone());
                    })
                };
                let key = link.id.map(|id| id.to_string()).unwrap_or_else(|| link.url.clone());

                html! {
                    <a key={key} href={link.url.clone()} class={format!("{}-link", prefix)} title={link.name.clone()} {onclick}>
                        <div class={format!("{}-link-icon", prefix)}>
                            <LinkIcon markup={markup} />
                        </div>
                        <div class={format!("{}-link-title", prefix)}>{&link.name}</div>
                    </a>
                }
            })
            .collect::<Html>(),
    };

    html! {
        <>
            <div
                class={format!("{}-trigger-zone", prefix)}
                onmouseenter={handle.enter.reform(|_: MouseEvent| ())}
            ></div>
            <div
                class={classes!(prefix.to_string(), handle.visible.then_some("show"))}
                style={props.style.clone()}
                onmouseenter={handle.enter.reform(|_: MouseEvent| ())}
                onmouseleave={handle.leave.reform(|_: MouseEvent| ())}
            >
                <div class={format!("{}-content", prefix)}>
                    {props.children.clone()}
                    <div class={format!("{}-divider", prefix)}></div>
                    <div class={format!("{}-links", prefix)}>
                        {links}
                    </div>
                </div>
            </div>
        </>
    }
}

/// Fetch links through the background service unless the cache is fresh
async fn fetch_links(cache: &RefCell<LinkCache>, server_url: &str) -> Result<Vec<Link>, String> {
    let now = js_sys::Date::now();
    if let Some(links) = cache.borrow().get(now) {
        return Ok(links.to_vec());
    }

    let links = messages::send(&Request::FetchLinks {
        server_url: server_url.to_string(),
    })
    .await?
    .into_links()?;

    cache.borrow_mut().store(links.clone(), now);
    Ok(links)
}

/// Open `url` in the managed tab, falling back to in-page navigation
async fn open_url(url: String) {
    let result = messages::send(&Request::OpenUrl { url: url.clone() })
        .await
        .and_then(|response| response.into_opened());

    match result {
        Ok(action) => log::debug!("Opened {} ({:?})", url, action),
        Err(e) => {
            log::error!("Failed to open URL: {}", e);
            if let Some(window) = web_sys::window() {
                let _ = window.location().set_href(&url);
            }
        }
    }
}

async fn search_url(server_url: &str) -> String {
    let response = messages::send(&Request::GetSetting {
        server_url: server_url.to_string(),
        key: SettingKey::SearchEngineUrl,
    })
    .await
    .and_then(|response| response.into_setting());

    match response {
        Ok(Some(url)) if !url.trim().is_empty() => url,
        _ => DEFAULT_SEARCH_URL.to_string(),
    }
}

fn current_page() -> Option<LinkDraft> {
    let window = web_sys::window()?;
    let url = window.location().href().ok()?;
    let title = window
        .document()
        .map(|d| d.title())
        .filter(|t| !t.trim().is_empty())
        .or_else(|| window.location().hostname().ok())
        .unwrap_or_else(|| url.clone());

    Some(LinkDraft::new(&title, &url))
}

/// Toolbar injected into every page by the content script
#[function_component(ContentToolbar)]
pub fn content_toolbar() -> Html {
    let handle = use_toolbar();
    let config = use_state(|| None::<ExtensionConfig>);
    let links = use_state(|| LinksView::Loading);
    let theme_style = use_state(|| ThemeSettings::default().inline_style("--tvbox-"));
    let adding = use_state(|| false);
    let generation = use_state(|| 0u32);
    let cache = use_mut_ref(LinkCache::new);
    let (notification, notify) = use_notification();

    // Rebuild whenever the stored configuration changes
    {
        let generation = generation.clone();
        let cache = cache.clone();
        use_effect_with((), move |_| {
            let changes = Rc::new(Cell::new(0u32));
            let listener = Closure::wrap(Box::new(move || {
                changes.set(changes.get() + 1);
                cache.borrow_mut().invalidate();
                generation.set(changes.get());
            }) as Box<dyn Fn()>);
            bridge::on_storage_changed(CONFIG_STORAGE_KEY, listener.as_ref().unchecked_ref());
            listener.forget();
            || ()
        });
    }

    // Load config, theme and links
    {
        let config = config.clone();
        let links = links.clone();
        let theme_style = theme_style.clone();
        let cache = cache.clone();
        use_effect_with(*generation, move |_| {
            spawn_local(async move {
                let loaded = match bridge::storage_get::<ExtensionConfig>(CONFIG_STORAGE_KEY).await {
                    Ok(stored) => stored.unwrap_or_default(),
                    Err(e) => {
                        log::warn!("Could not load config, using defaults: {}", e);
                        ExtensionConfig::default()
                    }
                };
                config.set(Some(loaded.clone()));
                if !loaded.enabled {
                    return;
                }

                let settings = BackgroundSettings::new(&loaded.server_url);
                let theme = ThemeApplier::new(&settings).load().await;
                theme_style.set(theme.inline_style("--tvbox-"));

                links.set(LinksView::Loading);
                match fetch_links(&cache, &loaded.server_url).await {
                    Ok(fetched) => links.set(LinksView::Loaded(fetched)),
                    Err(e) => {
                        log::error!("Failed to fetch links: {}", e);
                        links.set(LinksView::Failed(format!(
                            "Failed to load links: {}. Check server at {}",
                            e, loaded.server_url
                        )));
                    }
                }
            });
            || ()
        });
    }

    let Some(current_config) = (*config).clone() else {
        return html! {};
    };
    if !current_config.enabled {
        return html! {};
    }
    let server_url = current_config.server_url.clone();

    let on_open = Callback::from(|link: Link| spawn_local(open_url(link.url)));

    let on_home = {
        let close = handle.close.clone();
        let server_url = server_url.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            close.emit(());
            spawn_local(open_url(server_url.clone()));
        })
    };

    let on_search = {
        let close = handle.close.clone();
        let server_url = server_url.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            close.emit(());
            let server_url = server_url.clone();
            spawn_local(async move {
                let url = search_url(&server_url).await;
                open_url(url).await;
            });
        })
    };

    let on_back = {
        let close = handle.close.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
                let _ = history.back();
            }
            close.emit(());
        })
    };

    let on_forward = {
        let close = handle.close.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
                let _ = history.forward();
            }
            close.emit(());
        })
    };

    let on_reload = {
        let cache = cache.clone();
        let close = handle.close.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            close.emit(());
            cache.borrow_mut().invalidate();
            if let Some(window) = web_sys::window() {
                let _ = window.location().reload();
            }
        })
    };

    let on_add = {
        let adding = adding.clone();
        let links = links.clone();
        let cache = cache.clone();
        let notify = notify.clone();
        let server_url = server_url.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            let Some(page) = current_page() else {
                return;
            };
            adding.set(true);

            let adding = adding.clone();
            let links = links.clone();
            let cache = cache.clone();
            let notify = notify.clone();
            let server_url = server_url.clone();
            spawn_local(async move {
                add_website(page, &server_url, &cache, &links, &notify).await;
                adding.set(false);
            });
        })
    };

    html! {
        <>
            <ToolbarPanel
                handle={handle.clone()}
                links={(*links).clone()}
                on_open={on_open}
                prefix="tvbox-toolbar"
                style={AttrValue::from((*theme_style).clone())}
            >
                <button class="tvbox-toolbar-home-btn" title="Go to TV Box" onclick={on_home}>
                    {"TV Box"}
                </button>
                <button class="tvbox-find-website-btn" title="Search The Web" onclick={on_search}>
                    {"Search The Web"}
                </button>
                <button class="tvbox-add-website-btn" disabled={*adding} onclick={on_add}>
                    {if *adding { "Adding..." } else { "Add This Website" }}
                </button>
                <div class="tvbox-toolbar-nav-buttons">
                    <button title="Go Back" onclick={on_back}>{"‹"}</button>
                    <button title="Go Forward" onclick={on_forward}>{"›"}</button>
                    <button title="Reload Page" onclick={on_reload}>{"⟳"}</button>
                </div>
            </ToolbarPanel>
            <NotificationToast notification={notification} class_prefix="tvbox-notification" />
        </>
    }
}

async fn add_website(
    page: LinkDraft,
    server_url: &str,
    cache: &Rc<RefCell<LinkCache>>,
    links: &UseStateHandle<LinksView>,
    notify: &Callback<(NotificationKind, String)>,
) {
    let existing = match fetch_links(cache, server_url).await {
        Ok(existing) => existing,
        Err(e) => {
            notify.emit((NotificationKind::Error, format!("Error: {}", e)));
            return;
        }
    };

    if contains_url(&existing, &page.url) {
        notify.emit((NotificationKind::Info, "Website already exists in your list!".to_string()));
        return;
    }

    let added = messages::send(&Request::AddWebsite {
        server_url: server_url.to_string(),
        website_data: page,
    })
    .await
    .and_then(|response| response.into_link_added());

    match added {
        Ok(link) => {
            log::info!("Added {}", link.url);
            notify.emit((NotificationKind::Success, "Website added successfully!".to_string()));
            cache.borrow_mut().invalidate();
            match fetch_links(cache, server_url).await {
                Ok(fetched) => links.set(LinksView::Loaded(fetched)),
                Err(e) => links.set(LinksView::Failed(format!("Failed to load links: {}", e))),
            }
        }
        Err(e) => {
            notify.emit((NotificationKind::Error, format!("Failed to add website: {}", e)));
        }
    }
}
