/// Start page: link grid, link editor with icon picker, settings, page toolbar

use std::rc::Rc;

use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::error::ApiError;
use crate::grid::{BrowserDialogs, Dialogs, LinkGridController};
use crate::icon::{IconResolver, IconResolverConfig};
use crate::icon_catalog::{IconCatalog, MAX_VISIBLE_ICONS};
use crate::link::{Link, LinkDraft};
use crate::settings::SettingsForm;
use crate::store::HttpStore;
use crate::theme::{BackgroundTheme, ThemeApplier};
use crate::ui::apply_theme;
use crate::ui::components::LinkIcon;
use crate::ui::input_value;
use crate::ui::toolbar::{LinksView, ToolbarPanel, use_toolbar};

/// Colour preselected for a newly picked glyph
pub const DEFAULT_ICON_COLOR: &str = "#6366f1";

#[derive(Clone, PartialEq)]
enum Editor {
    Closed,
    Adding,
    Editing(Link),
}

async fn refresh_theme() {
    let theme = ThemeApplier::new(&HttpStore::same_origin()).load().await;
    apply_theme(&theme);
}

fn links_view(fetched: Result<Vec<Link>, ApiError>) -> LinksView {
    match fetched {
        Ok(links) => LinksView::Loaded(links),
        Err(e) => LinksView::Failed(format!("Failed to load links: {}", e)),
    }
}

fn icon_stylesheet_url() -> Option<String> {
    let document = web_sys::window()?.document()?;
    let link = document
        .query_selector("link[rel='stylesheet'][href*='bootstrap-icons']")
        .ok()??;
    link.get_attribute("href")
}

fn open_in_new_tab(url: &str) {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.open_with_url_and_target(url, "_blank") {
            log::error!("Failed to open {}: {:?}", url, e);
        }
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let grid = use_memo((), |_| LinkGridController::new(HttpStore::same_origin(), BrowserDialogs));
    let links = use_state(|| LinksView::Loading);
    let editor = use_state(|| Editor::Closed);
    let settings_open = use_state(|| false);
    let catalog = use_state(|| Rc::new(IconCatalog::fallback()));
    let toolbar = use_toolbar();

    // Theme, links and icon catalog on mount
    {
        let grid = grid.clone();
        let links = links.clone();
        let catalog = catalog.clone();
        use_effect_with((), move |_| {
            spawn_local(refresh_theme());

            spawn_local(async move {
                links.set(links_view(grid.list().await));
            });

            spawn_local(async move {
                let url = icon_stylesheet_url();
                let loaded = IconCatalog::load(url.as_deref()).await;
                catalog.set(Rc::new(loaded));
            });
            || ()
        });
    }

    let on_submit = {
        let grid = grid.clone();
        let links = links.clone();
        let editor = editor.clone();
        Callback::from(move |draft: LinkDraft| {
            let grid = grid.clone();
            let links = links.clone();
            let editor = editor.clone();
            let editing = match &*editor {
                Editor::Editing(link) => link.id,
                _ => None,
            };

            spawn_local(async move {
                let result = match editing {
                    Some(id) => grid.update(id, &draft).await,
                    None => grid.create(&draft).await,
                };
                // A rejected change keeps the editor open for another try; an
                // accepted one closes it even when the refresh failed
                if let Ok(applied) = result {
                    editor.set(Editor::Closed);
                    links.set(links_view(applied.refreshed));
                }
            });
        })
    };

    let on_delete = {
        let grid = grid.clone();
        let links = links.clone();
        Callback::from(move |id: i64| {
            let grid = grid.clone();
            let links = links.clone();
            spawn_local(async move {
                if let Ok(Some(applied)) = grid.delete(id).await {
                    links.set(links_view(applied.refreshed));
                }
            });
        })
    };

    let on_edit = {
        let editor = editor.clone();
        Callback::from(move |link: Link| editor.set(Editor::Editing(link)))
    };

    let on_add = {
        let editor = editor.clone();
        let close = toolbar.close.clone();
        Callback::from(move |_: MouseEvent| {
            close.emit(());
            editor.set(Editor::Adding);
        })
    };

    let on_close_editor = {
        let editor = editor.clone();
        Callback::from(move |_: ()| editor.set(Editor::Closed))
    };

    let on_open_settings = {
        let settings_open = settings_open.clone();
        let close = toolbar.close.clone();
        Callback::from(move |_: MouseEvent| {
            close.emit(());
            settings_open.set(true);
        })
    };

    let on_close_settings = {
        let settings_open = settings_open.clone();
        Callback::from(move |_: ()| settings_open.set(false))
    };

    let on_settings_saved = {
        let settings_open = settings_open.clone();
        Callback::from(move |_: ()| {
            settings_open.set(false);
            spawn_local(refresh_theme());
        })
    };

    let on_home = {
        let close = toolbar.close.clone();
        Callback::from(move |_: MouseEvent| {
            close.emit(());
            if let Some(window) = web_sys::window() {
                window.scroll_to_with_x_and_y(0.0, 0.0);
            }
        })
    };

    let on_open = Callback::from(|link: Link| open_in_new_tab(&link.url));

    let resolver = IconResolver::new(IconResolverConfig::PAGE);
    let grid_html = match &*links {
        LinksView::Loading => html! {
            <div class="loading-text-center">
                <Spinner />
            </div>
        },
        LinksView::Failed(message) => html! {
            <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                {message.clone()}
            </Alert>
        },
        LinksView::Loaded(items) if items.is_empty() => html! {
            <p class="empty-state">{"No links yet. Add your first one from the toolbar."}</p>
        },
        LinksView::Loaded(items) => html! {
            <div class="links-grid">
                {for items.iter().map(|link| html! {
                    <LinkCard
                        key={link.id.map(|id| id.to_string()).unwrap_or_else(|| link.url.clone())}
                        link={link.clone()}
                        resolver={resolver}
                        on_edit={on_edit.clone()}
                        on_delete={on_delete.clone()}
                    />
                })}
            </div>
        },
    };

    html! {
        <>
            <ToolbarPanel handle={toolbar.clone()} links={(*links).clone()} {on_open}>
                <Button onclick={on_home} variant={ButtonVariant::Secondary}>{"Home"}</Button>
                <Button onclick={on_add}>{"Add Link"}</Button>
                <Button onclick={on_open_settings} variant={ButtonVariant::Secondary}>{"Settings"}</Button>
            </ToolbarPanel>

            <main class="container">
                {grid_html}
            </main>

            {match &*editor {
                Editor::Closed => html! {},
                Editor::Adding => html! {
                    <LinkEditor
                        initial={None::<Link>}
                        catalog={(*catalog).clone()}
                        on_submit={on_submit.clone()}
                        on_cancel={on_close_editor.clone()}
                    />
                },
                Editor::Editing(link) => html! {
                    <LinkEditor
                        initial={Some(link.clone())}
                        catalog={(*catalog).clone()}
                        on_submit={on_submit.clone()}
                        on_cancel={on_close_editor.clone()}
                    />
                },
            }}

            if *settings_open {
                <SettingsModal on_saved={on_settings_saved} on_cancel={on_close_settings} />
            }
        </>
    }
}

#[derive(Properties, PartialEq)]
struct LinkCardProps {
    link: Link,
    resolver: IconResolver,
    on_edit: Callback<Link>,
    on_delete: Callback<i64>,
}

#[function_component(LinkCard)]
fn link_card(props: &LinkCardProps) -> Html {
    let link = &props.link;
    let markup = props.resolver.resolve_icon(
        &link.url,
        &link.name,
        link.custom_icon.as_deref(),
        link.icon_color.as_deref(),
    );

    let on_edit = {
        let link = link.clone();
        props.on_edit.reform(move |e: MouseEvent| {
            e.prevent_default();
            e.stop_propagation();
            link.clone()
        })
    };

    let on_delete = link.id.map(|id| {
        props.on_delete.reform(move |e: MouseEvent| {
            e.prevent_default();
            e.stop_propagation();
            id
        })
    });

    html! {
        <a class="link-card" href={link.url.clone()}>
            <div class="link-icon">
                <LinkIcon markup={markup} />
            </div>
            <div class="link-name">{&link.name}</div>
            <div class="link-actions">
                <button class="link-edit" title="Edit" onclick={on_edit}>{"✏️"}</button>
                if let Some(on_delete) = on_delete {
                    <button class="link-delete" title="Delete" onclick={on_delete}>{"🗑️"}</button>
                }
            </div>
        </a>
    }
}

#[derive(Properties, PartialEq)]
struct LinkEditorProps {
    initial: Option<Link>,
    catalog: Rc<IconCatalog>,
    on_submit: Callback<LinkDraft>,
    on_cancel: Callback<()>,
}

/// Add/edit dialog. The picked glyph and colour live here until submit.
#[function_component(LinkEditor)]
fn link_editor(props: &LinkEditorProps) -> Html {
    let draft = use_state(|| {
        props
            .initial
            .as_ref()
            .map(Link::to_draft)
            .unwrap_or_default()
    });
    let title = if props.initial.is_some() { "Edit Link" } else { "Add Link" };

    let on_name = {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(name) = input_value(&e) {
                draft.set(LinkDraft { name, ..(*draft).clone() });
            }
        })
    };

    let on_url = {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(url) = input_value(&e) {
                draft.set(LinkDraft { url, ..(*draft).clone() });
            }
        })
    };

    let on_icon = {
        let draft = draft.clone();
        Callback::from(move |icon: Option<String>| {
            let icon_color = match (&icon, &draft.icon_color) {
                (Some(_), None) => Some(DEFAULT_ICON_COLOR.to_string()),
                (Some(_), color) => color.clone(),
                (None, _) => None,
            };
            draft.set(LinkDraft {
                custom_icon: icon,
                icon_color,
                ..(*draft).clone()
            });
        })
    };

    let on_color = {
        let draft = draft.clone();
        Callback::from(move |color: String| {
            draft.set(LinkDraft {
                icon_color: Some(color),
                ..(*draft).clone()
            });
        })
    };

    let on_save = {
        let draft = draft.clone();
        props.on_submit.reform(move |_: MouseEvent| (*draft).clone())
    };

    html! {
        <div class="modal-backdrop">
            <div class="modal" role="dialog">
                <h2 class="modal-title">{title}</h2>
                <label class="form-label">
                    {"Name"}
                    <input type="text" class="form-input" value={draft.name.clone()} oninput={on_name} />
                </label>
                <label class="form-label">
                    {"URL"}
                    <input type="url" class="form-input" placeholder="https://" value={draft.url.clone()} oninput={on_url} />
                </label>
                <IconPicker
                    catalog={props.catalog.clone()}
                    selected={draft.custom_icon.clone()}
                    color={draft.icon_color.clone().unwrap_or_else(|| DEFAULT_ICON_COLOR.to_string())}
                    on_select={on_icon}
                    on_color={on_color}
                />
                <div class="modal-actions">
                    <Button onclick={props.on_cancel.reform(|_| ())} variant={ButtonVariant::Secondary}>
                        {"Cancel"}
                    </Button>
                    <Button onclick={on_save}>{"Save"}</Button>
                </div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct IconPickerProps {
    catalog: Rc<IconCatalog>,
    selected: Option<String>,
    color: String,
    on_select: Callback<Option<String>>,
    on_color: Callback<String>,
}

#[function_component(IconPicker)]
fn icon_picker(props: &IconPickerProps) -> Html {
    let search = use_state(String::new);
    let (shown, total) = props.catalog.search(&search);

    let on_search = {
        let search = search.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(term) = input_value(&e) {
                search.set(term);
            }
        })
    };

    let on_color = {
        let on_color = props.on_color.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(color) = input_value(&e) {
                on_color.emit(color);
            }
        })
    };

    html! {
        <div class="icon-picker">
            <div class="icon-picker-header">
                <span class="form-label">{"Custom icon"}</span>
                if props.selected.is_some() {
                    <Button onclick={props.on_select.reform(|_| None)} variant={ButtonVariant::Link}>
                        {"Use website icon"}
                    </Button>
                }
            </div>
            <input
                type="search"
                class="form-input"
                placeholder="Search icons..."
                value={(*search).clone()}
                oninput={on_search}
            />
            <div class="icon-grid">
                {for shown.iter().map(|icon| {
                    let icon = icon.to_string();
                    let selected = props.selected.as_deref() == Some(icon.as_str());
                    let onclick = props.on_select.reform({
                        let icon = icon.clone();
                        move |_: MouseEvent| Some(icon.clone())
                    });
                    html! {
                        <button
                            key={icon.clone()}
                            class={classes!("icon-option", selected.then_some("selected"))}
                            title={icon.clone()}
                            {onclick}
                        >
                            <i class={classes!("bi", icon)}></i>
                        </button>
                    }
                })}
            </div>
            if total > MAX_VISIBLE_ICONS {
                <p class="icon-count">
                    {format!("Showing {} of {} icons. Refine your search to see more.", MAX_VISIBLE_ICONS, total)}
                </p>
            }
            if props.selected.is_some() {
                <label class="form-label">
                    {"Icon color"}
                    <input type="color" value={props.color.clone()} oninput={on_color} />
                </label>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct SettingsModalProps {
    on_saved: Callback<()>,
    on_cancel: Callback<()>,
}

#[function_component(SettingsModal)]
fn settings_modal(props: &SettingsModalProps) -> Html {
    let form = use_state(|| None::<SettingsForm>);
    let saving = use_state(|| false);

    {
        let form = form.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let loaded = SettingsForm::load(&HttpStore::same_origin()).await;
                form.set(Some(loaded));
            });
            || ()
        });
    }

    let Some(current) = (*form).clone() else {
        return html! {
            <div class="modal-backdrop">
                <div class="modal loading-text-center"><Spinner /></div>
            </div>
        };
    };

    // One setter per field, each producing the whole updated form
    let field = |update: fn(&mut SettingsForm, String)| {
        let form = form.clone();
        let current = current.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(value) = input_value(&e) {
                let mut next = current.clone();
                update(&mut next, value);
                form.set(Some(next));
            }
        })
    };

    let on_save = {
        let current = current.clone();
        let saving = saving.clone();
        let on_saved = props.on_saved.clone();
        Callback::from(move |_: MouseEvent| {
            let current = current.clone();
            let saving = saving.clone();
            let on_saved = on_saved.clone();
            saving.set(true);
            spawn_local(async move {
                let result = current.save(&HttpStore::same_origin()).await;
                saving.set(false);
                match result {
                    Ok(()) => on_saved.emit(()),
                    Err(e) => {
                        log::error!("Failed to save settings: {}", e);
                        BrowserDialogs.alert(&format!("Error: {}", e));
                    }
                }
            });
        })
    };

    let on_reset_background = {
        let form = form.clone();
        let current = current.clone();
        Callback::from(move |_: MouseEvent| {
            form.set(Some(SettingsForm {
                background: BackgroundTheme::default(),
                ..current.clone()
            }));
        })
    };

    html! {
        <div class="modal-backdrop">
            <div class="modal" role="dialog">
                <h2 class="modal-title">{"Settings"}</h2>
                <label class="form-label">
                    {"Search engine URL"}
                    <input
                        type="url"
                        class="form-input"
                        value={current.search_engine_url.clone()}
                        oninput={field(|f, v| f.search_engine_url = v)}
                    />
                </label>
                <label class="form-label">
                    {"Accent color"}
                    <input type="color" value={current.accent_color.clone()} oninput={field(|f, v| f.accent_color = v)} />
                </label>
                <fieldset class="form-group">
                    <legend>{"Background"}</legend>
                    <label class="form-label">
                        {"Primary"}
                        <input type="color" value={current.background.primary.clone()} oninput={field(|f, v| f.background.primary = v)} />
                    </label>
                    <label class="form-label">
                        {"Secondary"}
                        <input type="color" value={current.background.secondary.clone()} oninput={field(|f, v| f.background.secondary = v)} />
                    </label>
                    <label class="form-label">
                        {"Card"}
                        <input type="color" value={current.background.card.clone()} oninput={field(|f, v| f.background.card = v)} />
                    </label>
                    <Button onclick={on_reset_background} variant={ButtonVariant::Link}>{"Reset to default"}</Button>
                </fieldset>
                <div class="modal-actions">
                    <Button onclick={props.on_cancel.reform(|_| ())} variant={ButtonVariant::Secondary}>
                        {"Cancel"}
                    </Button>
                    <Button onclick={on_save} disabled={*saving}>
                        {if *saving { "Saving..." } else { "Save" }}
                    </Button>
                </div>
            </div>
        </div>
    }
}
