/// Reusable UI components

use std::time::Duration;

use yew::platform::time::sleep;
use yew::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::icon::{ChainPosition, IconMarkup};

pub const NOTIFICATION_DURATION: Duration = Duration::from_secs(3);

/// Link glyph shown when no image source is usable
#[function_component(PlaceholderGlyph)]
pub fn placeholder_glyph() -> Html {
    html! {
        <svg class="icon-placeholder" viewBox="0 0 20 20">
            <path
                fill-rule="evenodd"
                clip-rule="evenodd"
                d="M12.586 4.586a2 2 0 112.828 2.828l-3 3a2 2 0 01-2.828 0 1 1 0 00-1.414 1.414 4 4 0 005.656 0l3-3a4 4 0 00-5.656-5.656l-1.5 1.5a1 1 0 101.414 1.414l1.5-1.5zm-5 5a2 2 0 012.828 0 1 1 0 101.414-1.414 4 4 0 00-5.656 0l-3 3a4 4 0 105.656 5.656l1.5-1.5a1 1 0 10-1.414-1.414l-1.5 1.5a2 2 0 11-2.828-2.828l3-3z"
            />
        </svg>
    }
}

#[derive(Properties, PartialEq)]
pub struct LinkIconProps {
    pub markup: IconMarkup,
}

/// Renders resolved icon markup. Each image load error moves one step down
/// the fallback chain; an exhausted chain swaps the image for the glyph.
#[function_component(LinkIcon)]
pub fn link_icon(props: &LinkIconProps) -> Html {
    let position = use_state(|| ChainPosition::new(props.markup.clone()));
    let attempt = position.attempt_for(&props.markup);

    match &props.markup {
        IconMarkup::Glyph { class, color } => html! {
            <i class={classes!("bi", class.clone())} style={format!("color: {};", color)}></i>
        },
        IconMarkup::Placeholder => html! { <PlaceholderGlyph /> },
        IconMarkup::Image { chain, alt } => match chain.candidate(attempt) {
            Some(src) => {
                let onerror = {
                    let position = position.clone();
                    let markup = props.markup.clone();
                    let host = chain.host().to_string();
                    Callback::from(move |_: Event| {
                        log::debug!("Icon source {} failed for {}", attempt, host);
                        position.set(position.advanced(&markup));
                    })
                };
                html! {
                    <img class="icon-image" src={src} alt={alt.clone()} onerror={onerror} />
                }
            }
            None => html! { <PlaceholderGlyph /> },
        },
    }
}

#[derive(Clone, Copy, PartialEq)]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

impl NotificationKind {
    fn class(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct Notification {
    pub id: u32,
    pub kind: NotificationKind,
    pub message: String,
}

/// Current toast plus a callback that shows a new one for three seconds
#[hook]
pub fn use_notification() -> (Option<Notification>, Callback<(NotificationKind, String)>) {
    let current = use_state(|| None::<Notification>);
    let counter = use_mut_ref(|| 0u32);

    let notify = {
        let current = current.clone();
        Callback::from(move |(kind, message): (NotificationKind, String)| {
            let id = {
                let mut counter = counter.borrow_mut();
                *counter += 1;
                *counter
            };
            current.set(Some(Notification { id, kind, message }));

            let current = current.clone();
            let counter = counter.clone();
            spawn_local(async move {
                sleep(NOTIFICATION_DURATION).await;
                // Only clear our own toast, a newer one may have replaced it
                if *counter.borrow() == id {
                    current.set(None);
                }
            });
        })
    };

    ((*current).clone(), notify)
}

#[derive(Properties, PartialEq)]
pub struct NotificationToastProps {
    pub notification: Option<Notification>,
    #[prop_or(AttrValue::Static("notification"))]
    pub class_prefix: AttrValue,
}

#[function_component(NotificationToast)]
pub fn notification_toast(props: &NotificationToastProps) -> Html {
    match &props.notification {
        Some(notification) => html! {
            <div class={classes!(
                props.class_prefix.to_string(),
                format!("{}-{}", props.class_prefix, notification.kind.class())
            )}>
                {&notification.message}
            </div>
        },
        None => html! {},
    }
}
