/// Popup UI: enable toggle, server URL and connection status

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::platform::time::sleep;
use yew::prelude::*;

use crate::config::{DEFAULT_SERVER_URL, ExtensionConfig};
use crate::messages::{self, Request};
use crate::ui::input_value;

const CONNECTION_TEST_DELAY: Duration = Duration::from_millis(500);
const STATUS_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Clone, PartialEq)]
enum Status {
    Checking,
    Connected(String),
    Disconnected(String),
    Disabled,
}

async fn load_config() -> Result<ExtensionConfig, String> {
    messages::send(&Request::GetConfig).await?.into_config()
}

async fn save_config(config: &ExtensionConfig) -> Result<(), String> {
    messages::send(&Request::SetConfig {
        config: config.clone(),
    })
    .await?
    .into_saved()
}

async fn check_connection(config: &ExtensionConfig) -> Status {
    if !config.enabled {
        return Status::Disabled;
    }

    let health = messages::send(&Request::TestConnection {
        server_url: config.server_url.clone(),
    })
    .await
    .and_then(|response| response.into_health());

    match health {
        Ok(health) => Status::Connected(health.version),
        Err(e) => {
            log::warn!("Connection test failed: {}", e);
            Status::Disconnected(e)
        }
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let config = use_state(|| None::<ExtensionConfig>);
    let url_input = use_state(String::new);
    let status = use_state(|| Status::Checking);
    let error = use_state(|| None::<String>);
    let saved = use_state(|| false);

    // Load config, then keep the status fresh while the popup is open
    {
        let config = config.clone();
        let url_input = url_input.clone();
        let status = status.clone();
        let error = error.clone();
        use_effect_with((), move |_| {
            let alive = Rc::new(Cell::new(true));
            {
                let alive = alive.clone();
                spawn_local(async move {
                    let mut current = match load_config().await {
                        Ok(loaded) => loaded,
                        Err(e) => {
                            log::error!("Failed to load config: {}", e);
                            error.set(Some(format!("Failed to load settings: {}", e)));
                            ExtensionConfig::default()
                        }
                    };
                    url_input.set(current.server_url.clone());
                    config.set(Some(current.clone()));

                    while alive.get() {
                        status.set(check_connection(&current).await);
                        sleep(STATUS_REFRESH_INTERVAL).await;
                        if let Ok(latest) = load_config().await {
                            current = latest;
                        }
                    }
                });
            }
            move || alive.set(false)
        });
    }

    let apply = {
        let config = config.clone();
        let status = status.clone();
        let error = error.clone();
        let saved = saved.clone();
        Callback::from(move |next: ExtensionConfig| {
            let config = config.clone();
            let status = status.clone();
            let error = error.clone();
            let saved = saved.clone();
            spawn_local(async move {
                if let Err(e) = save_config(&next).await {
                    log::error!("Failed to save config: {}", e);
                    error.set(Some(format!("Failed to save settings: {}", e)));
                    return;
                }
                log::info!("Saved config (enabled: {})", next.enabled);
                error.set(None);
                saved.set(true);
                config.set(Some(next.clone()));

                status.set(Status::Checking);
                sleep(CONNECTION_TEST_DELAY).await;
                status.set(check_connection(&next).await);
            });
        })
    };

    let Some(current) = (*config).clone() else {
        return html! {
            <div class="padding-20 loading-text-center">
                <Spinner />
            </div>
        };
    };

    let on_toggle = {
        let apply = apply.clone();
        let current = current.clone();
        Callback::from(move |_: MouseEvent| apply.emit(current.toggled()))
    };

    let submit_url = {
        let apply = apply.clone();
        let error = error.clone();
        let url_input = url_input.clone();
        let enabled = current.enabled;
        Callback::from(move |_: ()| match ExtensionConfig::from_input(enabled, &url_input) {
            Ok(next) => {
                url_input.set(next.server_url.clone());
                apply.emit(next);
            }
            Err(e) => error.set(Some(e)),
        })
    };

    let on_url = {
        let url_input = url_input.clone();
        let saved = saved.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(value) = input_value(&e) {
                saved.set(false);
                url_input.set(value);
            }
        })
    };

    let on_keydown = {
        let submit_url = submit_url.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                submit_url.emit(());
            }
        })
    };

    let status_html = match &*status {
        Status::Checking => html! {
            <div class="status status-checking"><Spinner />{" Checking connection..."}</div>
        },
        Status::Connected(version) => html! {
            <div class="status status-connected">{format!("Connected to TV Box v{}", version)}</div>
        },
        Status::Disconnected(e) => html! {
            <div class="status status-disconnected">{format!("Connection failed: {}", e)}</div>
        },
        Status::Disabled => html! {
            <div class="status status-disabled">{"Toolbar disabled"}</div>
        },
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"TV Box Toolbar"}</h1>

            if let Some(message) = (*error).clone() {
                <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                    {message}
                </Alert>
            }

            <div class="flex-column-gap">
                <Button
                    onclick={on_toggle}
                    variant={if current.enabled { ButtonVariant::Primary } else { ButtonVariant::Secondary }}
                    block={true}
                >
                    {if current.enabled { "Toolbar enabled" } else { "Toolbar disabled" }}
                </Button>

                <label class="form-label">
                    {"Server URL"}
                    <input
                        type="url"
                        class="form-input"
                        placeholder={DEFAULT_SERVER_URL}
                        value={(*url_input).clone()}
                        oninput={on_url}
                        onkeydown={on_keydown}
                    />
                </label>
                <Button onclick={submit_url.reform(|_| ())} variant={ButtonVariant::Secondary} block={true}>
                    {"Save"}
                </Button>
                if *saved {
                    <p class="message-text">{"Settings saved"}</p>
                }
            </div>

            {status_html}

            <p class="footer-popup">
                {"TV Box Toolbar v0.1.0"}
            </p>
        </div>
    }
}
