use crate::utils::*;
use serde::{Deserialize, Serialize};
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    const fn scheme(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub sound_enabled: bool,
    pub notifications_enabled: bool,
    /// `None` follows the browser's color scheme.
    pub theme: Option<Theme>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            notifications_enabled: false,
            theme: None,
        }
    }
}

impl Settings {
    /// Mirrors the theme choice onto `<html data-theme>`.
    pub(crate) fn apply_theme(&self) {
        const ATTR: &str = "data-theme";

        let html = gloo::utils::document_element();
        let result = match self.theme {
            Some(theme) => {
                log::debug!("theme-scheme: {}", theme.scheme());
                html.set_attribute(ATTR, theme.scheme())
            }
            None => html.remove_attribute(ATTR),
        };
        if let Err(err) = result {
            log::error!("failed to set theme: {:?}", err);
        }
    }
}

impl StorageKey for Settings {
    const KEY: &'static str = "seqmaster:settings";
}

#[derive(Properties, PartialEq)]
pub(crate) struct SettingsProps {
    #[prop_or_default]
    pub open: bool,
    pub settings: Settings,
    pub on_change: Callback<Settings>,
    pub on_close: Callback<()>,
}

#[function_component]
pub(crate) fn SettingsView(props: &SettingsProps) -> Html {
    let settings = props.settings;

    let on_sound = {
        let on_change = props.on_change.clone();
        Callback::from(move |e: Event| {
            let sound_enabled = e.target_unchecked_into::<HtmlInputElement>().checked();
            on_change.emit(Settings {
                sound_enabled,
                ..settings
            });
        })
    };

    let on_notifications = {
        let on_change = props.on_change.clone();
        Callback::from(move |e: Event| {
            let notifications_enabled = e.target_unchecked_into::<HtmlInputElement>().checked();
            on_change.emit(Settings {
                notifications_enabled,
                ..settings
            });
        })
    };

    let current_theme = settings.theme.unwrap_or_default();
    let on_theme = {
        let on_change = props.on_change.clone();
        let theme = Some(current_theme.toggled());
        Callback::from(move |_: MouseEvent| on_change.emit(Settings { theme, ..settings }))
    };
    let on_close = props.on_close.reform(|_: MouseEvent| ());

    html! {
        <dialog id="settings" open={props.open}>
            <article>
                <h2>{"Settings"}</h2>
                <label>
                    <input type="checkbox" role="switch" checked={settings.sound_enabled} onchange={on_sound}/>
                    {"Sound effects"}
                </label>
                <label>
                    <input type="checkbox" role="switch" checked={settings.notifications_enabled} onchange={on_notifications}/>
                    {"Notifications"}
                </label>
                <button class="secondary" onclick={on_theme}>
                    { match current_theme {
                        Theme::Light => "🌙 Dark theme",
                        Theme::Dark => "☀️ Light theme",
                    } }
                </button>
                <footer>
                    <button onclick={on_close}>{"Close"}</button>
                </footer>
            </article>
        </dialog>
    }
}
