//! Light/dark theme, persisted in `localStorage` on the web.

use dioxus::prelude::*;

use crate::icons::{FaMoon, FaSun};
use crate::Icon;

const STORAGE_KEY: &str = "snapfeed-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

pub type ThemeSignal = Signal<Theme>;

/// Read the saved theme. Anything unreadable means the default.
pub fn load_theme() -> Theme {
    #[cfg(target_arch = "wasm32")]
    {
        let saved = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|s| s.get_item(STORAGE_KEY).ok().flatten());
        if let Some(theme) = saved.as_deref().and_then(Theme::parse) {
            return theme;
        }
    }
    Theme::default()
}

/// Persist `theme` and set `data-theme` on the document root.
pub fn apply_theme(theme: Theme) {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Ok(Some(storage)) = window.local_storage() {
            let _ = storage.set_item(STORAGE_KEY, theme.as_str());
        }
        if let Some(root) = window.document().and_then(|d| d.document_element()) {
            let _ = root.set_attribute("data-theme", theme.as_str());
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        tracing::debug!(theme = theme.as_str(), key = STORAGE_KEY, "theme applied");
    }
}

pub fn use_theme() -> ThemeSignal {
    use_context::<ThemeSignal>()
}

#[component]
pub fn ThemeProvider(children: Element) -> Element {
    let theme: ThemeSignal = use_context_provider(|| Signal::new(load_theme()));
    use_effect(move || apply_theme(theme()));

    rsx! {
        {children}
    }
}

#[component]
pub fn ThemeToggle() -> Element {
    let mut theme = use_theme();
    let title = match theme() {
        Theme::Light => "Switch to dark mode",
        Theme::Dark => "Switch to light mode",
    };

    rsx! {
        button {
            class: "icon-button",
            title: title,
            onclick: move |_| {
                let next = theme().toggled();
                theme.set(next);
            },
            if theme() == Theme::Light {
                Icon { icon: FaMoon, width: 16, height: 16 }
            } else {
                Icon { icon: FaSun, width: 16, height: 16 }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_and_parse() {
        assert_eq!(Theme::default(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
        assert_eq!(Theme::parse(Theme::Dark.as_str()), Some(Theme::Dark));
        assert_eq!(Theme::parse("sepia"), None);
    }
}
