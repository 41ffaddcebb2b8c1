//! Left-hand navigation.

use dioxus::prelude::*;
use store::Identity;

use crate::auth::{use_session, LogoutButton};
use crate::icons::{FaCirclePlus, FaCircleUser, FaCompass, FaHouse};
use crate::Icon;

/// A destination in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Home,
    Upload,
    Explore,
    Profile,
}

impl NavItem {
    pub const ALL: [NavItem; 4] = [NavItem::Home, NavItem::Upload, NavItem::Explore, NavItem::Profile];

    pub fn label(self) -> &'static str {
        match self {
            NavItem::Home => "Home",
            NavItem::Upload => "Upload",
            NavItem::Explore => "Explore",
            NavItem::Profile => "Profile",
        }
    }

    /// Upload and Profile only make sense for a user with a display name.
    pub fn visible_for(self, identity: Option<&Identity>) -> bool {
        match self {
            NavItem::Home | NavItem::Explore => true,
            NavItem::Upload | NavItem::Profile => identity.is_some_and(Identity::can_post),
        }
    }
}

fn nav_icon(item: NavItem) -> Element {
    match item {
        NavItem::Home => rsx! { Icon { icon: FaHouse, width: 18, height: 18 } },
        NavItem::Upload => rsx! { Icon { icon: FaCirclePlus, width: 18, height: 18 } },
        NavItem::Explore => rsx! { Icon { icon: FaCompass, width: 18, height: 18 } },
        NavItem::Profile => rsx! { Icon { icon: FaCircleUser, width: 18, height: 18 } },
    }
}

#[component]
pub fn AppSidebar(active: Option<NavItem>, on_navigate: EventHandler<NavItem>) -> Element {
    let session = use_session();
    let identity = session().identity;
    let items: Vec<NavItem> = NavItem::ALL
        .into_iter()
        .filter(|item| item.visible_for(identity.as_ref()))
        .collect();

    rsx! {
        nav {
            class: "sidebar",
            ul {
                class: "sidebar-menu",
                for item in items {
                    li {
                        key: "{item.label()}",
                        button {
                            class: if active == Some(item) { "sidebar-item active" } else { "sidebar-item" },
                            onclick: move |_| on_navigate.call(item),
                            {nav_icon(item)}
                            span { "{item.label()}" }
                        }
                    }
                }
            }

            if let Some(user) = identity {
                div {
                    class: "sidebar-account",
                    span { class: "avatar", "{initial(user.label())}" }
                    span { class: "sidebar-account-name", "{user.label()}" }
                    LogoutButton { class: "sidebar-item" }
                }
            }
        }
    }
}

/// First character of `name`, uppercased, for avatar bubbles.
pub fn initial(name: &str) -> String {
    name.chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "?".to_string())
}
