use dioxus::prelude::*;

use ui::views::ShellLayoutView;
use ui::NavItem;

use crate::Route;

#[component]
pub fn Shell() -> Element {
    let nav = use_navigator();
    let route = use_route::<Route>();
    let active = route.nav_item();

    rsx! {
        ShellLayoutView {
            active: Some(active),
            on_navigate: move |item: NavItem| {
                let target = Route::from(item);
                if target != route {
                    nav.push(target);
                }
            },
            Outlet::<Route> {}
        }
    }
}
