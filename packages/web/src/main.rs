use dioxus::prelude::*;

use ui::NavItem;
use views::{Explore, Home, Profile, Shell, Upload};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(Shell)]
        #[route("/")]
        Home {},
        #[route("/upload")]
        Upload {},
        #[route("/explore")]
        Explore {},
        #[route("/profile")]
        Profile {},
}

impl Route {
    fn nav_item(&self) -> NavItem {
        match self {
            Route::Home {} => NavItem::Home,
            Route::Upload {} => NavItem::Upload,
            Route::Explore {} => NavItem::Explore,
            Route::Profile {} => NavItem::Profile,
        }
    }
}

impl From<NavItem> for Route {
    fn from(item: NavItem) -> Self {
        match item {
            NavItem::Home => Route::Home {},
            NavItem::Upload => Route::Upload {},
            NavItem::Explore => Route::Explore {},
            NavItem::Profile => Route::Profile {},
        }
    }
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        use tracing_subscriber::EnvFilter;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,store=debug,api=debug")),
            )
            .try_init();
    }

    tracing::info!(config = store::SnapfeedConfig::filename(), "starting snapfeed");
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        document::Link { rel: "stylesheet", href: ui::SNAPFEED_CSS }

        ui::ThemeProvider {
            ui::BackendProvider {
                Router::<Route> {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nav_items_round_trip_through_routes() {
        for item in NavItem::ALL {
            assert_eq!(Route::from(item).nav_item(), item);
        }
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Home {}.to_string(), "/");
        assert_eq!(Route::Upload {}.to_string(), "/upload");
        assert_eq!(Route::Profile {}.to_string(), "/profile");
    }
}
