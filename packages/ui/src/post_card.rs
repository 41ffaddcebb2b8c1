//! Post rendering: the single-column feed and the explore grid.

use dioxus::prelude::*;
use store::PostRecord;

use crate::sidebar::initial;

/// `Mar 1, 2024` style date, or nothing while the server time is pending.
pub fn posted_on(post: &PostRecord) -> Option<String> {
    post.timestamp.map(|ts| ts.format("%b %-d, %Y").to_string())
}

#[component]
pub fn PostCard(post: PostRecord) -> Element {
    let date = posted_on(&post);

    rsx! {
        article {
            class: "post-card",
            header {
                class: "post-card-header",
                span { class: "avatar", "{initial(&post.username)}" }
                span { class: "post-card-author", "{post.username}" }
            }
            img {
                class: "post-card-image",
                src: "{post.image_url}",
                alt: "{post.caption}",
                loading: "lazy",
            }
            div {
                class: "post-card-body",
                p {
                    strong { "{post.username}" }
                    " {post.caption}"
                }
                if let Some(date) = date {
                    time { class: "muted", "{date}" }
                }
            }
        }
    }
}

/// Posts in the order given, newest first for the feed.
#[component]
pub fn PostList(posts: Vec<PostRecord>, #[props(default)] empty_message: Option<String>) -> Element {
    if posts.is_empty() {
        let message = empty_message.unwrap_or_else(|| "No posts yet.".to_string());
        return rsx! {
            div { class: "empty-state", p { "{message}" } }
        };
    }

    rsx! {
        div {
            class: "post-list",
            for post in posts {
                PostCard { key: "{post.id}", post: post.clone() }
            }
        }
    }
}

/// Square thumbnails of every post, for browsing.
#[component]
pub fn ExploreGrid(posts: Vec<PostRecord>) -> Element {
    rsx! {
        div {
            class: "explore-grid",
            for post in posts {
                figure {
                    key: "{post.id}",
                    class: "explore-tile",
                    title: "{post.username}: {post.caption}",
                    img { src: "{post.image_url}", alt: "{post.caption}", loading: "lazy" }
                }
            }
        }
    }
}
