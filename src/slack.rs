//! Read-only access to a Slack workspace's custom emoji.
//!
//! See [emoji::EmojiCatalogEntry].

pub mod api;
pub mod auth;
pub mod emoji;
