//! Manage custom emoji on a Rocket.Chat instance via its REST API.
//!
//! Every call apart from [api::RocketChatClient::login] needs the
//! [api::Session] that login hands back.

pub mod api;
pub mod auth;
pub mod emoji;
