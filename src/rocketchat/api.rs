//! Type definitions and helpers for the Rocket.Chat REST API.

use serde::Deserialize;
use std::fmt;

/// All endpoints we use live under this prefix.
pub const API_PREFIX: &str = "/api/v1";

/// The authenticated context every call after login is made with.
///
/// There's no expiry handling; a run is assumed to fit inside the token's
/// lifetime.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub auth_token: String,
    pub user_id: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("auth_token", &"..")
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// A client bound to one Rocket.Chat instance.
pub struct RocketChatClient {
    base: String,
    http: reqwest::Client,
}

impl RocketChatClient {
    /// `base` is the instance root, e.g. `https://chat.example.com`. A
    /// trailing slash is ignored.
    pub fn new(base: &str) -> Self {
        RocketChatClient {
            base: base.trim_end_matches('/').to_owned(),
            http: reqwest::Client::new(),
        }
    }

    pub fn endpoint(path: &str) -> String {
        format!("{}{}", API_PREFIX, path)
    }

    /// Create an unauthenticated POST request, only useful for logging in.
    pub fn post_anonymous(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.post(self.base.to_owned() + &Self::endpoint(path))
    }

    /// Create a POST request to any endpoint, handling authentication.
    pub fn post(&self, path: &str, session: &Session) -> reqwest::RequestBuilder {
        self.post_anonymous(path)
            .header("X-Auth-Token", &session.auth_token)
            .header("X-User-Id", &session.user_id)
    }
}
