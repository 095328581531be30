//! Exchange a username and password for a [Session].
//!
//! <https://developer.rocket.chat/reference/api/rest-api/endpoints/other-important-endpoints/authentication-endpoints/login>

use super::api::*;
use crate::error::Failure;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A newtype wrapper around the login password.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(pub String);

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password(..)")
    }
}

/// Login form fields.
#[derive(Serialize)]
struct LoginRequest<'a> {
    user: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    data: Session,
}

impl RocketChatClient {
    /// Log in. Any non-2xx answer is an [Failure::Authentication], which ends
    /// the run.
    pub async fn login(&self, user: &str, password: &Password) -> Result<Session, Failure> {
        let res = self
            .post_anonymous("/login")
            .form(&LoginRequest {
                user,
                password: &password.0,
            })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(Failure::Authentication { status, body });
        }

        let res: LoginResponse = res.json().await?;
        Ok(res.data)
    }
}
