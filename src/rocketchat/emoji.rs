//! List, create and update custom emoji.
//!
//! <https://developer.rocket.chat/reference/api/rest-api/endpoints/content-management/custom-emoji-endpoints>

use super::api::*;
use crate::{
    error::{check_status, Failure, Service},
    image::ImageBuffer,
};
use reqwest::{multipart::Form, StatusCode};
use serde::Deserialize;
use serde_with::{serde_as, DefaultOnNull};
use std::collections::HashMap;
use tracing::debug;

/// A custom emoji as Rocket.Chat already knows it.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExistingEmojiRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Maps emoji names to what's already on the server. Built once, before any
/// upload decisions are made.
pub type ExistingEmoji = HashMap<String, ExistingEmojiRecord>;

/// Older servers answer with a bare array; current ones wrap the records in a
/// sync-style envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse {
    Bare(Vec<ExistingEmojiRecord>),
    Wrapped { emojis: ListDelta },
}

#[derive(Deserialize)]
struct ListDelta {
    update: Vec<ExistingEmojiRecord>,
}

/// Which endpoint an upload goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget<'a> {
    Create,
    /// Replace the image of the record with this ID.
    Update { id: &'a str },
}

impl UploadTarget<'_> {
    fn path(&self) -> &'static str {
        match self {
            UploadTarget::Create => "/emoji-custom.create",
            UploadTarget::Update { .. } => "/emoji-custom.update",
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            UploadTarget::Create => "create",
            UploadTarget::Update { .. } => "update",
        }
    }
}

/// What Rocket.Chat made of an upload we didn't treat as fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// A 2xx answer, carrying the body's `success` flag.
    Completed(bool),
    /// HTTP 400, most likely because the emoji already exists.
    BadRequest,
}

#[derive(Deserialize)]
struct UploadResponse {
    success: bool,
}

impl RocketChatClient {
    /// Get every custom emoji on the server, keyed by name.
    pub async fn list_emoji(&self, session: &Session) -> Result<ExistingEmoji, Failure> {
        let path = "/emoji-custom.list";
        let res = self.post(path, session).send().await?;
        let res: ListResponse = check_status(Service::RocketChat, &Self::endpoint(path), res)
            .await?
            .json()
            .await?;

        let records = match res {
            ListResponse::Bare(records) => records,
            ListResponse::Wrapped { emojis } => emojis.update,
        };

        Ok(records
            .into_iter()
            .map(|record| (record.name.clone(), record))
            .collect())
    }

    /// Submit an image under `name` as a multipart upload.
    ///
    /// A 400 is handed back as [UploadOutcome::BadRequest]; any other non-2xx
    /// answer is a [Failure::RemoteService].
    pub async fn upload_emoji(
        &self,
        session: &Session,
        name: &str,
        target: UploadTarget<'_>,
        image: &mut ImageBuffer,
    ) -> Result<UploadOutcome, Failure> {
        let form = Form::new().text("name", name.to_owned());
        let form = match target {
            UploadTarget::Create => form,
            UploadTarget::Update { id } => form.text("_id", id.to_owned()),
        };
        let form = form.part("emoji", image.to_part()?);

        let path = target.path();
        let res = self.post(path, session).multipart(form).send().await?;

        if res.status() == StatusCode::BAD_REQUEST {
            debug!("{} rejected :{}:: {}", path, name, res.text().await?);
            return Ok(UploadOutcome::BadRequest);
        }

        let res = check_status(Service::RocketChat, &Self::endpoint(path), res).await?;
        let status = res.status();
        let body = res.text().await?;
        debug!("{} answered {} for :{}:: {}", path, status, name, body);

        let res: UploadResponse = serde_json::from_str(&body).map_err(|e| {
            Failure::RemoteService {
                service: Service::RocketChat,
                endpoint: Self::endpoint(path),
                status,
                body: format!("unreadable response ({}): {}", e, body),
            }
        })?;

        Ok(UploadOutcome::Completed(res.success))
    }
}
