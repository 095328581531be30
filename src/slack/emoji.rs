//! Fetch the workspace's custom emoji catalog.
//!
//! <https://api.slack.com/methods/emoji.list>

use super::{api::*, auth::SlackAccessToken};
use crate::error::{check_status, Failure, Service};
use serde::Deserialize;
use std::collections::BTreeMap;
use url::Url;

/// Only sources with this prefix are images we can transfer.
const IMAGE_SCHEME_PREFIX: &str = "https://";

/// Slack marks an emoji that points at another emoji with this prefix.
const ALIAS_PREFIX: &str = "alias:";

/// What a catalog entry refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmojiSource {
    /// A custom uploaded image.
    Image(Url),
    /// Looks like an image URL but doesn't parse as one. Still uploadable in
    /// principle, so it counts as a failed upload rather than a skip.
    Malformed { raw: String, reason: String },
    /// Another emoji's name, e.g. `alias:thumbsup` becomes `thumbsup`.
    Alias(String),
    /// Anything else Slack hands back, kept verbatim.
    Unsupported(String),
}

impl EmojiSource {
    pub fn classify(raw: &str) -> Self {
        if raw.starts_with(IMAGE_SCHEME_PREFIX) {
            return match Url::parse(raw) {
                Ok(url) => EmojiSource::Image(url),
                Err(e) => EmojiSource::Malformed {
                    raw: raw.to_owned(),
                    reason: e.to_string(),
                },
            };
        }

        match raw.strip_prefix(ALIAS_PREFIX) {
            Some(target) => EmojiSource::Alias(target.to_owned()),
            None => EmojiSource::Unsupported(raw.to_owned()),
        }
    }
}

/// One `name => source` pair from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiCatalogEntry {
    pub name: String,
    pub source: EmojiSource,
}

/// <https://api.slack.com/methods/emoji.list#examples>
///
/// The `ok` flag isn't required here; the error variant of [APIResult] is the
/// one that insists on it.
#[derive(Deserialize)]
struct ListResponse {
    emoji: BTreeMap<String, String>,
}

impl SlackClient {
    /// Get every custom emoji in the workspace, ordered by name.
    ///
    /// Slack returns the whole catalog in one response; no pagination is
    /// attempted.
    pub async fn list_emoji(
        &self,
        token: &SlackAccessToken,
    ) -> Result<Vec<EmojiCatalogEntry>, Failure> {
        let endpoint = "/emoji.list";
        let res = self.get(endpoint, token).send().await?;
        let res: APIResult<ListResponse> = check_status(Service::Slack, endpoint, res)
            .await?
            .json()
            .await?;

        match res {
            APIResult::Ok(res) => Ok(res
                .emoji
                .into_iter()
                .map(|(name, raw)| EmojiCatalogEntry {
                    source: EmojiSource::classify(&raw),
                    name,
                })
                .collect()),
            APIResult::Err(res) => Err(Failure::SlackApi(res.error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;
    use reqwest::StatusCode;

    #[test]
    fn test_classify() {
        assert_eq!(
            EmojiSource::classify("https://emoji.slack-edge.com/T0/partyparrot/abc.gif"),
            EmojiSource::Image(
                Url::parse("https://emoji.slack-edge.com/T0/partyparrot/abc.gif").unwrap()
            )
        );
        assert_eq!(
            EmojiSource::classify("alias:thumbsup"),
            EmojiSource::Alias("thumbsup".into())
        );
        assert_eq!(
            EmojiSource::classify("http://insecure.example.com/a.png"),
            EmojiSource::Unsupported("http://insecure.example.com/a.png".into())
        );
        assert!(matches!(
            EmojiSource::classify("https://exa mple.com/p.gif"),
            EmojiSource::Malformed { ref raw, .. } if raw == "https://exa mple.com/p.gif"
        ));
        assert!(matches!(
            EmojiSource::classify("https://"),
            EmojiSource::Malformed { .. }
        ));
    }

    quickcheck! {
        fn prop_non_https_is_never_an_image(raw: String) -> bool {
            raw.starts_with(IMAGE_SCHEME_PREFIX)
                || !matches!(EmojiSource::classify(&raw), EmojiSource::Image(_))
        }

        fn prop_https_is_never_skipped(rest: String) -> bool {
            matches!(
                EmojiSource::classify(&format!("{}{}", IMAGE_SCHEME_PREFIX, rest)),
                EmojiSource::Image(_) | EmojiSource::Malformed { .. }
            )
        }
    }

    async fn server() -> mockito::ServerGuard {
        mockito::Server::new_async().await
    }

    #[tokio::test]
    async fn test_list_emoji() {
        let list_res = r#"{
            "ok": true,
            "emoji": {
                "thumbsup": "alias:thumbsup",
                "partyparrot": "https://example.com/p.gif"
            }
        }"#;

        let mut srv = server().await;

        let list_mock = srv
            .mock("GET", "/emoji.list")
            .match_header("authorization", "Bearer xoxb-foo")
            .with_body(list_res)
            .create_async()
            .await;

        let client = SlackClient::new(srv.url());
        let entries = client
            .list_emoji(&SlackAccessToken("xoxb-foo".into()))
            .await
            .unwrap();

        list_mock.assert_async().await;

        assert_eq!(
            entries,
            vec![
                EmojiCatalogEntry {
                    name: "partyparrot".into(),
                    source: EmojiSource::Image(Url::parse("https://example.com/p.gif").unwrap()),
                },
                EmojiCatalogEntry {
                    name: "thumbsup".into(),
                    source: EmojiSource::Alias("thumbsup".into()),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_list_emoji_without_ok_flag() {
        let mut srv = server().await;

        let list_mock = srv
            .mock("GET", "/emoji.list")
            .with_body(r#"{"emoji": {}}"#)
            .create_async()
            .await;

        let entries = SlackClient::new(srv.url())
            .list_emoji(&SlackAccessToken("xoxb-foo".into()))
            .await
            .unwrap();

        list_mock.assert_async().await;
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_list_emoji_bad_auth() {
        let list_res = r#"{
            "ok": false,
            "error": "invalid_auth"
        }"#;

        let mut srv = server().await;

        let list_mock = srv
            .mock("GET", "/emoji.list")
            .with_body(list_res)
            .create_async()
            .await;

        let res = SlackClient::new(srv.url())
            .list_emoji(&SlackAccessToken("nope".into()))
            .await;

        list_mock.assert_async().await;
        assert!(matches!(res, Err(Failure::SlackApi(e)) if e == "invalid_auth"));
    }

    #[tokio::test]
    async fn test_list_emoji_http_error() {
        let mut srv = server().await;

        let list_mock = srv
            .mock("GET", "/emoji.list")
            .with_status(503)
            .with_body("down for maintenance")
            .create_async()
            .await;

        let res = SlackClient::new(srv.url())
            .list_emoji(&SlackAccessToken("xoxb-foo".into()))
            .await;

        list_mock.assert_async().await;
        match res {
            Err(Failure::RemoteService {
                service,
                status,
                body,
                ..
            }) => {
                assert_eq!(service, Service::Slack);
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "down for maintenance");
            }
            _ => panic!("expected a remote service failure"),
        }
    }
}
