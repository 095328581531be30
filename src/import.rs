//! The import itself: fetch Slack's catalog, log in to Rocket.Chat, then
//! create or update each image emoji one at a time.
//!
//! Per-emoji problems (a failed download, a 400, `success: false`) are logged
//! and tallied. Any other unexpected answer from Rocket.Chat during the upload
//! loop stops the run, and the tallies so far travel along inside
//! [Failure::Aborted].

use crate::{
    config::Config,
    error::Failure,
    image::ImageSource,
    rocketchat::{
        api::{RocketChatClient, Session},
        emoji::{ExistingEmoji, UploadOutcome, UploadTarget},
    },
    slack::{api::SlackClient, emoji::EmojiSource},
};
use clap::ValueEnum;
use tracing::{debug, error, info, warn};
use url::Url;

/// How to treat an upload that Rocket.Chat answers with HTTP 400, which
/// usually means the emoji already exists.
///
/// Either way the emoji counts as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ConflictPolicy {
    /// Submit a create call once more, then report failure whatever it says.
    #[default]
    RetryCreate,
    /// Report failure straight away.
    Fail,
}

/// The outcome for a single uploadable emoji.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub name: String,
    pub succeeded: bool,
}

/// Tallies for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Every entry in Slack's catalog, uploadable or not.
    pub found: usize,
    /// Aliases and other non-image entries.
    pub skipped: usize,
    /// One per image entry processed, in processing order.
    pub results: Vec<UploadResult>,
}

impl Report {
    /// How many emoji were created or updated.
    pub fn created(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded).count()
    }

    pub fn failed_names(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .filter(|r| !r.succeeded)
            .map(|r| r.name.as_str())
    }
}

/// Run an import end to end.
pub async fn run<S: ImageSource>(config: &Config, images: &S) -> Result<Report, Failure> {
    let slack = SlackClient::new(config.slack_api_base.clone());
    let catalog = slack.list_emoji(&config.slack_token).await?;

    let mut report = Report {
        found: catalog.len(),
        ..Report::default()
    };
    info!("Found {} emoji in Slack", report.found);

    let rocketchat = RocketChatClient::new(config.rc_url.as_str());
    let session = rocketchat.login(&config.rc_user, &config.rc_pass).await?;

    // Must be complete before the first create/update decision.
    let existing = if config.lookup_existing {
        let existing = rocketchat.list_emoji(&session).await?;
        info!("Found {} custom emoji in Rocket.Chat", existing.len());
        Some(existing)
    } else {
        None
    };

    let uploader = Uploader {
        rocketchat: &rocketchat,
        session: &session,
        existing: existing.as_ref(),
        images,
        policy: config.on_conflict,
    };

    for entry in &catalog {
        let url = match &entry.source {
            EmojiSource::Image(url) => url,
            EmojiSource::Malformed { raw, reason } => {
                // Nothing can be downloaded, which makes this a failed entry.
                let e = Failure::Download {
                    url: raw.clone(),
                    reason: format!("not a valid URL: {}", reason),
                };
                warn!("{}", e);
                error!("Failed to transfer emoji {}", entry.name);
                report.results.push(UploadResult {
                    name: entry.name.clone(),
                    succeeded: false,
                });
                continue;
            }
            EmojiSource::Alias(target) => {
                debug!("Skipping :{}:, an alias of :{}:", entry.name, target);
                report.skipped += 1;
                continue;
            }
            EmojiSource::Unsupported(raw) => {
                debug!("Skipping :{}:, not an image: {}", entry.name, raw);
                report.skipped += 1;
                continue;
            }
        };

        match uploader.upload(&entry.name, url).await {
            Ok(succeeded) => report.results.push(UploadResult {
                name: entry.name.clone(),
                succeeded,
            }),
            Err(e) => {
                return Err(Failure::Aborted {
                    report,
                    source: Box::new(e),
                })
            }
        }
    }

    info!("Created {} emoji in Rocket.Chat", report.created());
    Ok(report)
}

/// Everything a single upload needs, fixed for the whole loop.
struct Uploader<'a, S> {
    rocketchat: &'a RocketChatClient,
    session: &'a Session,
    existing: Option<&'a ExistingEmoji>,
    images: &'a S,
    policy: ConflictPolicy,
}

impl<S: ImageSource> Uploader<'_, S> {
    /// `Ok(false)` covers every failure confined to this emoji; an `Err`
    /// should stop the run.
    async fn upload(&self, name: &str, url: &Url) -> Result<bool, Failure> {
        let target = match self.existing.and_then(|existing| existing.get(name)) {
            Some(record) => {
                debug!(
                    "Found :{}: as {} with aliases {:?}",
                    name, record.id, record.aliases
                );
                UploadTarget::Update { id: &record.id }
            }
            None => UploadTarget::Create,
        };
        let verb = target.verb();

        info!("Attempting to {} emoji :{}: from URL: {}", verb, name, url);

        let succeeded = match self.try_upload(name, url, target).await {
            Ok(succeeded) => succeeded,
            Err(e) if e.is_per_entry() => {
                warn!("{}", e);
                false
            }
            Err(e) => return Err(e),
        };

        if !succeeded {
            error!("Failed to {} emoji {}", verb, name);
        }

        Ok(succeeded)
    }

    async fn try_upload(
        &self,
        name: &str,
        url: &Url,
        target: UploadTarget<'_>,
    ) -> Result<bool, Failure> {
        // Dropped, and thus deleted, on every way out of this function.
        let mut image = self.images.fetch(url).await?;
        debug!(
            "Downloaded {} bytes of {} as {}",
            image.size(),
            image.mime(),
            image.file_name()
        );

        let outcome = self
            .rocketchat
            .upload_emoji(self.session, name, target, &mut image)
            .await?;

        match outcome {
            UploadOutcome::Completed(success) => Ok(success),
            UploadOutcome::BadRequest => {
                warn!("Invalid request for :{}: - likely due to emoji already existing", name);

                if self.policy == ConflictPolicy::RetryCreate {
                    // Whatever the retry says, the emoji is reported as failed.
                    let retry = self
                        .rocketchat
                        .upload_emoji(self.session, name, UploadTarget::Create, &mut image)
                        .await;

                    match retry {
                        Ok(outcome) => debug!("Retried create of :{}:: {:?}", name, outcome),
                        Err(e @ Failure::RemoteService { .. }) => {
                            debug!("Retried create of :{}:: {}", name, e)
                        }
                        Err(e) => return Err(e),
                    }
                }

                Ok(false)
            }
        }
    }
}
