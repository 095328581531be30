use crate::import::Report;
use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

/// The remote party a request was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Slack,
    RocketChat,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Slack => write!(f, "Slack"),
            Service::RocketChat => write!(f, "Rocket.Chat"),
        }
    }
}

/// Sum type representing every way an import can fail.
///
/// Only [Failure::Download] and [Failure::Buffer] are recovered from within
/// the upload loop; everything else ends the run.
#[derive(Debug, Error)]
pub enum Failure {
    #[error("Rocket.Chat login failed with {status}: {body}")]
    Authentication { status: StatusCode, body: String },

    #[error("{service} returned {status} from {endpoint}: {body}")]
    RemoteService {
        service: Service,
        endpoint: String,
        status: StatusCode,
        body: String,
    },

    #[error("Slack API returned error: {0}")]
    SlackApi(String),

    #[error("Failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to buffer image: {0}")]
    Buffer(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read input: {0}")]
    Prompt(String),

    #[error(
        "Import aborted after {} of {} emoji: {source}",
        .report.results.len(),
        .report.found
    )]
    Aborted {
        report: Report,
        #[source]
        source: Box<Failure>,
    },
}

impl Failure {
    /// Whether the upload loop may log this and carry on with the next emoji.
    pub fn is_per_entry(&self) -> bool {
        matches!(self, Failure::Download { .. } | Failure::Buffer(_))
    }
}

impl From<dialoguer::Error> for Failure {
    fn from(e: dialoguer::Error) -> Self {
        Failure::Prompt(e.to_string())
    }
}

/// Turn a non-2xx response into a [Failure::RemoteService], consuming the
/// body for the message. Successful responses are handed back untouched.
pub async fn check_status(
    service: Service,
    endpoint: &str,
    res: reqwest::Response,
) -> Result<reqwest::Response, Failure> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    Err(Failure::RemoteService {
        service,
        endpoint: endpoint.to_owned(),
        status,
        body,
    })
}
