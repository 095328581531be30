//! Command line and environment handling.
//!
//! Values come from flags first, then the environment (including `.env`), and
//! anything still missing is asked for interactively. The result is a
//! [Config]; nothing past this module ever prompts.

use crate::{
    error::Failure,
    import::ConflictPolicy,
    rocketchat::auth::Password,
    slack::{api::API_BASE, auth::SlackAccessToken},
};
use clap::Parser;
use dialoguer::{Input, Password as PasswordInput};
use url::Url;

/// The instance offered when prompting for a Rocket.Chat URL.
pub const DEFAULT_RC_URL: &str = "https://chat.ratchet.express";

/// Copy custom emoji from a Slack workspace to a Rocket.Chat instance.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Slack token for app/bot. See OAuth and Permissions in app details at
    /// https://api.slack.com/apps/
    #[arg(long, alias = "slack_token", env = "SLACK_TOKEN", hide_env_values = true)]
    slack_token: Option<String>,

    /// Rocket.Chat instance.
    #[arg(long, alias = "rc_url", env = "RC_URL")]
    rc_url: Option<String>,

    /// Rocket.Chat username. The user must be able to add emoji.
    #[arg(long, alias = "rc_user", env = "RC_USER")]
    rc_user: Option<String>,

    /// Rocket.Chat password.
    #[arg(long, alias = "rc_pass", env = "RC_PASS", hide_env_values = true)]
    rc_pass: Option<String>,

    /// What to do when Rocket.Chat rejects an upload with HTTP 400.
    #[arg(long, value_enum, env = "RC_ON_CONFLICT", default_value_t = ConflictPolicy::RetryCreate)]
    on_conflict: ConflictPolicy,

    /// Don't look up existing Rocket.Chat emoji; always try to create.
    #[arg(long)]
    no_existing_lookup: bool,

    #[arg(long, env = "SLACK_API_BASE", default_value = API_BASE, hide = true)]
    slack_api_base: String,
}

/// Everything an import needs to run.
#[derive(Debug, Clone)]
pub struct Config {
    pub slack_token: SlackAccessToken,
    pub slack_api_base: String,
    pub rc_url: Url,
    pub rc_user: String,
    pub rc_pass: Password,
    pub on_conflict: ConflictPolicy,
    pub lookup_existing: bool,
}

/// Asks the operator for missing values.
pub trait Prompt {
    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String, Failure>;
    fn password(&self, prompt: &str) -> Result<String, Failure>;
}

/// Prompts on the controlling terminal.
pub struct Terminal;

impl Prompt for Terminal {
    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String, Failure> {
        let mut input = Input::<String>::new().with_prompt(prompt);
        if let Some(default) = default {
            input = input.default(default.to_owned());
        }
        Ok(input.interact_text()?)
    }

    fn password(&self, prompt: &str) -> Result<String, Failure> {
        Ok(PasswordInput::new().with_prompt(prompt).interact()?)
    }
}

impl Args {
    /// Fill in the gaps via `prompt` and validate the result.
    pub fn resolve<P: Prompt>(self, prompt: &P) -> Result<Config, Failure> {
        let slack_token = match self.slack_token {
            Some(t) => t,
            None => prompt.input("Slack token for app/bot", None)?,
        };

        let rc_url = match self.rc_url {
            Some(u) => u,
            None => prompt.input("Rocket.Chat instance", Some(DEFAULT_RC_URL))?,
        };

        let rc_user = match self.rc_user {
            Some(u) => u,
            None => prompt.input("Rocket.Chat username", None)?,
        };

        let rc_pass = match self.rc_pass {
            Some(p) => p,
            None => prompt.password("Rocket.Chat password")?,
        };

        Ok(Config {
            slack_token: SlackAccessToken(non_empty("Slack token", slack_token)?),
            slack_api_base: self.slack_api_base,
            rc_url: parse_instance_url(&rc_url)?,
            rc_user: non_empty("Rocket.Chat username", rc_user)?,
            rc_pass: Password(rc_pass),
            on_conflict: self.on_conflict,
            lookup_existing: !self.no_existing_lookup,
        })
    }
}

fn non_empty(what: &str, value: String) -> Result<String, Failure> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Failure::InvalidConfig(format!("{} must not be empty", what)));
    }
    Ok(trimmed.to_owned())
}

fn parse_instance_url(raw: &str) -> Result<Url, Failure> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Failure::InvalidConfig(format!("Rocket.Chat instance {:?}: {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Failure::InvalidConfig(format!(
            "Rocket.Chat instance must be http or https, not {}",
            scheme
        ))),
    }
}
