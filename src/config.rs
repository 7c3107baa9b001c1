//! Client configuration.
//!
//! Options are immutable once a client is built: a resolve operation always
//! sees one consistent default-locale / strict-locale combination, even if
//! another client is constructed with different settings concurrently.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::error::Error;
use crate::locale::LocaleName;
use crate::provider::DEFAULT_BASE_URL;

/// Default minimum interval between refresh attempts.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// Configuration for a [`crate::Localization`] client.
#[derive(Debug, Clone)]
pub struct LocalizationOptions {
    /// Provider API base URL.
    pub base_url: String,

    /// Provider access token, sent as `Authorization: token <value>`.
    pub access_token: String,

    /// Provider project identifier.
    pub project_id: String,

    /// Locale tried after the requested one (and its prefixes) miss.
    pub default_locale: Option<LocaleName>,

    /// When set, disables prefix-truncation fallback: only the exact locale
    /// (and the default locale, if configured) are tried.
    pub strict_locale: bool,

    /// Minimum interval between scheduled refresh attempts.
    pub ttl: Duration,
}

impl LocalizationOptions {
    /// Options with the given credentials and TTL, no default locale, and
    /// prefix fallback enabled.
    pub fn new(access_token: &str, project_id: &str, ttl: Duration) -> Result<Self, Error> {
        if access_token.is_empty() {
            return Err(Error::InvalidArgument("access token is empty"));
        }
        if project_id.is_empty() {
            return Err(Error::InvalidArgument("project id is empty"));
        }

        Ok(LocalizationOptions {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: access_token.to_string(),
            project_id: project_id.to_string(),
            default_locale: None,
            strict_locale: false,
            ttl,
        })
    }

    /// Set the fallback locale tried when all others miss.
    pub fn with_default_locale(mut self, locale: &str) -> Result<Self, Error> {
        self.default_locale = Some(LocaleName::new(locale)?);
        Ok(self)
    }

    /// Enable or disable strict locale matching.
    pub fn with_strict_locale(mut self, value: bool) -> Self {
        self.strict_locale = value;
        self
    }

    /// Override the provider base URL.
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Build options from environment variables.
    ///
    /// `PHRASE_ACCESS_TOKEN` and `PHRASE_PROJECT_ID` are required;
    /// `PHRASE_BASE_URL`, `PHRASE_DEFAULT_LOCALE`, `PHRASE_STRICT_LOCALE`,
    /// and `PHRASE_TTL_MINUTES` are optional.
    pub fn from_env() -> Result<Self> {
        let access_token =
            std::env::var("PHRASE_ACCESS_TOKEN").context("PHRASE_ACCESS_TOKEN not set")?;
        let project_id =
            std::env::var("PHRASE_PROJECT_ID").context("PHRASE_PROJECT_ID not set")?;

        let ttl_minutes: u64 = std::env::var("PHRASE_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(15);

        let mut options = LocalizationOptions::new(
            &access_token,
            &project_id,
            Duration::from_secs(ttl_minutes * 60),
        )?;

        if let Ok(url) = std::env::var("PHRASE_BASE_URL") {
            options = options.with_base_url(&url);
        }

        if let Ok(locale) = std::env::var("PHRASE_DEFAULT_LOCALE") {
            options = options
                .with_default_locale(&locale)
                .context("PHRASE_DEFAULT_LOCALE is invalid")?;
        }

        options.strict_locale = std::env::var("PHRASE_STRICT_LOCALE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false);

        Ok(options)
    }
}
