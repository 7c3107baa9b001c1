//! Remote catalog provider: capability trait and the reqwest adapter.
//!
//! The refresh engine depends only on [`CatalogProvider`], which captures the
//! two calls the provider contract offers: fetch the locale list and fetch a
//! per-locale translation document, both conditionally via ETags. The
//! concrete [`PhraseClient`] speaks the Phrase REST API over reqwest.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, ETAG, IF_NONE_MATCH, LAST_MODIFIED};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::LocalizationOptions;
use crate::error::Error;
use crate::locale::LocaleName;
use crate::model::LocaleEntry;

/// Default Phrase API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.phraseapp.com/api/v2";

/// Remaining-quota value assumed when the header is absent or unparsable.
pub const DEFAULT_RATE_LIMIT_REMAINING: i64 = 500;

/// Rate-limit signals read from a catalog response.
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    /// Requests left in the current window (`X-Rate-Limit-Remaining`).
    pub remaining: i64,
    /// When the window resets (`X-Rate-Limit-Reset`), if sent and positive.
    pub reset: Option<DateTime<Utc>>,
}

impl RateLimit {
    /// Whether the quota is spent and further requests should wait.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// A conditional fetch either carries a fresh body or reports the cached
/// copy is still valid.
#[derive(Debug)]
pub enum Fetched<T> {
    /// The resource changed; here is the new representation.
    Modified(T),
    /// `304 Not Modified`: keep what is cached.
    NotModified,
}

/// Locale-list payload of a `200` catalog response.
#[derive(Debug)]
pub struct CatalogPage {
    /// Locales as reported by the provider, unsanitized.
    pub locales: Vec<LocaleModel>,
    /// The response `ETag`, if sent.
    pub etag: Option<String>,
}

/// How a catalog fetch ended, status-wise. Kept separate from the transport
/// `Result` so rate-limit headers survive non-success statuses.
#[derive(Debug)]
pub enum CatalogOutcome {
    /// `200`: a new locale list.
    Updated(CatalogPage),
    /// `304`: the cached locale list is current.
    NotModified,
    /// `401`: credentials rejected.
    Unauthorized,
    /// Anything else, including an unparsable body.
    Failed(Error),
}

/// Result of one catalog fetch: outcome plus rate-limit bookkeeping.
#[derive(Debug)]
pub struct CatalogFetch {
    /// Status-level outcome.
    pub outcome: CatalogOutcome,
    /// Rate-limit headers, parsed from whatever response arrived.
    pub rate_limit: RateLimit,
}

/// A `200` translation-document response.
#[derive(Debug)]
pub struct DocumentPage {
    /// Flat key -> translated string mapping.
    pub entries: HashMap<String, String>,
    /// The response `ETag`, if sent.
    pub etag: Option<String>,
    /// The response `Last-Modified`, when parsable.
    pub last_modified: Option<DateTime<Utc>>,
}

/// One locale as the provider's catalog payload describes it.
#[derive(Debug, Deserialize)]
pub struct LocaleModel {
    /// Provider-side opaque identifier.
    pub id: String,
    /// Display name, which may use either `_` or `-` separators.
    pub name: String,
    /// Locale code, when reported.
    #[serde(default)]
    pub code: Option<String>,
    /// Project-default flag.
    #[serde(default, rename = "default")]
    pub is_default: bool,
    /// Main-locale flag.
    #[serde(default, rename = "main")]
    pub is_main: bool,
    /// Right-to-left script flag.
    #[serde(default)]
    pub rtl: bool,
}

impl TryFrom<LocaleModel> for LocaleEntry {
    type Error = Error;

    fn try_from(model: LocaleModel) -> Result<LocaleEntry, Error> {
        if model.id.is_empty() {
            return Err(Error::InvalidArgument("provider locale id is empty"));
        }

        Ok(LocaleEntry {
            name: LocaleName::new(&model.name)?,
            id: model.id,
            code: model.code,
            is_default: model.is_default,
            is_main: model.is_main,
            rtl: model.rtl,
        })
    }
}

/// The two remote calls a refresh cycle needs.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch the project locale list, conditionally on `etag`.
    ///
    /// `Err` means the request never produced a response (transport failure);
    /// status-level failures are reported inside [`CatalogFetch`] so the
    /// rate-limit headers remain available.
    async fn fetch_catalog(&self, etag: Option<&str>) -> Result<CatalogFetch, Error>;

    /// Fetch one locale's flat translation document, conditionally on `etag`.
    async fn fetch_locale_document(
        &self,
        locale_id: &str,
        etag: Option<&str>,
    ) -> Result<Fetched<DocumentPage>, Error>;
}

/// Reqwest-backed Phrase API adapter.
pub struct PhraseClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    project_id: String,
}

impl PhraseClient {
    /// Build a client for the project and credentials in `options`.
    pub fn new(options: &LocalizationOptions) -> Self {
        PhraseClient {
            client: reqwest::Client::new(),
            base_url: options.base_url.trim_end_matches('/').to_string(),
            access_token: options.access_token.clone(),
            project_id: options.project_id.clone(),
        }
    }

    fn get(&self, url: &str, etag: Option<&str>) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .get(url)
            .header("Authorization", format!("token {}", self.access_token));

        // An empty stored ETag is the same as no ETag
        if let Some(etag) = etag.filter(|e| !e.is_empty()) {
            request = request.header(IF_NONE_MATCH, etag);
        }

        request
    }
}

#[async_trait]
impl CatalogProvider for PhraseClient {
    async fn fetch_catalog(&self, etag: Option<&str>) -> Result<CatalogFetch, Error> {
        let url = format!("{}/projects/{}/locales", self.base_url, self.project_id);
        let response = self.get(&url, etag).send().await?;

        let rate_limit = parse_rate_limit(response.headers());
        let outcome = match response.status() {
            StatusCode::OK => {
                let etag = header_string(response.headers(), ETAG.as_str());
                match response.json::<Vec<LocaleModel>>().await {
                    Ok(locales) => CatalogOutcome::Updated(CatalogPage { locales, etag }),
                    Err(err) => CatalogOutcome::Failed(Error::MalformedBody(err.to_string())),
                }
            }
            StatusCode::NOT_MODIFIED => CatalogOutcome::NotModified,
            StatusCode::UNAUTHORIZED => CatalogOutcome::Unauthorized,
            status => CatalogOutcome::Failed(Error::UnexpectedStatus(status.as_u16())),
        };

        Ok(CatalogFetch {
            outcome,
            rate_limit,
        })
    }

    async fn fetch_locale_document(
        &self,
        locale_id: &str,
        etag: Option<&str>,
    ) -> Result<Fetched<DocumentPage>, Error> {
        let url = format!(
            "{}/projects/{}/locales/{}/download?file_format=simple_json",
            self.base_url, self.project_id, locale_id
        );
        let response = self.get(&url, etag).send().await?;

        match response.status() {
            StatusCode::OK => {
                let etag = header_string(response.headers(), ETAG.as_str());
                let last_modified = header_string(response.headers(), LAST_MODIFIED.as_str())
                    .and_then(|value| parse_last_modified(&value));
                let entries = response
                    .json::<HashMap<String, String>>()
                    .await
                    .map_err(|err| Error::MalformedBody(err.to_string()))?;

                Ok(Fetched::Modified(DocumentPage {
                    entries,
                    etag,
                    last_modified,
                }))
            }
            StatusCode::NOT_MODIFIED => Ok(Fetched::NotModified),
            StatusCode::UNAUTHORIZED => Err(Error::Unauthorized),
            status => Err(Error::UnexpectedStatus(status.as_u16())),
        }
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Parse `X-Rate-Limit-Remaining` / `X-Rate-Limit-Reset`, defaulting the
/// remaining quota generously when the provider does not send it.
fn parse_rate_limit(headers: &HeaderMap) -> RateLimit {
    let remaining = headers
        .get("X-Rate-Limit-Remaining")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i64>().ok())
        .unwrap_or(DEFAULT_RATE_LIMIT_REMAINING);

    let reset = headers
        .get("X-Rate-Limit-Reset")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i64>().ok())
        .filter(|epoch| *epoch > 0)
        .and_then(|epoch| DateTime::from_timestamp(epoch, 0));

    RateLimit { remaining, reset }
}

/// `Last-Modified` is RFC 2822 (`Tue, 15 Nov 1994 12:45:26 GMT`); anything
/// unparsable stamps records with `None`.
fn parse_last_modified(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|stamp| stamp.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                reqwest::header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    // ==================== Rate Limit Parsing Tests ====================

    #[test]
    fn test_rate_limit_parsed() {
        let rate = parse_rate_limit(&headers(&[
            ("X-Rate-Limit-Remaining", "42"),
            ("X-Rate-Limit-Reset", "1705312200"),
        ]));

        assert_eq!(rate.remaining, 42);
        assert_eq!(rate.reset.unwrap().timestamp(), 1_705_312_200);
        assert!(!rate.is_exhausted());
    }

    #[test]
    fn test_rate_limit_missing_headers_defaults() {
        let rate = parse_rate_limit(&HeaderMap::new());
        assert_eq!(rate.remaining, DEFAULT_RATE_LIMIT_REMAINING);
        assert!(rate.reset.is_none());
    }

    #[test]
    fn test_rate_limit_unparsable_remaining_defaults() {
        let rate = parse_rate_limit(&headers(&[("X-Rate-Limit-Remaining", "soon")]));
        assert_eq!(rate.remaining, DEFAULT_RATE_LIMIT_REMAINING);
    }

    #[test]
    fn test_rate_limit_zero_is_exhausted() {
        let rate = parse_rate_limit(&headers(&[("X-Rate-Limit-Remaining", "0")]));
        assert!(rate.is_exhausted());
    }

    #[test]
    fn test_rate_limit_nonpositive_reset_ignored() {
        let rate = parse_rate_limit(&headers(&[
            ("X-Rate-Limit-Remaining", "0"),
            ("X-Rate-Limit-Reset", "0"),
        ]));
        assert!(rate.reset.is_none());
    }

    // ==================== Last-Modified Parsing Tests ====================

    #[test]
    fn test_last_modified_rfc2822() {
        let parsed = parse_last_modified("Tue, 15 Nov 1994 12:45:26 GMT").unwrap();
        assert_eq!(parsed.timestamp(), 784_903_526);
    }

    #[test]
    fn test_last_modified_garbage_is_none() {
        assert!(parse_last_modified("yesterday-ish").is_none());
    }

    // ==================== Locale Model Tests ====================

    #[test]
    fn test_locale_model_deserializes_provider_payload() {
        let json = r#"{
            "id": "abc123",
            "name": "zh_Hant",
            "code": "zh-Hant",
            "default": true,
            "main": false,
            "rtl": false,
            "plural_forms": ["one", "other"]
        }"#;

        let model: LocaleModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.id, "abc123");
        assert_eq!(model.name, "zh_Hant");
        assert!(model.is_default);
    }

    #[test]
    fn test_locale_model_minimal_payload() {
        let model: LocaleModel =
            serde_json::from_str(r#"{"id": "x", "name": "en"}"#).unwrap();
        assert!(!model.is_default);
        assert!(model.code.is_none());
    }

    #[test]
    fn test_locale_entry_sanitizes_name() {
        let model: LocaleModel =
            serde_json::from_str(r#"{"id": "x", "name": "zh_Hant"}"#).unwrap();
        let entry = LocaleEntry::try_from(model).unwrap();
        assert_eq!(entry.name.as_str(), "zh-hant");
    }

    #[test]
    fn test_locale_entry_empty_id_rejected() {
        let model: LocaleModel =
            serde_json::from_str(r#"{"id": "", "name": "en"}"#).unwrap();
        assert!(LocaleEntry::try_from(model).is_err());
    }

    #[test]
    fn test_locale_entry_empty_name_rejected() {
        let model: LocaleModel =
            serde_json::from_str(r#"{"id": "x", "name": ""}"#).unwrap();
        assert!(LocaleEntry::try_from(model).is_err());
    }
}
