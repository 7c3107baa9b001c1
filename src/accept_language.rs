//! Accept-Language header parsing.
//!
//! Parses an HTTP `Accept-Language`-style header into an ordered locale
//! preference list. The parse is lenient: anything that does not look like a
//! `lang` or `lang-subtag` token (1-8 alphabetic characters each) is silently
//! skipped, and quality values outside the `1` / `0.xxx` grammar are ignored.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::Error;
use crate::locale::LocaleName;

/// Quality assumed for tokens without an explicit `;q=` parameter.
const DEFAULT_QUALITY: f64 = 1.0;

static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();

fn token_regex() -> &'static Regex {
    TOKEN_REGEX.get_or_init(|| {
        Regex::new(r"(?i)([a-z]{1,8}(?:-[a-z]{1,8})?)\s*(?:;\s*q\s*=\s*(1|0\.[0-9]+))?")
            .unwrap()
    })
}

/// An ordered locale preference list parsed from an Accept-Language header.
///
/// Locales are sorted by descending quality; ties keep their encounter order
/// in the header. All locales are normalized (see [`LocaleName`]).
#[derive(Debug, Clone)]
pub struct AcceptLanguage {
    locales: Vec<LocaleName>,
}

impl AcceptLanguage {
    /// Parse a header value such as `"en-GB;q=0.8,fr;q=0.9,en"`.
    ///
    /// Fails with [`Error::InvalidArgument`] on an empty header. A header
    /// that contains no recognizable locale token parses into an empty
    /// preference list rather than an error.
    pub fn parse(header: &str) -> Result<AcceptLanguage, Error> {
        if header.is_empty() {
            return Err(Error::InvalidArgument("Accept-Language header is empty"));
        }

        let mut entries: Vec<(LocaleName, f64)> = Vec::new();
        for captures in token_regex().captures_iter(header) {
            let Some(token) = captures.get(1) else {
                continue;
            };

            let quality = captures
                .get(2)
                .and_then(|q| q.as_str().parse::<f64>().ok())
                .unwrap_or(DEFAULT_QUALITY);

            // Token is non-empty by construction, so normalization cannot fail
            if let Ok(name) = LocaleName::new(token.as_str()) {
                entries.push((name, quality));
            }
        }

        // Vec::sort_by is stable: equal qualities keep encounter order
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(AcceptLanguage {
            locales: entries.into_iter().map(|(name, _)| name).collect(),
        })
    }

    /// The parsed locales, most preferred first.
    pub fn locales(&self) -> &[LocaleName] {
        &self.locales
    }

    /// Whether no locale token was recognized in the header.
    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }
}
