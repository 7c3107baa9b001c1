//! Locale identity normalizer.
//!
//! Providers, HTTP headers, and callers spell the same locale in different
//! ways (`zh_Hant`, `zh-hant`, `ZH-HANT`). `LocaleName` canonicalizes all of
//! them to a single lower-cased, hyphen-separated form so the cache can use it
//! as a key without case or separator surprises.

use std::fmt;

use crate::error::Error;

/// Separator used in normalized locale names.
pub const LOCALE_SEPARATOR: char = '-';

/// A normalized locale identifier.
///
/// Construction rewrites underscores to hyphens and lower-cases the value, so
/// `"zh_Hant"`, `"zh-Hant"`, and `"ZH-HANT"` all compare equal. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocaleName(String);

impl LocaleName {
    /// Normalize a raw locale identifier.
    ///
    /// Fails with [`Error::InvalidArgument`] on empty input. Trailing
    /// separators are not rejected (the provider never produces them, and a
    /// value like `"en-"` still walks down to `"en"` via [`Self::parent`]).
    pub fn new(raw: &str) -> Result<LocaleName, Error> {
        if raw.is_empty() {
            return Err(Error::InvalidArgument("locale is empty"));
        }

        Ok(LocaleName(raw.replace('_', "-").to_lowercase()))
    }

    /// The normalized locale string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The next-less-specific locale: the name with its trailing
    /// hyphen-delimited segment removed (`zh-hant-hk` -> `zh-hant`).
    ///
    /// Returns `None` for single-segment names, which terminates the fallback
    /// walk instead of looping on the same value.
    pub fn parent(&self) -> Option<LocaleName> {
        let idx = self.0.rfind(LOCALE_SEPARATOR)?;
        if idx == 0 {
            return None;
        }
        Some(LocaleName(self.0[..idx].to_string()))
    }
}

impl fmt::Display for LocaleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LocaleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
