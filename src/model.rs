//! Cached data model: translation records and catalog entries.

use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::locale::LocaleName;

/// An immutable translation record.
///
/// Identity is `(locale, key)`. Records are created only by the refresh
/// engine while parsing a provider response.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    key: String,
    value: String,
    locale: LocaleName,
    last_modified: Option<DateTime<Utc>>,
}

impl Translation {
    /// Build a record. Fails with [`Error::InvalidArgument`] on an empty key;
    /// an empty value is a legitimate (untranslated) entry.
    pub fn new(
        key: String,
        value: String,
        locale: LocaleName,
        last_modified: Option<DateTime<Utc>>,
    ) -> Result<Translation, Error> {
        if key.is_empty() {
            return Err(Error::InvalidArgument("translation key is empty"));
        }

        Ok(Translation {
            key,
            value,
            locale,
            last_modified,
        })
    }

    /// The translation key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The translated string.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The locale this record was downloaded for.
    pub fn locale(&self) -> &LocaleName {
        &self.locale
    }

    /// The `Last-Modified` time of the document this record came from, when
    /// the provider sent a parsable one.
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }
}

/// A catalog entry mapping the provider-side opaque locale id to its
/// normalized name, plus the provider's locale flags.
#[derive(Debug, Clone)]
pub struct LocaleEntry {
    /// Provider-side opaque identifier, used in download URLs.
    pub id: String,
    /// Normalized locale name, used as the cache key.
    pub name: LocaleName,
    /// Provider locale code, when reported.
    pub code: Option<String>,
    /// Whether the provider marks this locale as its project default.
    pub is_default: bool,
    /// Whether the provider marks this locale as the main locale.
    pub is_main: bool,
    /// Right-to-left script flag.
    pub rtl: bool,
}
