//! Lookup resolver and public client surface.
//!
//! A lookup first gives the refresh engine a chance to run (lazily, when the
//! TTL deadline has passed), then walks the fallback chain in memory: the
//! exact normalized locale, progressively shorter locale prefixes (unless
//! strict-locale mode is on), and finally the configured default locale. The
//! chain walk is iterative, so a single-segment locale terminates instead of
//! recursing on itself.

use std::collections::HashMap;
use std::sync::Arc;

use crate::accept_language::AcceptLanguage;
use crate::cache::{LocalizationCache, TranslationMap};
use crate::config::LocalizationOptions;
use crate::error::Error;
use crate::locale::LocaleName;
use crate::model::Translation;
use crate::provider::{CatalogProvider, PhraseClient};
use crate::refresh;

/// Outcome of a single-key lookup. Check the discriminant; there is no null.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// A translation was found somewhere along the fallback chain.
    Found(Translation),
    /// The chain was exhausted without a match. A normal outcome, not an
    /// error.
    NotFound,
}

impl Lookup {
    /// Whether a translation was found.
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// The record, if one was found.
    pub fn found(self) -> Option<Translation> {
        match self {
            Lookup::Found(record) => Some(record),
            Lookup::NotFound => None,
        }
    }
}

/// Translation lookup client backed by a locally cached provider catalog.
///
/// Cheap to share behind an `Arc`; all interior state is the concurrent
/// cache. Configuration is immutable for the life of the client, so a
/// resolve operation never observes a mid-call settings change.
pub struct Localization<P = PhraseClient> {
    provider: P,
    cache: Arc<LocalizationCache>,
    options: LocalizationOptions,
}

impl Localization<PhraseClient> {
    /// A client talking to the Phrase REST API described by `options`.
    pub fn new(options: LocalizationOptions) -> Self {
        let provider = PhraseClient::new(&options);
        Self::with_provider(provider, options)
    }
}

impl<P: CatalogProvider> Localization<P> {
    /// A client over any transport implementing [`CatalogProvider`].
    pub fn with_provider(provider: P, options: LocalizationOptions) -> Self {
        Localization {
            provider,
            cache: Arc::new(LocalizationCache::new()),
            options,
        }
    }

    /// The configuration this client was built with.
    pub fn options(&self) -> &LocalizationOptions {
        &self.options
    }

    /// The underlying cache store. Exposed for observability; lookups are
    /// the supported read path.
    pub fn cache(&self) -> &LocalizationCache {
        &self.cache
    }

    /// Eagerly run a full refresh cycle, regardless of the TTL deadline.
    ///
    /// Useful at startup so the first real lookup is served from a warm
    /// cache. Errors are absorbed and logged like any refresh.
    pub async fn warm_up(&self) {
        refresh::refresh(&self.provider, &self.cache, &self.options).await;
    }

    /// Look up `key` for `locale`, walking the fallback chain.
    ///
    /// Fails only on empty arguments; provider trouble degrades to stale
    /// data or [`Lookup::NotFound`].
    pub async fn get(&self, key: &str, locale: &str) -> Result<Lookup, Error> {
        if key.is_empty() {
            return Err(Error::InvalidArgument("translation key is empty"));
        }
        let start = LocaleName::new(locale)?;

        refresh::refresh_if_stale(&self.provider, &self.cache, &self.options).await;

        let strict = self.options.strict_locale;
        let (hit, last_tried) = walk_chain(&self.cache, key, &start, strict);
        if let Some(record) = hit {
            return Ok(Lookup::Found(record));
        }

        if let Some(default) = self.default_unless_tried(&last_tried) {
            let (hit, _) = walk_chain(&self.cache, key, default, strict);
            if let Some(record) = hit {
                return Ok(Lookup::Found(record));
            }
        }

        Ok(Lookup::NotFound)
    }

    /// Look up `key` for each locale of an Accept-Language preference list,
    /// most preferred first, then the default locale unless the list already
    /// names it.
    pub async fn get_with_header(
        &self,
        key: &str,
        header: &AcceptLanguage,
    ) -> Result<Lookup, Error> {
        if key.is_empty() {
            return Err(Error::InvalidArgument("translation key is empty"));
        }

        refresh::refresh_if_stale(&self.provider, &self.cache, &self.options).await;

        let strict = self.options.strict_locale;
        for locale in header.locales() {
            let (hit, _) = walk_chain(&self.cache, key, locale, strict);
            if let Some(record) = hit {
                return Ok(Lookup::Found(record));
            }
        }

        if let Some(default) = self.default_unless_listed(header) {
            let (hit, _) = walk_chain(&self.cache, key, default, strict);
            if let Some(record) = hit {
                return Ok(Lookup::Found(record));
            }
        }

        Ok(Lookup::NotFound)
    }

    /// Every record of the first locale along the fallback chain that has
    /// any entries. Empty when the chain is exhausted.
    pub async fn get_all(&self, locale: &str) -> Result<Vec<Translation>, Error> {
        let start = LocaleName::new(locale)?;

        refresh::refresh_if_stale(&self.provider, &self.cache, &self.options).await;

        let strict = self.options.strict_locale;
        let (hit, last_tried) = walk_chain_all(&self.cache, &start, strict);
        if let Some(map) = hit {
            return Ok(map.values().cloned().collect());
        }

        if let Some(default) = self.default_unless_tried(&last_tried) {
            let (hit, _) = walk_chain_all(&self.cache, default, strict);
            if let Some(map) = hit {
                return Ok(map.values().cloned().collect());
            }
        }

        Ok(Vec::new())
    }

    /// [`Self::get_all`] driven by an Accept-Language preference list.
    pub async fn get_all_with_header(
        &self,
        header: &AcceptLanguage,
    ) -> Result<Vec<Translation>, Error> {
        refresh::refresh_if_stale(&self.provider, &self.cache, &self.options).await;

        let strict = self.options.strict_locale;
        for locale in header.locales() {
            let (hit, _) = walk_chain_all(&self.cache, locale, strict);
            if let Some(map) = hit {
                return Ok(map.values().cloned().collect());
            }
        }

        if let Some(default) = self.default_unless_listed(header) {
            let (hit, _) = walk_chain_all(&self.cache, default, strict);
            if let Some(map) = hit {
                return Ok(map.values().cloned().collect());
            }
        }

        Ok(Vec::new())
    }

    /// The translation value for `key` and `locale`, or a
    /// `missing-key-'<key>'-locale-'<locale>'` marker when the chain misses.
    pub async fn get_value(&self, key: &str, locale: &str) -> Result<String, Error> {
        let fallback = format!("missing-key-'{key}'-locale-'{locale}'");
        self.get_value_or(key, locale, &fallback).await
    }

    /// The translation value for `key` and `locale`, or `fallback`.
    pub async fn get_value_or(
        &self,
        key: &str,
        locale: &str,
        fallback: &str,
    ) -> Result<String, Error> {
        Ok(match self.get(key, locale).await?.found() {
            Some(record) => record.value().to_string(),
            None => fallback.to_string(),
        })
    }

    /// The translation value for `key` via a preference list, or a
    /// `missing-key-'<key>'` marker when the chain misses.
    pub async fn get_value_with_header(
        &self,
        key: &str,
        header: &AcceptLanguage,
    ) -> Result<String, Error> {
        let fallback = format!("missing-key-'{key}'");
        self.get_value_with_header_or(key, header, &fallback).await
    }

    /// The translation value for `key` via a preference list, or `fallback`.
    pub async fn get_value_with_header_or(
        &self,
        key: &str,
        header: &AcceptLanguage,
        fallback: &str,
    ) -> Result<String, Error> {
        Ok(match self.get_with_header(key, header).await?.found() {
            Some(record) => record.value().to_string(),
            None => fallback.to_string(),
        })
    }

    /// All key -> value pairs for the first locale along the chain with any
    /// entries, keyed for direct template consumption.
    pub async fn get_all_values(&self, locale: &str) -> Result<HashMap<String, String>, Error> {
        Ok(to_values(self.get_all(locale).await?))
    }

    /// [`Self::get_all_values`] driven by an Accept-Language preference list.
    pub async fn get_all_values_with_header(
        &self,
        header: &AcceptLanguage,
    ) -> Result<HashMap<String, String>, Error> {
        Ok(to_values(self.get_all_with_header(header).await?))
    }

    fn default_unless_tried(&self, last_tried: &LocaleName) -> Option<&LocaleName> {
        self.options
            .default_locale
            .as_ref()
            .filter(|default| *default != last_tried)
    }

    fn default_unless_listed(&self, header: &AcceptLanguage) -> Option<&LocaleName> {
        self.options
            .default_locale
            .as_ref()
            .filter(|default| !header.locales().contains(*default))
    }
}

/// Walk the prefix chain for one locale: exact match first, then one trailing
/// segment stripped per step until the single-segment terminal. Returns the
/// hit (if any) and the last locale probed, which the caller compares with
/// the default locale.
fn walk_chain(
    cache: &LocalizationCache,
    key: &str,
    start: &LocaleName,
    strict: bool,
) -> (Option<Translation>, LocaleName) {
    let mut current = start.clone();
    loop {
        if let Some(map) = cache.translations_for(&current) {
            if let Some(record) = map.get(key) {
                return (Some(record.clone()), current);
            }
        }

        if strict {
            return (None, current);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return (None, current),
        }
    }
}

/// Same walk as [`walk_chain`], but stops at the first locale with any
/// cached entries and yields its whole map.
fn walk_chain_all(
    cache: &LocalizationCache,
    start: &LocaleName,
    strict: bool,
) -> (Option<TranslationMap>, LocaleName) {
    let mut current = start.clone();
    loop {
        if let Some(map) = cache.translations_for(&current) {
            if !map.is_empty() {
                return (Some(map), current);
            }
        }

        if strict {
            return (None, current);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return (None, current),
        }
    }
}

fn to_values(records: Vec<Translation>) -> HashMap<String, String> {
    records
        .into_iter()
        .map(|record| (record.key().to_string(), record.value().to_string()))
        .collect()
}
