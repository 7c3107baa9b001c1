//! Catalog refresh engine.
//!
//! A refresh cycle makes two kinds of calls: one conditional fetch of the
//! locale list, then one conditional fetch per known locale for its
//! translation document. Every provider error is absorbed here — logged,
//! never propagated — so lookups at worst serve stale data or miss. The only
//! hard stop is a `401`, which aborts the cycle before any document download.
//!
//! Refresh is lazy: the resolver calls [`refresh_if_stale`] before each
//! lookup. Concurrent lookups may each trigger a refresh; there is no
//! single-flight guard, and that is fine because every write is an
//! idempotent whole-map replacement.

use std::collections::HashMap;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, error, warn};

use crate::cache::LocalizationCache;
use crate::config::LocalizationOptions;
use crate::model::{LocaleEntry, Translation};
use crate::provider::{CatalogOutcome, CatalogProvider, Fetched, RateLimit};

/// How the catalog pass ended.
enum CatalogRefresh {
    /// Proceed to the translation pass. `rate_limited` is set when the
    /// exhausted-quota reset time already rescheduled the next refresh.
    Continue { rate_limited: bool },
    /// Credentials rejected: skip the translation pass entirely.
    Abort,
}

/// Run a full refresh cycle if the TTL deadline has passed.
pub(crate) async fn refresh_if_stale<P: CatalogProvider>(
    provider: &P,
    cache: &LocalizationCache,
    options: &LocalizationOptions,
) {
    if !cache.is_stale(Utc::now()) {
        return;
    }
    refresh(provider, cache, options).await;
}

/// Run a full refresh cycle unconditionally: catalog first, then one
/// document fetch per known locale.
pub(crate) async fn refresh<P: CatalogProvider>(
    provider: &P,
    cache: &LocalizationCache,
    options: &LocalizationOptions,
) {
    let rate_limited = match refresh_catalog(provider, cache).await {
        CatalogRefresh::Abort => return,
        CatalogRefresh::Continue { rate_limited } => rate_limited,
    };

    refresh_translations(provider, cache).await;

    if !rate_limited {
        cache.set_next_refresh_at(Utc::now() + options.ttl);
    }
}

async fn refresh_catalog<P: CatalogProvider>(
    provider: &P,
    cache: &LocalizationCache,
) -> CatalogRefresh {
    let etag = cache.catalog_etag();
    let fetch = match provider.fetch_catalog(etag.as_deref()).await {
        Ok(fetch) => fetch,
        Err(err) => {
            warn!("unable to load locale catalog: {err}");
            return CatalogRefresh::Continue {
                rate_limited: false,
            };
        }
    };

    let rate_limited = apply_rate_limit(cache, &fetch.rate_limit);

    match fetch.outcome {
        CatalogOutcome::Updated(page) => {
            if let Some(etag) = page.etag {
                cache.set_catalog_etag(etag);
            }
            for model in page.locales {
                match LocaleEntry::try_from(model) {
                    Ok(entry) => cache.upsert_locale(entry),
                    Err(err) => warn!("skipping malformed catalog entry: {err}"),
                }
            }
            CatalogRefresh::Continue { rate_limited }
        }
        CatalogOutcome::NotModified => {
            debug!("locale catalog unchanged");
            CatalogRefresh::Continue { rate_limited }
        }
        CatalogOutcome::Unauthorized => {
            error!("locale catalog refresh unauthorized, aborting refresh cycle");
            CatalogRefresh::Abort
        }
        CatalogOutcome::Failed(err) => {
            warn!("unable to load locale catalog: {err}");
            CatalogRefresh::Continue { rate_limited }
        }
    }
}

/// When the quota is spent and the provider tells us when it resets, move
/// the refresh deadline there instead of the TTL schedule.
fn apply_rate_limit(cache: &LocalizationCache, rate: &RateLimit) -> bool {
    if !rate.is_exhausted() {
        return false;
    }

    warn!("provider request quota exhausted (X-Rate-Limit-Remaining: 0)");

    match rate.reset {
        Some(reset) => {
            cache.set_next_refresh_at(reset);
            true
        }
        None => false,
    }
}

/// Fetch every known locale's document concurrently, best-effort: one
/// locale's failure never blocks the others.
async fn refresh_translations<P: CatalogProvider>(provider: &P, cache: &LocalizationCache) {
    let locales = cache.locales();
    join_all(
        locales
            .iter()
            .map(|entry| refresh_locale(provider, cache, entry)),
    )
    .await;
}

async fn refresh_locale<P: CatalogProvider>(
    provider: &P,
    cache: &LocalizationCache,
    entry: &LocaleEntry,
) {
    let etag = cache.etag_for(&entry.name);
    let document = match provider.fetch_locale_document(&entry.id, etag.as_deref()).await {
        Ok(Fetched::Modified(document)) => document,
        Ok(Fetched::NotModified) => {
            debug!(locale = %entry.name, "translations unchanged");
            return;
        }
        Err(err) => {
            warn!(locale = %entry.name, id = %entry.id, "translation refresh failed: {err}");
            return;
        }
    };

    let mut fresh = HashMap::with_capacity(document.entries.len());
    for (key, value) in document.entries {
        match Translation::new(key.clone(), value, entry.name.clone(), document.last_modified) {
            Ok(record) => {
                fresh.insert(key, record);
            }
            Err(err) => {
                // Keep serving the previous document for this locale
                warn!(locale = %entry.name, "discarding translation document: {err}");
                return;
            }
        }
    }

    let count = fresh.len();
    cache.replace_translations(entry.name.clone(), fresh);
    if let Some(etag) = document.etag {
        cache.set_etag(entry.name.clone(), etag);
    }
    debug!(locale = %entry.name, count, "translations refreshed");
}
