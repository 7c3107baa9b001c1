//! Translation cache store.
//!
//! A concurrent associative store shared between the refresh engine (writer)
//! and the lookup resolver (reader). Per-locale translation maps are swapped
//! whole (`Arc` replacement), so a reader observes either the previous or the
//! new complete map for a locale, never a half-populated one. There is no
//! eviction: a locale that disappears from a later catalog fetch keeps
//! serving its last known translations, favoring availability.
//!
//! The cache is an explicitly constructed value with clear ownership; nothing
//! here is process-global, so independent clients can each hold their own.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use crate::locale::LocaleName;
use crate::model::{LocaleEntry, Translation};

/// A whole-locale translation map, shared out to readers without copying.
pub type TranslationMap = Arc<HashMap<String, Translation>>;

/// Concurrent store of catalog entries, translations, revision tokens, and
/// the refresh deadline.
pub struct LocalizationCache {
    /// Provider locale id -> catalog entry.
    locales: RwLock<HashMap<String, LocaleEntry>>,
    /// Locale name -> full translation map, replaced atomically per locale.
    translations: RwLock<HashMap<LocaleName, TranslationMap>>,
    /// Locale name -> ETag of the last downloaded document.
    etags: RwLock<HashMap<LocaleName, String>>,
    /// ETag of the last locale-list response.
    catalog_etag: RwLock<Option<String>>,
    /// Next time a lookup is allowed to trigger a refresh.
    next_refresh_at: RwLock<DateTime<Utc>>,
}

// A poisoned lock means a writer panicked mid-replacement; since every write
// is a single whole-value insert the data is still coherent, so recover the
// guard rather than propagate the panic to readers.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl LocalizationCache {
    /// An empty cache whose refresh deadline is already in the past, so the
    /// first lookup triggers a full refresh.
    pub fn new() -> Self {
        LocalizationCache {
            locales: RwLock::new(HashMap::new()),
            translations: RwLock::new(HashMap::new()),
            etags: RwLock::new(HashMap::new()),
            catalog_etag: RwLock::new(None),
            next_refresh_at: RwLock::new(DateTime::<Utc>::MIN_UTC),
        }
    }

    /// Whether the refresh deadline has passed.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now >= *read(&self.next_refresh_at)
    }

    /// The current refresh deadline.
    pub fn next_refresh_at(&self) -> DateTime<Utc> {
        *read(&self.next_refresh_at)
    }

    /// Move the refresh deadline.
    pub fn set_next_refresh_at(&self, at: DateTime<Utc>) {
        *write(&self.next_refresh_at) = at;
    }

    /// ETag of the last locale-list response, if any.
    pub fn catalog_etag(&self) -> Option<String> {
        read(&self.catalog_etag).clone()
    }

    /// Store the locale-list ETag.
    pub fn set_catalog_etag(&self, etag: String) {
        *write(&self.catalog_etag) = Some(etag);
    }

    /// Insert or overwrite a catalog entry, keyed by provider locale id.
    pub fn upsert_locale(&self, entry: LocaleEntry) {
        write(&self.locales).insert(entry.id.clone(), entry);
    }

    /// Snapshot of all known catalog entries.
    pub fn locales(&self) -> Vec<LocaleEntry> {
        read(&self.locales).values().cloned().collect()
    }

    /// The full translation map for a locale, if one has been cached.
    pub fn translations_for(&self, locale: &LocaleName) -> Option<TranslationMap> {
        read(&self.translations).get(locale).map(Arc::clone)
    }

    /// Atomically publish a freshly built translation map for a locale.
    pub fn replace_translations(&self, locale: LocaleName, map: HashMap<String, Translation>) {
        write(&self.translations).insert(locale, Arc::new(map));
    }

    /// The stored ETag for a locale's translation document.
    pub fn etag_for(&self, locale: &LocaleName) -> Option<String> {
        read(&self.etags).get(locale).cloned()
    }

    /// Store the ETag for a locale's translation document.
    pub fn set_etag(&self, locale: LocaleName, etag: String) {
        write(&self.etags).insert(locale, etag);
    }
}

impl Default for LocalizationCache {
    fn default() -> Self {
        Self::new()
    }
}
