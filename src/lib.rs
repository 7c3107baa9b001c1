//! Translation lookup client with a locally cached provider catalog.
//!
//! The client keeps a process-local copy of a remote translation catalog
//! (locale list plus one flat key -> string document per locale) and keeps it
//! fresh with conditional HTTP requests. Lookups resolve through a
//! locale-fallback chain: the exact locale, progressively shorter locale
//! prefixes, then a configured default locale.
//!
//! # Architecture
//!
//! - `locale`: normalized locale identifiers used as cache keys
//! - `accept_language`: Accept-Language header parsing into a preference list
//! - `cache`: concurrent store of catalog entries, translations, and ETags
//! - `provider`: the remote-provider capability trait and its reqwest adapter
//! - `refresh`: lazy, best-effort catalog refresh with rate-limit handling
//! - `localization`: the public client and the fallback-chain resolver
//!
//! # Example
//!
//! ```rust,ignore
//! use localizations::{AcceptLanguage, Localization, LocalizationOptions};
//!
//! let options = LocalizationOptions::from_env()?;
//! let localization = Localization::new(options);
//! localization.warm_up().await;
//!
//! let header = AcceptLanguage::parse("bg-BG,en;q=0.8")?;
//! let value = localization.get_value_with_header("help_url", &header).await?;
//! ```

pub mod accept_language;
pub mod cache;
pub mod config;
pub mod error;
pub mod locale;
pub mod localization;
pub mod model;
pub mod provider;
mod refresh;

pub use accept_language::AcceptLanguage;
pub use cache::LocalizationCache;
pub use config::LocalizationOptions;
pub use error::Error;
pub use locale::LocaleName;
pub use localization::{Localization, Lookup};
pub use model::{LocaleEntry, Translation};
pub use provider::{CatalogProvider, PhraseClient};
