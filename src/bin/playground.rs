//! Interactive playground: point it at a real project via environment
//! variables and watch a few lookups resolve.

use anyhow::Result;
use localizations::{AcceptLanguage, Localization, LocalizationOptions};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when the variables are already exported)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("localizations=debug".parse()?),
        )
        .init();

    let options = LocalizationOptions::from_env()?;
    let localization = Localization::new(options);

    info!("Warming up the translation cache");
    localization.warm_up().await;
    info!("Cached {} locales", localization.cache().locales().len());

    let by_key = localization.get("help_url", "en").await?;
    info!("get(help_url, en) -> {:?}", by_key);

    let header = AcceptLanguage::parse("zh-Hant,en;q=0.8")?;
    let by_header = localization.get_value_with_header("help_url", &header).await?;
    info!("get_value_with_header(help_url, zh-Hant/en) -> {}", by_header);

    let all = localization.get_all_values("en").await?;
    info!("get_all_values(en) -> {} entries", all.len());

    Ok(())
}
