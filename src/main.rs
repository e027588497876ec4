//! Cache DB demo
//!
//! Persists a short-lived entry, restores it into a fresh store and watches
//! it expire.

use std::thread::sleep;
use std::time::Duration;

use anyhow::{ensure, Context};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_db::{Store, StoreConfig};

const SNAPSHOT_FILE: &str = "test.db";

/// TTL used when `CACHE_DB_DEFAULT_TTL` is not set
const FALLBACK_TTL: Duration = Duration::from_secs(2);

fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = StoreConfig::from_env();
    if config.default_ttl.is_zero() {
        config.default_ttl = FALLBACK_TTL;
    }
    info!(
        "Configuration loaded: default_ttl={:?}, base_path={}",
        config.default_ttl,
        config.base_path.display()
    );

    let store: Store<String, String> = Store::from_config(&config);
    store.set("foo".to_string(), "bar".to_string());
    store.persist(SNAPSHOT_FILE).context("persist failed")?;

    let restored: Store<String, String> =
        Store::from_config(&config.clone().with_default_ttl(Duration::ZERO));
    restored.load(SNAPSHOT_FILE).context("load failed")?;

    let value = restored.get(&"foo".to_string());
    ensure!(value.is_some(), "key missing after load");
    info!("Loaded value: {:?}", value);

    let wait = config.default_ttl + Duration::from_secs(1);
    info!("Waiting {:?} for expiry...", wait);
    sleep(wait);

    ensure!(
        restored.get(&"foo".to_string()).is_none(),
        "foo should be expired but is still alive"
    );
    info!("foo expired as expected");

    restored.delete_file(SNAPSHOT_FILE).context("delete file failed")?;
    info!("Deleted {}", SNAPSHOT_FILE);

    Ok(())
}
