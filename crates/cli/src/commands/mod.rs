//! Command implementations.

pub mod account;
pub mod admin;
pub mod shop;

use std::time::Duration;

use wirecrest_storefront::StorefrontError;
use wirecrest_storefront::backend::CommerceClient;
use wirecrest_storefront::cart::CartStore;
use wirecrest_storefront::config::StorefrontConfig;
use wirecrest_storefront::storage::ClientStorage;

/// Everything a storefront command needs.
pub struct Context {
    pub config: StorefrontConfig,
    pub storage: ClientStorage,
    pub backend: CommerceClient,
}

impl Context {
    /// Load configuration and open storage and the backend client.
    pub fn load() -> Result<Self, StorefrontError> {
        let config = StorefrontConfig::from_env()?;
        let storage = ClientStorage::open(&config.data_dir)?;
        let backend = CommerceClient::new(&config.backend_url);
        Ok(Self {
            config,
            storage,
            backend,
        })
    }

    /// Connect a cart store over this context.
    pub async fn cart(&self) -> CartStore {
        CartStore::connect(self.backend.clone(), self.storage.clone(), self.config.cart).await
    }
}

/// Wait for the store's background work (debounced writes, reconciliation
/// fetches) to go quiet before the process exits.
///
/// Cart operations complete asynchronously; a one-shot CLI has to drain
/// them explicitly where a long-lived view would just keep rendering.
pub async fn settle(store: &CartStore) {
    const QUIET: Duration = Duration::from_millis(750);

    let mut changes = store.subscribe();
    while let Ok(Ok(())) = tokio::time::timeout(QUIET, changes.changed()).await {}
}
