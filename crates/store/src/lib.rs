//! Gebeta store: the catalog state manager, preferences, and the session that
//! wires them to one persistence gateway.

#![forbid(unsafe_code)]

use std::sync::Arc;

use gebeta_core::{CatalogError, CatalogResult, Recipe};
use gebeta_persist::{Gateway, KvStore};
use tracing::info;

pub mod catalog;
pub mod prefs;
pub mod seed;

pub use catalog::{Catalog, CatalogSnapshot};
pub use prefs::{PrefState, Preferences};
pub use seed::{builtin_recipes, load_seed};

/// State containers for one running app, built once and handed to consumers.
pub struct Session {
    gateway: Gateway,
    catalog: Catalog,
    prefs: Preferences,
}

impl Session {
    /// Hydrate both containers from `kv`. Unreadable state starts empty.
    pub async fn open(kv: Arc<dyn KvStore>, builtin: Vec<Recipe>) -> Self {
        let gateway = Gateway::new(kv);
        let (catalog, prefs) = tokio::join!(
            Catalog::hydrate(gateway.clone(), builtin),
            Preferences::hydrate(gateway.clone()),
        );
        Self { gateway, catalog, prefs }
    }

    pub fn catalog(&self) -> &Catalog { &self.catalog }
    pub fn prefs(&self) -> &Preferences { &self.prefs }

    /// Wipe every stored slot, then reset memory to built-ins and defaults.
    pub async fn clear_all_data(&self) -> CatalogResult<()> {
        self.gateway.clear_all().await.map_err(CatalogError::Persistence)?;
        self.catalog.reset();
        self.prefs.reset();
        info!("all user data cleared");
        Ok(())
    }
}
