//! Catalog state manager: built-in and custom recipes, the favorite set,
//! and their synchronization with the persistence gateway.
//!
//! Readers load an immutable [`CatalogSnapshot`] without blocking. Mutations
//! write the whole affected collection first and only then swap in a new
//! snapshot, so memory never runs ahead of storage. Overlapping mutations are
//! last-committed-write-wins: there is no compare-and-swap between them.

use std::sync::Arc;

use arc_swap::ArcSwap;
use gebeta_core::{CatalogError, CatalogResult, Recipe, RecipeId};
use gebeta_persist::Gateway;
use gebeta_search::Filter;
use rustc_hash::FxHashSet;
use tokio::sync::watch;
use tracing::{info, warn};

/// One consistent state of the catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub epoch: u64,
    builtin: Arc<Vec<Recipe>>,
    custom: Vec<Recipe>,
    favorites: Vec<RecipeId>,
    // derived from builtin ++ custom on construction
    recipes: Vec<Recipe>,
    custom_ids: FxHashSet<RecipeId>,
    favorite_ids: FxHashSet<RecipeId>,
}

impl CatalogSnapshot {
    fn new(epoch: u64, builtin: Arc<Vec<Recipe>>, custom: Vec<Recipe>, favorites: Vec<RecipeId>) -> Self {
        let recipes: Vec<Recipe> = builtin.iter().chain(custom.iter()).cloned().collect();
        let custom_ids = custom.iter().map(|r| r.id.clone()).collect();
        let favorite_ids = favorites.iter().cloned().collect();
        Self { epoch, builtin, custom, favorites, recipes, custom_ids, favorite_ids }
    }

    /// Built-in recipes first in seed order, then custom ones in insertion order.
    pub fn recipes(&self) -> &[Recipe] { &self.recipes }
    pub fn builtin(&self) -> &[Recipe] { &self.builtin }
    pub fn custom(&self) -> &[Recipe] { &self.custom }
    pub fn favorites(&self) -> &[RecipeId] { &self.favorites }

    pub fn is_custom(&self, id: &str) -> bool { self.custom_ids.contains(id) }
    pub fn is_favorite(&self, id: &str) -> bool { self.favorite_ids.contains(id) }
    pub fn contains(&self, id: &str) -> bool { self.recipes.iter().any(|r| r.id == id) }
    pub fn get(&self, id: &str) -> Option<&Recipe> { self.recipes.iter().find(|r| r.id == id) }
}

pub struct Catalog {
    gateway: Gateway,
    builtin: Arc<Vec<Recipe>>,
    snap: ArcSwap<CatalogSnapshot>,
    epoch_tx: watch::Sender<u64>,
}

impl Catalog {
    /// Empty catalog over the given seed; no storage reads.
    pub fn new(gateway: Gateway, builtin: Vec<Recipe>) -> Self {
        let builtin = Arc::new(builtin);
        let snap = CatalogSnapshot::new(0, Arc::clone(&builtin), Vec::new(), Vec::new());
        let (epoch_tx, _) = watch::channel(0u64);
        Self { gateway, builtin, snap: ArcSwap::from_pointee(snap), epoch_tx }
    }

    /// Build and hydrate from storage. Never fails: unreadable slots start empty.
    pub async fn hydrate(gateway: Gateway, builtin: Vec<Recipe>) -> Self {
        let me = Self::new(gateway, builtin);
        me.reload().await;
        me
    }

    /// Re-read favorites and custom recipes. Failures are logged and fall back to empty.
    pub async fn reload(&self) {
        let started = std::time::Instant::now();
        let favorites = match self.gateway.favorite_ids().await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %format!("{:#}", e), "loading favorites failed; starting empty");
                Vec::new()
            }
        };
        let custom = match self.gateway.custom_recipes().await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %format!("{:#}", e), "loading custom recipes failed; starting empty");
                Vec::new()
            }
        };
        let custom = self.drop_colliding(custom);
        let favorites = dedup_ids(favorites);
        info!(
            builtin = self.builtin.len(),
            custom = custom.len(),
            favorites = favorites.len(),
            took_ms = %started.elapsed().as_millis(),
            "catalog hydrated"
        );
        self.commit(custom, favorites);
    }

    // Stored custom recipes that shadow a built-in id would break the disjoint
    // provenance invariant; keep the built-in.
    fn drop_colliding(&self, custom: Vec<Recipe>) -> Vec<Recipe> {
        let mut seen: FxHashSet<RecipeId> = self.builtin.iter().map(|r| r.id.clone()).collect();
        custom
            .into_iter()
            .filter(|r| {
                let fresh = seen.insert(r.id.clone());
                if !fresh {
                    warn!(id = %r.id, "ignoring stored custom recipe with duplicate id");
                }
                fresh
            })
            .collect()
    }

    fn commit(&self, custom: Vec<Recipe>, favorites: Vec<RecipeId>) -> Arc<CatalogSnapshot> {
        let epoch = self.snap.load().epoch.saturating_add(1);
        let next = Arc::new(CatalogSnapshot::new(epoch, Arc::clone(&self.builtin), custom, favorites));
        self.snap.store(Arc::clone(&next));
        self.epoch_tx.send_replace(epoch);
        metrics::gauge!("catalog_recipes", next.recipes.len() as f64);
        metrics::gauge!("catalog_favorites", next.favorites.len() as f64);
        next
    }

    pub fn snapshot(&self) -> Arc<CatalogSnapshot> { self.snap.load_full() }

    /// Notified with the new epoch after every committed change.
    pub fn subscribe_epoch(&self) -> watch::Receiver<u64> { self.epoch_tx.subscribe() }

    pub fn recipes(&self) -> Vec<Recipe> { self.snap.load().recipes.clone() }

    pub fn favorites(&self) -> Vec<RecipeId> { self.snap.load().favorites.clone() }

    pub fn search(&self, query: &str) -> Vec<Recipe> {
        let snap = self.snap.load();
        gebeta_search::search(snap.recipes(), query).into_iter().cloned().collect()
    }

    pub fn filter(&self, f: &Filter) -> Vec<Recipe> {
        let snap = self.snap.load();
        gebeta_search::filter(snap.recipes(), f).into_iter().cloned().collect()
    }

    /// `None` is an expected outcome, e.g. a recipe deleted while it was open.
    pub fn get_by_id(&self, id: &str) -> Option<Recipe> { self.snap.load().get(id).cloned() }

    pub fn is_custom(&self, id: &str) -> bool { self.snap.load().is_custom(id) }

    pub fn is_favorite(&self, id: &str) -> bool { self.snap.load().is_favorite(id) }

    /// Favorites resolved against the view; ids with no recipe are skipped.
    pub fn favorite_recipes(&self) -> Vec<Recipe> {
        let snap = self.snap.load();
        snap.favorites.iter().filter_map(|id| snap.get(id).cloned()).collect()
    }

    pub async fn add_recipe(&self, recipe: Recipe) -> CatalogResult<()> {
        let cur = self.snapshot();
        if cur.contains(&recipe.id) {
            warn!(id = %recipe.id, "add_recipe: id already in catalog");
            return Err(CatalogError::Conflict(recipe.id));
        }
        check_user_recipe(&recipe)?;
        let mut custom = cur.custom.clone();
        let id = recipe.id.clone();
        custom.push(recipe);
        self.persist_custom("add", &custom).await?;
        self.commit(custom, self.snap.load().favorites.clone());
        info!(id = %id, "custom recipe added");
        Ok(())
    }

    /// Whole-record replace of a custom recipe.
    pub async fn update_recipe(&self, recipe: Recipe) -> CatalogResult<()> {
        let cur = self.snapshot();
        let Some(pos) = cur.custom.iter().position(|r| r.id == recipe.id) else {
            return Err(CatalogError::NotEditable(recipe.id));
        };
        check_user_recipe(&recipe)?;
        let mut custom = cur.custom.clone();
        let id = recipe.id.clone();
        custom[pos] = recipe;
        self.persist_custom("update", &custom).await?;
        self.commit(custom, self.snap.load().favorites.clone());
        info!(id = %id, "custom recipe updated");
        Ok(())
    }

    /// Remove a custom recipe and, if favorited, its favorite entry.
    ///
    /// Both slots are written before one snapshot is committed. If the recipe
    /// write succeeds and the favorites write then fails, the removal is
    /// committed with the id still favorited, and
    /// [`CatalogError::PartialDelete`] reports it.
    pub async fn delete_recipe(&self, id: &str) -> CatalogResult<()> {
        let cur = self.snapshot();
        if !cur.is_custom(id) {
            return Err(CatalogError::NotEditable(id.to_string()));
        }
        let custom: Vec<Recipe> = cur.custom.iter().filter(|r| r.id != id).cloned().collect();
        self.persist_custom("delete", &custom).await?;

        let stored_favorites = self.snap.load().favorites.clone();
        if !stored_favorites.iter().any(|f| f == id) {
            self.commit(custom, stored_favorites);
            info!(id = %id, "custom recipe deleted");
            return Ok(());
        }
        let favorites: Vec<RecipeId> = stored_favorites.iter().filter(|f| f.as_str() != id).cloned().collect();
        if let Err(e) = self.gateway.set_favorite_ids(&favorites).await {
            metrics::counter!("catalog_persist_failures_total", 1u64, "op" => "delete");
            warn!(id = %id, error = %format!("{:#}", e), "favorites not pruned after delete");
            self.commit(custom, stored_favorites);
            return Err(CatalogError::PartialDelete { id: id.to_string(), cause: e });
        }
        self.commit(custom, favorites);
        info!(id = %id, "custom recipe and its favorite deleted");
        Ok(())
    }

    /// Flip favorite membership for `id`. Returns the new membership.
    /// Unknown ids are accepted; dangling favorites are dropped at read time.
    pub async fn toggle_favorite(&self, id: &str) -> CatalogResult<bool> {
        let cur = self.snapshot();
        let now_favorite = !cur.is_favorite(id);
        let favorites: Vec<RecipeId> = if now_favorite {
            cur.favorites.iter().cloned().chain(std::iter::once(id.to_string())).collect()
        } else {
            cur.favorites.iter().filter(|f| f.as_str() != id).cloned().collect()
        };
        if let Err(e) = self.gateway.set_favorite_ids(&favorites).await {
            metrics::counter!("catalog_persist_failures_total", 1u64, "op" => "toggle_favorite");
            warn!(id = %id, error = %format!("{:#}", e), "toggle_favorite: persist failed");
            return Err(CatalogError::Persistence(e));
        }
        self.commit(self.snap.load().custom.clone(), favorites);
        metrics::counter!("catalog_mutations_total", 1u64, "op" => "toggle_favorite");
        info!(id = %id, favorite = now_favorite, "favorite toggled");
        Ok(now_favorite)
    }

    /// Drop custom recipes and favorites from memory. Storage is the caller's job.
    pub fn reset(&self) {
        self.commit(Vec::new(), Vec::new());
        info!("catalog reset to built-ins");
    }

    async fn persist_custom(&self, op: &'static str, custom: &[Recipe]) -> CatalogResult<()> {
        match self.gateway.set_custom_recipes(custom).await {
            Ok(()) => {
                metrics::counter!("catalog_mutations_total", 1u64, "op" => op);
                Ok(())
            }
            Err(e) => {
                metrics::counter!("catalog_persist_failures_total", 1u64, "op" => op);
                warn!(op, error = %format!("{:#}", e), "persisting custom recipes failed");
                Err(CatalogError::Persistence(e))
            }
        }
    }
}

fn check_user_recipe(r: &Recipe) -> CatalogResult<()> {
    if r.is_traditional {
        return Err(CatalogError::Validation(format!("recipe {}: user recipes cannot be traditional", r.id)));
    }
    if r.cook_time == 0 {
        return Err(CatalogError::Validation(format!("recipe {}: cook time must be positive", r.id)));
    }
    if r.servings == 0 {
        return Err(CatalogError::Validation(format!("recipe {}: servings must be positive", r.id)));
    }
    if !r.steps_are_contiguous() {
        return Err(CatalogError::Validation(format!("recipe {}: step numbers must run 1..=n", r.id)));
    }
    Ok(())
}

fn dedup_ids(ids: Vec<RecipeId>) -> Vec<RecipeId> {
    let mut seen: FxHashSet<RecipeId> = FxHashSet::default();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
