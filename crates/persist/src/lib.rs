//! Gebeta persistence: named key-value slots and a typed gateway over them.
//! Every write replaces a whole slot; there is no partial update API.

#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use gebeta_core::{Language, Recipe, RecipeId, Theme};
use metrics::{counter, histogram};
use tracing::debug;

mod sqlite;

pub use sqlite::SqliteStore;

/// Named storage slots. Keys match the mobile app's storage layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Favorites,
    Recipes,
    Theme,
    Language,
    Onboarding,
}

impl Slot {
    pub const ALL: [Slot; 5] = [Slot::Favorites, Slot::Recipes, Slot::Theme, Slot::Language, Slot::Onboarding];

    pub fn key(&self) -> &'static str {
        match self {
            Slot::Favorites => "@favorites",
            Slot::Recipes => "@recipes",
            Slot::Theme => "@theme",
            Slot::Language => "@language",
            Slot::Onboarding => "@onboarding_completed",
        }
    }
}

/// Raw asynchronous key-value backend.
#[async_trait::async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, slot: Slot) -> Result<Option<String>>;
    async fn set(&self, slot: Slot, value: String) -> Result<()>;
    async fn remove(&self, slots: &[Slot]) -> Result<()>;
}

/// Process-local store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<Slot, String>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Slot, String>>> {
        self.map.lock().map_err(|_| anyhow!("memory store mutex poisoned"))
    }
}

#[async_trait::async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, slot: Slot) -> Result<Option<String>> { Ok(self.lock()?.get(&slot).cloned()) }

    async fn set(&self, slot: Slot, value: String) -> Result<()> {
        self.lock()?.insert(slot, value);
        Ok(())
    }

    async fn remove(&self, slots: &[Slot]) -> Result<()> {
        let mut map = self.lock()?;
        for s in slots {
            map.remove(s);
        }
        Ok(())
    }
}

/// Typed access to the slots. JSON-encoded collections, plain-text scalars.
#[derive(Clone)]
pub struct Gateway {
    kv: Arc<dyn KvStore>,
}

impl Gateway {
    pub fn new(kv: Arc<dyn KvStore>) -> Self { Self { kv } }

    pub fn in_memory() -> Self { Self::new(Arc::new(MemoryStore::new())) }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, slot: Slot) -> Result<Option<T>> {
        let Some(raw) = self.kv.get(slot).await.with_context(|| format!("reading {}", slot.key()))? else {
            return Ok(None);
        };
        let v = serde_json::from_str(&raw).with_context(|| format!("decoding {}", slot.key()))?;
        Ok(Some(v))
    }

    async fn put(&self, slot: Slot, value: String) -> Result<()> {
        let started = std::time::Instant::now();
        let bytes = value.len();
        self.kv.set(slot, value).await.with_context(|| format!("writing {}", slot.key()))?;
        histogram!("persist_set_ms", started.elapsed().as_secs_f64() * 1000.0);
        counter!("persist_set_total", 1u64, "slot" => slot.key());
        debug!(slot = slot.key(), bytes, "slot written");
        Ok(())
    }

    pub async fn favorite_ids(&self) -> Result<Vec<RecipeId>> {
        Ok(self.get_json(Slot::Favorites).await?.unwrap_or_default())
    }

    pub async fn set_favorite_ids(&self, ids: &[RecipeId]) -> Result<()> {
        self.put(Slot::Favorites, serde_json::to_string(ids)?).await
    }

    pub async fn custom_recipes(&self) -> Result<Vec<Recipe>> {
        Ok(self.get_json(Slot::Recipes).await?.unwrap_or_default())
    }

    pub async fn set_custom_recipes(&self, recipes: &[Recipe]) -> Result<()> {
        self.put(Slot::Recipes, serde_json::to_string(recipes)?).await
    }

    pub async fn theme(&self) -> Result<Option<Theme>> {
        match self.kv.get(Slot::Theme).await? {
            Some(raw) => Ok(Some(raw.parse()?)),
            None => Ok(None),
        }
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<()> { self.put(Slot::Theme, theme.as_str().to_string()).await }

    pub async fn language(&self) -> Result<Option<Language>> {
        match self.kv.get(Slot::Language).await? {
            Some(raw) => Ok(Some(raw.parse()?)),
            None => Ok(None),
        }
    }

    pub async fn set_language(&self, lang: Language) -> Result<()> {
        self.put(Slot::Language, lang.as_str().to_string()).await
    }

    pub async fn onboarding_completed(&self) -> Result<bool> {
        Ok(self.kv.get(Slot::Onboarding).await?.as_deref() == Some("true"))
    }

    pub async fn set_onboarding_completed(&self) -> Result<()> { self.put(Slot::Onboarding, "true".to_string()).await }

    /// Drop every slot (user data reset).
    pub async fn clear_all(&self) -> Result<()> {
        self.kv.remove(&Slot::ALL).await.context("clearing all slots")?;
        counter!("persist_clear_total", 1u64);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gebeta_core::{Category, Difficulty};

    fn recipe(id: &str) -> Recipe {
        Recipe {
            id: id.into(),
            title: "Kolo".into(),
            title_amharic: "ቆሎ".into(),
            description: "Roasted barley".into(),
            description_amharic: String::new(),
            image: None,
            cook_time: 15,
            servings: 4,
            difficulty: Difficulty::Easy,
            category: Category::Snack,
            is_traditional: false,
            region: "Custom".into(),
            ingredients: Vec::new(),
            steps: Vec::new(),
            tips: None,
            tips_amharic: None,
        }
    }

    #[tokio::test]
    async fn missing_slots_read_as_empty() {
        let gw = Gateway::in_memory();
        assert!(gw.favorite_ids().await.unwrap().is_empty());
        assert!(gw.custom_recipes().await.unwrap().is_empty());
        assert_eq!(gw.theme().await.unwrap(), None);
        assert!(!gw.onboarding_completed().await.unwrap());
    }

    #[tokio::test]
    async fn whole_collections_replace() {
        let gw = Gateway::in_memory();
        gw.set_custom_recipes(&[recipe("1"), recipe("2")]).await.unwrap();
        gw.set_custom_recipes(&[recipe("2")]).await.unwrap();
        let got = gw.custom_recipes().await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, "2");
    }

    #[tokio::test]
    async fn corrupt_json_is_an_error() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(Slot::Favorites, "{not json".into()).await.unwrap();
        let gw = Gateway::new(kv);
        assert!(gw.favorite_ids().await.is_err());
    }

    #[tokio::test]
    async fn clear_all_resets_preferences() {
        let gw = Gateway::in_memory();
        gw.set_theme(Theme::Dark).await.unwrap();
        gw.set_language(Language::Am).await.unwrap();
        gw.set_onboarding_completed().await.unwrap();
        gw.set_favorite_ids(&["1".to_string()]).await.unwrap();
        assert_eq!(gw.theme().await.unwrap(), Some(Theme::Dark));
        assert_eq!(gw.language().await.unwrap(), Some(Language::Am));
        gw.clear_all().await.unwrap();
        assert_eq!(gw.theme().await.unwrap(), None);
        assert_eq!(gw.language().await.unwrap(), None);
        assert!(!gw.onboarding_completed().await.unwrap());
        assert!(gw.favorite_ids().await.unwrap().is_empty());
    }
}
