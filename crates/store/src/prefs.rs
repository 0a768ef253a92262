//! Theme, language and onboarding state, each backed by its own slot.

use std::sync::Arc;

use arc_swap::ArcSwap;
use gebeta_core::{CatalogError, CatalogResult, Language, Palette, Theme};
use gebeta_persist::Gateway;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefState {
    pub theme: Theme,
    pub language: Language,
    pub onboarding_completed: bool,
}

pub struct Preferences {
    gateway: Gateway,
    state: ArcSwap<PrefState>,
}

impl Preferences {
    pub fn new(gateway: Gateway) -> Self { Self { gateway, state: ArcSwap::from_pointee(PrefState::default()) } }

    /// Load saved values; anything unreadable keeps its default.
    pub async fn hydrate(gateway: Gateway) -> Self {
        let me = Self::new(gateway);
        me.reload().await;
        me
    }

    pub async fn reload(&self) {
        let theme = self.gateway.theme().await.unwrap_or_else(|e| {
            warn!(error = %format!("{:#}", e), "loading theme failed");
            None
        });
        let language = self.gateway.language().await.unwrap_or_else(|e| {
            warn!(error = %format!("{:#}", e), "loading language failed");
            None
        });
        let onboarding_completed = self.gateway.onboarding_completed().await.unwrap_or_else(|e| {
            warn!(error = %format!("{:#}", e), "loading onboarding status failed");
            false
        });
        let st = PrefState {
            theme: theme.unwrap_or_default(),
            language: language.unwrap_or_default(),
            onboarding_completed,
        };
        info!(theme = st.theme.as_str(), language = st.language.as_str(), onboarding = st.onboarding_completed, "preferences hydrated");
        self.state.store(Arc::new(st));
    }

    pub fn current(&self) -> PrefState { **self.state.load() }
    pub fn theme(&self) -> Theme { self.current().theme }
    pub fn palette(&self) -> Palette { self.theme().palette() }
    pub fn is_dark(&self) -> bool { self.theme().is_dark() }
    pub fn language(&self) -> Language { self.current().language }
    pub fn is_amharic(&self) -> bool { self.language().is_amharic() }
    pub fn has_completed_onboarding(&self) -> bool { self.current().onboarding_completed }

    /// Pick the string for the active language.
    pub fn t<'a>(&self, en: &'a str, am: Option<&'a str>) -> &'a str { self.language().t(en, am) }

    pub async fn toggle_theme(&self) -> CatalogResult<Theme> {
        let next = self.theme().toggled();
        self.gateway.set_theme(next).await.map_err(CatalogError::Persistence)?;
        self.update(|s| s.theme = next);
        info!(theme = next.as_str(), "theme toggled");
        Ok(next)
    }

    pub async fn toggle_language(&self) -> CatalogResult<Language> {
        let next = self.language().toggled();
        self.gateway.set_language(next).await.map_err(CatalogError::Persistence)?;
        self.update(|s| s.language = next);
        info!(language = next.as_str(), "language toggled");
        Ok(next)
    }

    pub async fn complete_onboarding(&self) -> CatalogResult<()> {
        self.gateway.set_onboarding_completed().await.map_err(CatalogError::Persistence)?;
        self.update(|s| s.onboarding_completed = true);
        Ok(())
    }

    pub fn reset(&self) { self.state.store(Arc::new(PrefState::default())); }

    fn update(&self, f: impl Fn(&mut PrefState)) {
        self.state.rcu(|cur| {
            let mut next = **cur;
            f(&mut next);
            next
        });
    }
}
