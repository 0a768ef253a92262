#![forbid(unsafe_code)]

use std::sync::Arc;

use gebeta_core::{Language, RecipeDraft, Theme};
use gebeta_persist::{KvStore, MemoryStore, Slot};
use gebeta_store::{builtin_recipes, Session};

fn draft(title: &str) -> RecipeDraft {
    let mut d = RecipeDraft::new();
    d.title = title.into();
    d.description = "from the test kitchen".into();
    d.cook_time = "10".into();
    d.servings = "2".into();
    d.add_ingredient().name = "Teff".into();
    d.add_step().instruction = "Mix".into();
    d
}

#[tokio::test]
async fn preferences_default_then_persist() {
    let kv = Arc::new(MemoryStore::new());
    let s = Session::open(kv.clone(), builtin_recipes().unwrap()).await;
    assert_eq!(s.prefs().theme(), Theme::Light);
    assert_eq!(s.prefs().language(), Language::En);
    assert!(!s.prefs().has_completed_onboarding());

    assert_eq!(s.prefs().toggle_theme().await.unwrap(), Theme::Dark);
    assert_eq!(s.prefs().toggle_language().await.unwrap(), Language::Am);
    s.prefs().complete_onboarding().await.unwrap();
    assert_eq!(s.prefs().palette().background, "#121212");
    assert_eq!(s.prefs().t("Favorites", Some("ተወዳጆች")), "ተወዳጆች");

    assert_eq!(kv.get(Slot::Theme).await.unwrap().as_deref(), Some("dark"));
    let again = Session::open(kv, builtin_recipes().unwrap()).await;
    assert!(again.prefs().is_dark());
    assert!(again.prefs().is_amharic());
    assert!(again.prefs().has_completed_onboarding());
}

#[tokio::test]
async fn unknown_stored_theme_falls_back_to_light() {
    let kv = Arc::new(MemoryStore::new());
    kv.set(Slot::Theme, "sepia".into()).await.unwrap();
    let s = Session::open(kv, Vec::new()).await;
    assert_eq!(s.prefs().theme(), Theme::Light);
}

#[tokio::test]
async fn clear_all_data_resets_everything() {
    let kv = Arc::new(MemoryStore::new());
    let seed = builtin_recipes().unwrap();
    let builtin_count = seed.len();
    let s = Session::open(kv.clone(), seed).await;

    let r = draft("Teff Porridge").build("1700000000000".into()).unwrap();
    s.catalog().add_recipe(r).await.unwrap();
    s.catalog().toggle_favorite("1").await.unwrap();
    s.prefs().toggle_theme().await.unwrap();
    assert_eq!(s.catalog().recipes().len(), builtin_count + 1);

    s.clear_all_data().await.unwrap();
    assert_eq!(s.catalog().recipes().len(), builtin_count);
    assert!(s.catalog().favorites().is_empty());
    assert_eq!(s.prefs().theme(), Theme::Light);
    for slot in Slot::ALL {
        assert_eq!(kv.get(slot).await.unwrap(), None, "{} still stored", slot.key());
    }
}

#[tokio::test]
async fn custom_recipes_survive_restart() {
    let kv = Arc::new(MemoryStore::new());
    let s = Session::open(kv.clone(), builtin_recipes().unwrap()).await;
    let r = draft("Ful").build("1700000000001".into()).unwrap();
    s.catalog().add_recipe(r.clone()).await.unwrap();
    drop(s);

    let s = Session::open(kv, builtin_recipes().unwrap()).await;
    assert_eq!(s.catalog().get_by_id(&r.id), Some(r.clone()));
    assert_eq!(s.catalog().recipes().last().map(|x| x.id.as_str()), Some(r.id.as_str()));
    assert_eq!(s.catalog().search("ful").iter().filter(|x| x.id == r.id).count(), 1);
}
