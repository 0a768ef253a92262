//! Built-in recipe set. Bundled JSON by default, or a replacement file.

use std::path::Path;

use anyhow::{bail, Context, Result};
use gebeta_core::Recipe;
use rustc_hash::FxHashSet;

const BUNDLED: &str = include_str!("../seed/recipes.json");

pub fn builtin_recipes() -> Result<Vec<Recipe>> { parse_seed(BUNDLED).context("parsing bundled seed") }

pub fn load_seed(path: &Path) -> Result<Vec<Recipe>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading seed {}", path.display()))?;
    parse_seed(&raw).with_context(|| format!("parsing seed {}", path.display()))
}

/// Seed records are always traditional and must have unique ids.
pub fn parse_seed(raw: &str) -> Result<Vec<Recipe>> {
    let mut recipes: Vec<Recipe> = serde_json::from_str(raw)?;
    let mut seen = FxHashSet::default();
    for r in recipes.iter_mut() {
        if !seen.insert(r.id.clone()) {
            bail!("duplicate seed recipe id {}", r.id);
        }
        r.is_traditional = true;
    }
    Ok(recipes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_seed_is_well_formed() {
        let seed = builtin_recipes().unwrap();
        assert!(seed.len() >= 6);
        for r in &seed {
            assert!(r.is_traditional);
            assert!(r.steps_are_contiguous(), "recipe {}", r.id);
            assert!(r.cook_time > 0 && r.servings > 0);
            assert!(!r.ingredients.is_empty());
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let raw = serde_json::json!([
            { "id": "x", "title": "A", "titleAmharic": "", "description": "", "descriptionAmharic": "",
              "cookTime": 1, "servings": 1, "difficulty": "Easy", "category": "snack", "region": "R" },
            { "id": "x", "title": "B", "titleAmharic": "", "description": "", "descriptionAmharic": "",
              "cookTime": 1, "servings": 1, "difficulty": "Easy", "category": "snack", "region": "R" }
        ]);
        assert!(parse_seed(&raw.to_string()).is_err());
    }
}
