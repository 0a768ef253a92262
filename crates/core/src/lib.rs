//! Gebeta core types: the recipe record, its parts, and the error taxonomy.

#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod draft;
pub mod prefs;
pub mod timer;

pub use draft::{next_recipe_id, DraftIssue, IngredientDraft, RecipeDraft, StepDraft};
pub use prefs::{Language, Palette, Theme};
pub use timer::{format_clock, Countdown};

/// Opaque recipe identity. Assigned once at creation, never rewritten.
pub type RecipeId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Vegetarian,
    Meat,
    Fasting,
    Breakfast,
    Snack,
    Drink,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Vegetarian,
        Category::Meat,
        Category::Fasting,
        Category::Breakfast,
        Category::Snack,
        Category::Drink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Vegetarian => "vegetarian",
            Category::Meat => "meat",
            Category::Fasting => "fasting",
            Category::Breakfast => "breakfast",
            Category::Snack => "snack",
            Category::Drink => "drink",
        }
    }

    /// Chip label as `(english, amharic)`.
    pub fn label(&self) -> (&'static str, &'static str) {
        match self {
            Category::Vegetarian => ("Vegetarian", "የእጽዋት"),
            Category::Meat => ("Meat", "ሥጋ"),
            Category::Fasting => ("Fasting", "ጾም"),
            Category::Breakfast => ("Breakfast", "ቁርስ"),
            Category::Snack => ("Snack", "መክሰስ"),
            Category::Drink => ("Drink", "መጠጥ"),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.pad(self.as_str()) }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.pad(self.as_str()) }
}

// Parsing is exact: filter criteria compare case-sensitively.
impl FromStr for Difficulty {
    type Err = CatalogError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| CatalogError::Validation(format!("unknown difficulty '{}'", s)))
    }
}

impl FromStr for Category {
    type Err = CatalogError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CatalogError::Validation(format!("unknown category '{}'", s)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub name_amharic: String,
    /// Free text on purpose: "a pinch" is a valid amount.
    pub amount: String,
    pub unit: String,
}

impl Ingredient {
    pub fn localized_name(&self, lang: Language) -> &str { lang.pick(&self.name, &self.name_amharic) }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeStep {
    pub id: String,
    /// 1-based, equal to the step's position in its recipe.
    pub step_number: u32,
    pub instruction: String,
    pub instruction_amharic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Seconds. `None` and `Some(0)` both mean no timer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<u32>,
}

impl RecipeStep {
    pub fn localized_instruction(&self, lang: Language) -> &str {
        lang.pick(&self.instruction, &self.instruction_amharic)
    }

    pub fn timer_secs(&self) -> Option<u32> { self.timer.filter(|t| *t > 0) }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    pub title_amharic: String,
    pub description: String,
    pub description_amharic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Minutes.
    pub cook_time: u32,
    pub servings: u32,
    pub difficulty: Difficulty,
    pub category: Category,
    #[serde(default)]
    pub is_traditional: bool,
    pub region: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<RecipeStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips_amharic: Option<String>,
}

impl Recipe {
    pub fn localized_title(&self, lang: Language) -> &str { lang.pick(&self.title, &self.title_amharic) }

    pub fn localized_description(&self, lang: Language) -> &str {
        lang.pick(&self.description, &self.description_amharic)
    }

    pub fn localized_tips(&self, lang: Language) -> Option<&str> {
        let en = self.tips.as_deref()?;
        Some(lang.pick(en, self.tips_amharic.as_deref().unwrap_or("")))
    }

    pub fn steps_are_contiguous(&self) -> bool {
        self.steps.iter().enumerate().all(|(i, s)| s.step_number as usize == i + 1)
    }

    /// Sum of all step timers, in seconds.
    pub fn total_timer_secs(&self) -> u64 {
        self.steps.iter().filter_map(|s| s.timer_secs()).map(u64::from).sum()
    }
}

/// Rewrite step numbers to `1..=n` in sequence order.
pub fn renumber_steps(steps: &mut [RecipeStep]) {
    for (i, s) in steps.iter_mut().enumerate() {
        s.step_number = i as u32 + 1;
    }
}

/// Failures surfaced by catalog and preference mutations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("persistence: {0:#}")]
    Persistence(anyhow::Error),
    #[error("not editable: recipe {0} is not a custom recipe")]
    NotEditable(RecipeId),
    #[error("conflict: recipe id {0} already exists")]
    Conflict(RecipeId),
    #[error("recipe {id} deleted but favorites were not updated: {cause:#}")]
    PartialDelete { id: RecipeId, cause: anyhow::Error },
    #[error("validation: {0}")]
    Validation(String),
}

impl CatalogError {
    /// Transient failures worth offering a retry for.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogError::Persistence(_) | CatalogError::PartialDelete { .. })
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

pub mod prelude {
    pub use super::{
        CatalogError, CatalogResult, Category, Difficulty, Ingredient, Language, Recipe, RecipeId, RecipeStep,
        Theme,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(n: u32, timer: Option<u32>) -> RecipeStep {
        RecipeStep {
            id: format!("s{}", n),
            step_number: n,
            instruction: format!("step {}", n),
            instruction_amharic: String::new(),
            image: None,
            timer,
        }
    }

    #[test]
    fn parses_enums_exactly() {
        assert_eq!("drink".parse::<Category>().unwrap(), Category::Drink);
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("Drink".parse::<Category>().is_err());
        assert!("hard".parse::<Difficulty>().is_err());
    }

    #[test]
    fn deserializes_legacy_blob() {
        let raw = serde_json::json!({
            "id": "1700000000000",
            "title": "Shiro",
            "titleAmharic": "ሽሮ",
            "description": "Chickpea stew",
            "descriptionAmharic": "",
            "cookTime": 30,
            "servings": 4,
            "difficulty": "Easy",
            "category": "fasting",
            "isFavorite": true,
            "isTraditional": false,
            "region": "Custom",
            "ingredients": [],
            "steps": [{ "id": "a", "stepNumber": 1, "instruction": "Boil", "instructionAmharic": "", "timer": 0 }]
        });
        let r: Recipe = serde_json::from_value(raw).unwrap();
        assert_eq!(r.category, Category::Fasting);
        assert_eq!(r.steps[0].timer_secs(), None);
        let back = serde_json::to_value(&r).unwrap();
        assert_eq!(back["cookTime"], 30);
        assert!(back.get("isFavorite").is_none());
    }

    #[test]
    fn renumbers_after_removal() {
        let mut steps = vec![step(1, None), step(2, Some(60)), step(3, Some(0))];
        steps.remove(0);
        renumber_steps(&mut steps);
        assert_eq!(steps.iter().map(|s| s.step_number).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn localized_text_falls_back_to_english() {
        let mut s = step(1, None);
        assert_eq!(s.localized_instruction(Language::Am), "step 1");
        s.instruction_amharic = "ደረጃ".into();
        assert_eq!(s.localized_instruction(Language::Am), "ደረጃ");
        assert_eq!(s.localized_instruction(Language::En), "step 1");
    }
}
