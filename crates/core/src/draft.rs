//! Recipe drafts: form state for authoring, validated into a `Recipe`.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::{renumber_steps, CatalogError, Category, Difficulty, Ingredient, Language, Recipe, RecipeId, RecipeStep};

/// Region used when the author leaves it blank.
pub const DEFAULT_REGION: &str = "Custom";

/// Fresh recipe id from the wall clock (milliseconds since epoch).
pub fn next_recipe_id() -> RecipeId { chrono::Utc::now().timestamp_millis().to_string() }

fn part_id() -> String { uuid::Uuid::new_v4().to_string() }

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct IngredientDraft {
    pub id: String,
    pub name: String,
    pub name_amharic: String,
    pub amount: String,
    pub unit: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct StepDraft {
    pub id: String,
    pub instruction: String,
    pub instruction_amharic: String,
    pub image: Option<String>,
    pub timer: u32,
}

/// Editable form values. Numbers stay text until `validate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeDraft {
    pub title: String,
    pub title_amharic: String,
    pub description: String,
    pub description_amharic: String,
    pub image: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub cook_time: String,
    #[serde(deserialize_with = "text_or_number")]
    pub servings: String,
    pub difficulty: Difficulty,
    pub category: Category,
    pub region: String,
    pub ingredients: Vec<IngredientDraft>,
    pub steps: Vec<StepDraft>,
    pub tips: String,
    pub tips_amharic: String,
}

impl Default for RecipeDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            title_amharic: String::new(),
            description: String::new(),
            description_amharic: String::new(),
            image: None,
            cook_time: String::new(),
            servings: String::new(),
            difficulty: Difficulty::Easy,
            category: Category::Vegetarian,
            region: String::new(),
            ingredients: Vec::new(),
            steps: Vec::new(),
            tips: String::new(),
            tips_amharic: String::new(),
        }
    }
}

fn text_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }
    Ok(match Raw::deserialize(de)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// First problem found in a draft, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftIssue {
    MissingTitle,
    MissingDescription,
    InvalidCookTime,
    InvalidServings,
    NoIngredients,
    NoSteps,
}

impl DraftIssue {
    pub fn message(&self, lang: Language) -> &'static str {
        let (en, am) = match self {
            DraftIssue::MissingTitle => ("Please enter a recipe title", "የምግቡን ስም ያስገቡ"),
            DraftIssue::MissingDescription => ("Please enter a description", "መግለጫ ያስገቡ"),
            DraftIssue::InvalidCookTime => ("Please enter a valid cook time", "ትክክለኛ የማብሰያ ጊዜ ያስገቡ"),
            DraftIssue::InvalidServings => ("Please enter a valid number of servings", "ትክክለኛ የሚያገለግል ብዛት ያስገቡ"),
            DraftIssue::NoIngredients => ("Please add at least one ingredient", "ቢያንስ አንድ ንጥረ ነገር ያስገቡ"),
            DraftIssue::NoSteps => ("Please add at least one cooking step", "ቢያንስ አንድ የማብሰያ ደረጃ ያስገቡ"),
        };
        lang.pick(en, am)
    }
}

impl std::fmt::Display for DraftIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.message(Language::En)) }
}

impl std::error::Error for DraftIssue {}

impl From<DraftIssue> for CatalogError {
    fn from(issue: DraftIssue) -> Self { CatalogError::Validation(issue.to_string()) }
}

fn positive(s: &str) -> Option<u32> { s.trim().parse::<u32>().ok().filter(|n| *n > 0) }

fn non_blank(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() { None } else { Some(s.to_string()) }
}

impl RecipeDraft {
    pub fn new() -> Self { Self::default() }

    /// Draft pre-filled from an existing recipe, for edit flows.
    pub fn from_recipe(r: &Recipe) -> Self {
        Self {
            title: r.title.clone(),
            title_amharic: r.title_amharic.clone(),
            description: r.description.clone(),
            description_amharic: r.description_amharic.clone(),
            image: r.image.clone(),
            cook_time: r.cook_time.to_string(),
            servings: r.servings.to_string(),
            difficulty: r.difficulty,
            category: r.category,
            region: r.region.clone(),
            ingredients: r
                .ingredients
                .iter()
                .map(|i| IngredientDraft {
                    id: i.id.clone(),
                    name: i.name.clone(),
                    name_amharic: i.name_amharic.clone(),
                    amount: i.amount.clone(),
                    unit: i.unit.clone(),
                })
                .collect(),
            steps: r
                .steps
                .iter()
                .map(|s| StepDraft {
                    id: s.id.clone(),
                    instruction: s.instruction.clone(),
                    instruction_amharic: s.instruction_amharic.clone(),
                    image: s.image.clone(),
                    timer: s.timer.unwrap_or(0),
                })
                .collect(),
            tips: r.tips.clone().unwrap_or_default(),
            tips_amharic: r.tips_amharic.clone().unwrap_or_default(),
        }
    }

    pub fn add_ingredient(&mut self) -> &mut IngredientDraft {
        self.ingredients.push(IngredientDraft { id: part_id(), ..Default::default() });
        let last = self.ingredients.len() - 1;
        &mut self.ingredients[last]
    }

    pub fn remove_ingredient(&mut self, index: usize) -> Option<IngredientDraft> {
        (index < self.ingredients.len()).then(|| self.ingredients.remove(index))
    }

    pub fn add_step(&mut self) -> &mut StepDraft {
        self.steps.push(StepDraft { id: part_id(), ..Default::default() });
        let last = self.steps.len() - 1;
        &mut self.steps[last]
    }

    /// Remove a step; later steps shift down one number when built.
    pub fn remove_step(&mut self, index: usize) -> Option<StepDraft> {
        (index < self.steps.len()).then(|| self.steps.remove(index))
    }

    pub fn validate(&self) -> Result<(), DraftIssue> {
        if self.title.trim().is_empty() {
            return Err(DraftIssue::MissingTitle);
        }
        if self.description.trim().is_empty() {
            return Err(DraftIssue::MissingDescription);
        }
        if positive(&self.cook_time).is_none() {
            return Err(DraftIssue::InvalidCookTime);
        }
        if positive(&self.servings).is_none() {
            return Err(DraftIssue::InvalidServings);
        }
        if self.ingredients.is_empty() {
            return Err(DraftIssue::NoIngredients);
        }
        if self.steps.is_empty() {
            return Err(DraftIssue::NoSteps);
        }
        Ok(())
    }

    /// Validate and produce a user-authored recipe with the given id.
    pub fn build(&self, id: RecipeId) -> Result<Recipe, CatalogError> {
        if let Err(issue) = self.validate() {
            warn!(id = %id, issue = ?issue, "draft rejected");
            return Err(issue.into());
        }
        let ingredients = self
            .ingredients
            .iter()
            .map(|i| Ingredient {
                id: if i.id.is_empty() { part_id() } else { i.id.clone() },
                name: i.name.clone(),
                name_amharic: i.name_amharic.clone(),
                amount: i.amount.clone(),
                unit: i.unit.clone(),
            })
            .collect();
        let mut steps: Vec<RecipeStep> = self
            .steps
            .iter()
            .map(|s| RecipeStep {
                id: if s.id.is_empty() { part_id() } else { s.id.clone() },
                step_number: 0,
                instruction: s.instruction.clone(),
                instruction_amharic: s.instruction_amharic.clone(),
                image: s.image.clone(),
                timer: (s.timer > 0).then_some(s.timer),
            })
            .collect();
        renumber_steps(&mut steps);
        debug!(id = %id, ingredients = self.ingredients.len(), steps = steps.len(), "draft built");
        Ok(Recipe {
            id,
            title: self.title.clone(),
            title_amharic: self.title_amharic.clone(),
            description: self.description.clone(),
            description_amharic: self.description_amharic.clone(),
            image: self.image.clone(),
            cook_time: positive(&self.cook_time).unwrap_or(1),
            servings: positive(&self.servings).unwrap_or(1),
            difficulty: self.difficulty,
            category: self.category,
            is_traditional: false,
            region: non_blank(&self.region).unwrap_or_else(|| DEFAULT_REGION.to_string()),
            ingredients,
            steps,
            tips: non_blank(&self.tips),
            tips_amharic: non_blank(&self.tips_amharic),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> RecipeDraft {
        let mut d = RecipeDraft::new();
        d.title = "Atayef".into();
        d.description = "Sweet dumplings".into();
        d.cook_time = " 25 ".into();
        d.servings = "4".into();
        d.category = Category::Snack;
        let ing = d.add_ingredient();
        ing.name = "Flour".into();
        ing.amount = "a pinch".into();
        d.add_step().instruction = "Mix".into();
        d.add_step().instruction = "Fry".into();
        let third = d.add_step();
        third.instruction = "Serve".into();
        third.timer = 90;
        d
    }

    #[test]
    fn reports_first_issue_in_form_order() {
        let mut d = filled();
        d.title = "  ".into();
        d.servings = "x".into();
        assert_eq!(d.validate(), Err(DraftIssue::MissingTitle));
        d.title = "T".into();
        assert_eq!(d.validate(), Err(DraftIssue::InvalidServings));
        d.servings = "0".into();
        assert_eq!(d.validate(), Err(DraftIssue::InvalidServings));
        d.servings = "2".into();
        d.steps.clear();
        assert_eq!(d.validate(), Err(DraftIssue::NoSteps));
        assert_eq!(DraftIssue::NoSteps.message(Language::Am), "ቢያንስ አንድ የማብሰያ ደረጃ ያስገቡ");
    }

    #[test]
    fn builds_custom_recipe_with_defaults() {
        let mut d = filled();
        d.remove_step(0).unwrap();
        assert!(d.remove_step(9).is_none());
        let r = d.build("1700000000001".into()).unwrap();
        assert_eq!(r.region, DEFAULT_REGION);
        assert!(!r.is_traditional);
        assert_eq!(r.cook_time, 25);
        assert!(r.steps_are_contiguous());
        assert_eq!(r.steps[0].instruction, "Fry");
        assert_eq!(r.steps[0].timer, None);
        assert_eq!(r.steps[1].timer, Some(90));
        assert_eq!(r.tips, None);
        assert_eq!(r.ingredients[0].amount, "a pinch");
    }

    #[test]
    fn build_rejects_invalid_draft() {
        let mut d = filled();
        d.cook_time = "0".into();
        let err = d.build("7".into()).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ref m) if m == "Please enter a valid cook time"));
    }

    #[test]
    fn edit_draft_round_trips_recipe() {
        let r = filled().build("42".into()).unwrap();
        let again = RecipeDraft::from_recipe(&r).build("42".into()).unwrap();
        assert_eq!(r, again);
    }

    #[test]
    fn accepts_numeric_json_fields() {
        let d: RecipeDraft = serde_json::from_value(serde_json::json!({
            "title": "Buna", "description": "Coffee", "cookTime": 20, "servings": "6",
            "category": "drink", "ingredients": [{ "name": "Beans" }],
            "steps": [{ "instruction": "Roast" }]
        }))
        .unwrap();
        assert_eq!(d.cook_time, "20");
        let r = d.build(next_recipe_id()).unwrap();
        assert_eq!(r.category, Category::Drink);
        assert!(!r.ingredients[0].id.is_empty());
    }
}
