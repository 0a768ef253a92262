#![forbid(unsafe_code)]

use gebeta_core::{Category, Difficulty, Recipe};
use gebeta_search::{distinct_regions, filter, search, Filter};

fn recipe(id: &str, title: &str, am: &str, category: &str, difficulty: &str, region: &str) -> Recipe {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": title,
        "titleAmharic": am,
        "description": format!("{} from {}", title, region),
        "descriptionAmharic": "",
        "cookTime": 30,
        "servings": 4,
        "difficulty": difficulty,
        "category": category,
        "isTraditional": true,
        "region": region,
    }))
    .unwrap()
}

fn view() -> Vec<Recipe> {
    vec![
        recipe("1", "Doro Wat", "ዶሮ ወጥ", "meat", "Hard", "Amhara"),
        recipe("2", "Shiro Wat", "ሽሮ ወጥ", "fasting", "Medium", "Tigray"),
        recipe("3", "Kitfo", "ክትፎ", "meat", "Medium", "Gurage"),
        recipe("4", "Buna", "ቡና", "drink", "Easy", "Kaffa"),
        recipe("5", "Mango Juice", "", "drink", "Easy", "Custom"),
    ]
}

fn ids(hits: &[&Recipe]) -> Vec<String> { hits.iter().map(|r| r.id.clone()).collect() }

#[test]
fn blank_query_returns_whole_view_in_order() {
    let v = view();
    assert_eq!(ids(&search(&v, "")), vec!["1", "2", "3", "4", "5"]);
    assert_eq!(ids(&search(&v, "   \t")), vec!["1", "2", "3", "4", "5"]);
}

#[test]
fn substring_is_case_insensitive_and_keeps_order() {
    let v = view();
    assert_eq!(ids(&search(&v, "WAT")), vec!["1", "2"]);
    assert_eq!(ids(&search(&v, "ro w")), vec!["1", "2"]);
    // every substring of a title finds its recipe
    let title = v[2].title.to_lowercase();
    for start in 0..title.len() {
        for end in start + 1..=title.len() {
            let hits = search(&v, &title[start..end]);
            assert!(hits.iter().any(|r| r.id == "3"), "substring {:?}", &title[start..end]);
        }
    }
}

#[test]
fn matches_amharic_category_and_region() {
    let v = view();
    assert_eq!(ids(&search(&v, "ወጥ")), vec!["1", "2"]);
    assert_eq!(ids(&search(&v, "drink")), vec!["4", "5"]);
    assert_eq!(ids(&search(&v, "gurage")), vec!["3"]);
    assert!(search(&v, "pasta").is_empty());
}

#[test]
fn description_is_searched_but_not_amharic_description() {
    let mut v = view();
    v[3].description_amharic = "ልዩ".into();
    assert!(search(&v, "ልዩ").is_empty());
    assert_eq!(ids(&search(&v, "from kaffa")), vec!["4"]);
}

#[test]
fn filter_ands_provided_criteria() {
    let v = view();
    assert_eq!(ids(&filter(&v, &Filter::new())), vec!["1", "2", "3", "4", "5"]);
    assert_eq!(ids(&filter(&v, &Filter::new().category(Category::Meat))), vec!["1", "3"]);
    assert_eq!(
        ids(&filter(&v, &Filter::new().category(Category::Meat).difficulty(Difficulty::Medium))),
        vec!["3"]
    );
    assert_eq!(ids(&filter(&v, &Filter::new().region("Kaffa"))), vec!["4"]);
    // region equality is case-sensitive
    assert!(filter(&v, &Filter::new().region("kaffa")).is_empty());
    assert!(Filter::new().is_empty());
    assert!(!Filter::new().region("x").is_empty());
}

#[test]
fn filter_by_category_returns_exactly_that_category() {
    let v = view();
    for c in Category::ALL {
        let hits = filter(&v, &Filter::new().category(c));
        assert!(hits.iter().all(|r| r.category == c));
        assert_eq!(hits.len(), v.iter().filter(|r| r.category == c).count());
    }
}

#[test]
fn regions_are_distinct_in_first_seen_order() {
    let mut v = view();
    v.push(recipe("6", "Tibs", "ጥብስ", "meat", "Easy", "Amhara"));
    assert_eq!(distinct_regions(&v), vec!["Amhara", "Tigray", "Gurage", "Kaffa", "Custom"]);
}
