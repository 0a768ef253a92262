//! Theme and language preference values.

use serde::{Deserialize, Serialize};

use crate::CatalogError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(&self) -> bool { matches!(self, Theme::Dark) }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::Light => LIGHT,
            Theme::Dark => DARK,
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = CatalogError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(CatalogError::Validation(format!("unknown theme '{}'", other))),
        }
    }
}

/// Hex colour set for one theme.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub background: &'static str,
    pub surface: &'static str,
    pub text: &'static str,
    pub text_secondary: &'static str,
    pub border: &'static str,
    pub card: &'static str,
    pub notification: &'static str,
}

// Flag green/yellow/red plus earth tones.
const GREEN: &str = "#228B22";
const YELLOW: &str = "#FFD700";
const RED: &str = "#DC143C";
const LIME_GREEN: &str = "#32CD32";
const AMBER: &str = "#FFBF00";
const ORANGE: &str = "#FF8C00";

const LIGHT: Palette = Palette {
    primary: GREEN,
    secondary: YELLOW,
    accent: ORANGE,
    background: "#FFFFFF",
    surface: "#FAFAFA",
    text: "#1A1A1A",
    text_secondary: "#666666",
    border: "#E0E0E0",
    card: "#FFFFFF",
    notification: RED,
};

const DARK: Palette = Palette {
    primary: LIME_GREEN,
    secondary: YELLOW,
    accent: AMBER,
    background: "#121212",
    surface: "#1E1E1E",
    text: "#FFFFFF",
    text_secondary: "#CCCCCC",
    border: "#333333",
    card: "#2D2D2D",
    notification: RED,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Am,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Am => "am",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Am,
            Language::Am => Language::En,
        }
    }

    pub fn is_amharic(&self) -> bool { matches!(self, Language::Am) }

    /// Amharic text when selected and present, English otherwise.
    pub fn pick<'a>(&self, en: &'a str, am: &'a str) -> &'a str {
        if self.is_amharic() && !am.is_empty() { am } else { en }
    }

    pub fn t<'a>(&self, en: &'a str, am: Option<&'a str>) -> &'a str { self.pick(en, am.unwrap_or("")) }
}

impl std::str::FromStr for Language {
    type Err = CatalogError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::En),
            "am" => Ok(Language::Am),
            other => Err(CatalogError::Validation(format!("unknown language '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palettes_differ_by_theme() {
        assert_eq!(Theme::Light.palette().background, "#FFFFFF");
        assert_eq!(Theme::Dark.palette().background, "#121212");
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert!(Theme::Light.toggled().is_dark());
    }

    #[test]
    fn translation_prefers_amharic_only_when_set() {
        assert_eq!(Language::En.t("Home", Some("ቤት")), "Home");
        assert_eq!(Language::Am.t("Home", Some("ቤት")), "ቤት");
        assert_eq!(Language::Am.t("Home", None), "Home");
        assert_eq!(Language::Am.t("Home", Some("")), "Home");
    }
}
