//! Keyword-based category classification

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Training center category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    BlueCollar,
    WhiteCollar,
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::BlueCollar => write!(f, "blue-collar"),
            Category::WhiteCollar => write!(f, "white-collar"),
            Category::Other => write!(f, "other"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blue-collar" => Ok(Category::BlueCollar),
            "white-collar" => Ok(Category::WhiteCollar),
            "other" => Ok(Category::Other),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// Trades and hands-on technical training
pub const BLUE_COLLAR_TERMS: [&str; 16] = [
    "welding",
    "construction",
    "automotive",
    "electrical",
    "plumbing",
    "hvac",
    "mechanic",
    "carpentry",
    "masonry",
    "trade",
    "skilled",
    "craft",
    "apprentice",
    "technical",
    "vocational",
    "industrial",
];

/// Office, business and computing training
pub const WHITE_COLLAR_TERMS: [&str; 19] = [
    "business",
    "management",
    "finance",
    "accounting",
    "marketing",
    "sales",
    "consulting",
    "administration",
    "leadership",
    "professional",
    "corporate",
    "office",
    "analyst",
    "data",
    "software",
    "computer",
    "it",
    "technology",
    "digital",
];

/// Lowercased alphanumeric words
fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Number of words in `text` that appear in `lexicon`
pub fn score(text: &str, lexicon: &[&str]) -> usize {
    words(text).filter(|w| lexicon.contains(&w.as_str())).count()
}

/// Classify a facility by its name and description
///
/// Whichever lexicon scores strictly higher wins; ties and zero scores
/// are `Other`.
pub fn classify(name: &str, description: Option<&str>) -> Category {
    let text = format!("{} {}", name, description.unwrap_or_default());
    let blue = score(&text, &BLUE_COLLAR_TERMS);
    let white = score(&text, &WHITE_COLLAR_TERMS);

    if blue > white {
        Category::BlueCollar
    } else if white > blue {
        Category::WhiteCollar
    } else {
        Category::Other
    }
}
