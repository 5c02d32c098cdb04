use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

pub type SuggestionId = String;

/// Meal-type selection sent to the recommendation provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MealFilter {
    #[default]
    All,
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Dessert,
}

impl MealFilter {
    pub const ALL: [MealFilter; 6] = [
        MealFilter::All,
        MealFilter::Breakfast,
        MealFilter::Lunch,
        MealFilter::Dinner,
        MealFilter::Snack,
        MealFilter::Dessert,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MealFilter::All => "all",
            MealFilter::Breakfast => "breakfast",
            MealFilter::Lunch => "lunch",
            MealFilter::Dinner => "dinner",
            MealFilter::Snack => "snack",
            MealFilter::Dessert => "dessert",
        }
    }
}

impl fmt::Display for MealFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        MealFilter::ALL
            .into_iter()
            .find(|filter| filter.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Invalid meal filter: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Approved,
    Rejected,
}

/// Difficulty rating, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Difficulty(u8);

impl Difficulty {
    pub fn new(level: u8) -> Option<Self> {
        (1..=5).contains(&level).then_some(Self(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }
}

/// One recommendation item as shown on a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub id: SuggestionId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub prep_time: Option<String>,
    pub servings: Option<u32>,
    pub difficulty: Option<Difficulty>,
    pub cuisine: Option<String>,
    pub meal_type: Option<String>,
    pub mood_tags: BTreeSet<String>,
    pub dietary_tags: BTreeSet<String>,
    pub vote: Option<Vote>,
    pub voted_at: Option<DateTime<Utc>>,
    pub is_favorited: bool,
}

impl Suggestion {
    /// A suggestion with only identity and name set; everything else empty.
    pub fn new(id: impl Into<SuggestionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            image_url: None,
            prep_time: None,
            servings: None,
            difficulty: None,
            cuisine: None,
            meal_type: None,
            mood_tags: BTreeSet::new(),
            dietary_tags: BTreeSet::new(),
            vote: None,
            voted_at: None,
            is_favorited: false,
        }
    }

    pub fn is_voted(&self) -> bool {
        self.vote.is_some()
    }
}
