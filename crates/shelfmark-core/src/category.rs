use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Book categories partitioning the cached catalog collections.
///
/// The set is fixed and statically enumerable via [`Category::ALL`], so code
/// that needs "every category" iterates the slice instead of reflecting over
/// the enum at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Fiction,
    NonFiction,
    Science,
    Technology,
    History,
    Biography,
    Children,
    Mystery,
    Romance,
    Poetry,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 10] = [
        Category::Fiction,
        Category::NonFiction,
        Category::Science,
        Category::Technology,
        Category::History,
        Category::Biography,
        Category::Children,
        Category::Mystery,
        Category::Romance,
        Category::Poetry,
    ];

    /// Canonical string form, also used by serde.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Fiction => "Fiction",
            Category::NonFiction => "NonFiction",
            Category::Science => "Science",
            Category::Technology => "Technology",
            Category::History => "History",
            Category::Biography => "Biography",
            Category::Children => "Children",
            Category::Mystery => "Mystery",
            Category::Romance => "Romance",
            Category::Poetry => "Poetry",
        }
    }

    /// Conventional prefix for cache keys tied to this category's collections.
    pub fn cache_key_prefix(&self) -> String {
        format!("books:category:{}", self.as_str().to_lowercase())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fiction" => Ok(Category::Fiction),
            "nonfiction" | "non-fiction" => Ok(Category::NonFiction),
            "science" => Ok(Category::Science),
            "technology" | "technical" => Ok(Category::Technology),
            "history" => Ok(Category::History),
            "biography" => Ok(Category::Biography),
            "children" => Ok(Category::Children),
            "mystery" => Ok(Category::Mystery),
            "romance" => Ok(Category::Romance),
            "poetry" => Ok(Category::Poetry),
            other => Err(CoreError::invalid_category(other.to_string())),
        }
    }
}
