pub mod heuristic;
pub mod range;

use std::fmt;

use serde::{Deserialize, Serialize};

/// The six voice categories a classification can land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Soprano,
    Mezzo,
    Alto,
    Tenor,
    Baritone,
    Bass,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Soprano => "soprano",
            Category::Mezzo => "mezzo",
            Category::Alto => "alto",
            Category::Tenor => "tenor",
            Category::Baritone => "baritone",
            Category::Bass => "bass",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_serializes_lowercase() {
        let json = serde_json::to_string(&Category::Baritone).unwrap();
        assert_eq!(json, "\"baritone\"");
        let back: Category = serde_json::from_str("\"mezzo\"").unwrap();
        assert_eq!(back, Category::Mezzo);
    }

    #[test]
    fn display_matches_serde_name() {
        assert_eq!(Category::Soprano.to_string(), "soprano");
    }
}
