use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three fixed topical buckets free text is scored against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Technical,
    Business,
    Theoretical,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Technical, Category::Business, Category::Theoretical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Technical => "technical",
            Category::Business => "business",
            Category::Theoretical => "theoretical",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed keyword table, loaded once. Matching is presence-based: each keyword
/// contributes at most one hit regardless of how often it repeats.
static CATEGORY_KEYWORDS: Lazy<Vec<(Category, Vec<&'static str>)>> = Lazy::new(|| {
    vec![
        (
            Category::Technical,
            vec![
                "code", "api", "library", "framework", "deploy", "docker", "database", "python",
                "rust", "debug", "performance", "architecture", "testing", "pipeline",
            ],
        ),
        (
            Category::Business,
            vec![
                "business", "market", "product", "client", "customer", "revenue", "cost",
                "strategy", "startup", "sales", "roi", "budget", "management",
            ],
        ),
        (
            Category::Theoretical,
            vec![
                "theory", "research", "algorithm", "math", "statistics", "proof", "paper",
                "concept", "fundamentals", "science", "academic", "model",
            ],
        ),
    ]
});

/// Normalized keyword-match strength per category, each on a 0-100 scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub technical: f64,
    pub business: f64,
    pub theoretical: f64,
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Technical => self.technical,
            Category::Business => self.business,
            Category::Theoretical => self.theoretical,
        }
    }

    fn set(&mut self, category: Category, score: f64) {
        match category {
            Category::Technical => self.technical = score,
            Category::Business => self.business = score,
            Category::Theoretical => self.theoretical = score,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.technical == 0.0 && self.business == 0.0 && self.theoretical == 0.0
    }
}

/// Score a blob of free text against the fixed categories.
///
/// The category with the highest raw hit count normalizes to exactly 100;
/// the rest scale proportionally. All-zero hit counts stay all-zero.
pub fn categorize(text: &str) -> CategoryScores {
    let mut scores = CategoryScores::default();
    if text.trim().is_empty() {
        return scores;
    }

    let text = text.to_lowercase();
    let hits: Vec<(Category, usize)> = CATEGORY_KEYWORDS
        .iter()
        .map(|(category, keywords)| {
            let count = keywords.iter().filter(|kw| text.contains(*kw)).count();
            (*category, count)
        })
        .collect();

    // Treating a zero max as 1 keeps the all-miss case at zero without
    // dividing by zero.
    let max = hits.iter().map(|(_, count)| *count).max().unwrap_or(0).max(1);
    for (category, count) in hits {
        scores.set(category, count as f64 / max as f64 * 100.0);
    }

    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strongest_category_scores_exactly_100() {
        let scores = categorize("I want to debug rust code and deploy with docker, plus some math");
        assert_eq!(scores.technical, 100.0);
        assert!(scores.theoretical > 0.0);
        assert!(scores.theoretical < 100.0);
        assert_eq!(scores.business, 0.0);
    }

    #[test]
    fn empty_text_scores_all_zero() {
        assert!(categorize("").is_zero());
        assert!(categorize("   \n\t").is_zero());
    }

    #[test]
    fn unmatched_text_scores_all_zero() {
        let scores = categorize("nothing relevant here at all");
        assert!(scores.is_zero());
    }

    #[test]
    fn matching_is_case_insensitive_and_presence_based() {
        let once = categorize("RUST");
        let thrice = categorize("rust rust rust");
        assert_eq!(once, thrice);
        assert_eq!(once.technical, 100.0);
    }

    #[test]
    fn never_panics_on_arbitrary_input() {
        let long = "x".repeat(10_000);
        for input in ["", "��", "日本語のテキスト", "a]b[c{d}e", long.as_str()] {
            let scores = categorize(input);
            for category in Category::ALL {
                let score = scores.get(category);
                assert!((0.0..=100.0).contains(&score));
            }
        }
    }
}
