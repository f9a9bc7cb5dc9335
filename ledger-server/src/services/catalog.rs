//! Product categories
//!
//! The ledger only asks whether a category is known; where the list comes
//! from (config today) is the catalog's business.

/// Source of valid product categories
pub trait CategoryCatalog: Send + Sync {
    /// Whether `category` is a known category (case-insensitive)
    fn is_known(&self, category: &str) -> bool;

    /// All categories, in display order
    fn categories(&self) -> Vec<String>;
}

/// Fixed category list
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    categories: Vec<String>,
}

impl StaticCatalog {
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list: Vec<String> = Vec::new();
        for category in categories {
            let category = category.into().trim().to_string();
            if !category.is_empty() && !list.iter().any(|c| c.eq_ignore_ascii_case(&category)) {
                list.push(category);
            }
        }
        Self { categories: list }
    }

    /// Canonical spelling of a known category
    pub fn canonical(&self, category: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.eq_ignore_ascii_case(category.trim()))
            .map(String::as_str)
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new(["Beer", "Cocktail", "Snack", "Other"])
    }
}

impl CategoryCatalog for StaticCatalog {
    fn is_known(&self, category: &str) -> bool {
        self.canonical(category).is_some()
    }

    fn categories(&self) -> Vec<String> {
        self.categories.clone()
    }
}
