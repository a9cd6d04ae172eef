use crate::core::normalize::normalize;
use std::collections::HashSet;

pub const DEFAULT_BRANDS: &[&str] = &[
    "Klimas Sp",
    "Top Marken",
    "EFF EFF",
    "E.u.r.o Tec GmbH",
    "Förch",
    "Meisterling",
    "Beurskens",
    "Fenster-Hammer",
    "EVVA",
    "Hanno",
    "Heicko",
    "K-A-L-M",
    "DIAGER",
    "Medid",
    "Zaunrebell",
    "FENSTER-HAMMER",
    "SCHRAUBEN-HAMMER",
];

pub const DEFAULT_CATEGORIES: &[&str] = &[
    "SCREWREBEL",
    "WERA",
    "Klimas Sp",
    "Top Marken",
    "FAMAG",
    "INTRA-TEC",
    "Pica",
    "Burg Wächter",
    "ISEO",
    "BEVER",
    "EFF EFF",
    "ABUS",
    "INDEX",
];

/// Set of names to suppress, stored in normalized form.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    entries: HashSet<String>,
}

impl Blacklist {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = names
            .into_iter()
            .map(|name| normalize(name.as_ref()))
            .filter(|name| !name.is_empty())
            .collect();
        Self { entries }
    }

    pub fn default_brands() -> Self {
        Self::new(DEFAULT_BRANDS)
    }

    pub fn default_categories() -> Self {
        Self::new(DEFAULT_CATEGORIES)
    }

    /// Exact match on normalized text, not a substring match.
    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains(&normalize(text))
    }

    pub fn contains_normalized(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
