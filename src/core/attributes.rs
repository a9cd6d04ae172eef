use crate::utils::error::Result;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

pub const ETA_APPROVAL: &str = "mit ETA Zulassung";

pub const DEFAULT_HEAD_SHAPES: &[&str] = &[
    "Tellerkopf",
    "Senkkopf",
    "Linsenkopf",
    "Hammerkopf",
    "ohne Kopf",
    "Rundkopf",
    "Zylinderkopf",
];

/// Maps a keyword found in a title to the material written to the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRule {
    pub keyword: String,
    pub value: String,
}

impl MaterialRule {
    pub fn new(keyword: &str, value: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            value: value.to_string(),
        }
    }
}

/// More specific keywords come first: "gelb verzinkt" must win over "verzinkt".
pub fn default_material_rules() -> Vec<MaterialRule> {
    vec![
        MaterialRule::new("edelstahl c1", "Edelstahl C1"),
        MaterialRule::new("edelstahl a2", "Edelstahl A2"),
        MaterialRule::new("edelstahl a4", "Edelstahl A4"),
        MaterialRule::new("gelb verzinkt", "Stahl gelb verzinkt"),
        MaterialRule::new("verzinkt", "Stahl verzinkt"),
    ]
}

pub fn default_head_shapes() -> Vec<String> {
    DEFAULT_HEAD_SHAPES.iter().map(|s| s.to_string()).collect()
}

/// Keyword rules for attributes derived from product titles.
#[derive(Debug, Clone)]
pub struct AttributeRules {
    materials: Vec<(String, String)>,
    head_shapes: Vec<(Regex, String)>,
    eta: Regex,
}

impl AttributeRules {
    pub fn new(materials: &[MaterialRule], head_shapes: &[String]) -> Result<Self> {
        let materials = materials
            .iter()
            .map(|rule| (rule.keyword.to_lowercase(), rule.value.clone()))
            .collect();

        let head_shapes = head_shapes
            .iter()
            .map(|shape| Ok((case_insensitive(shape)?, shape.clone())))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            materials,
            head_shapes,
            eta: case_insensitive("ETA")?,
        })
    }

    /// First matching rule in list order, or an empty string.
    pub fn material(&self, title: &str) -> String {
        let title = title.to_lowercase();
        self.materials
            .iter()
            .find(|(keyword, _)| title.contains(keyword.as_str()))
            .map(|(_, value)| value.clone())
            .unwrap_or_default()
    }

    /// First head shape in list order found anywhere in the title, or an empty string.
    pub fn head_shape(&self, title: &str) -> String {
        self.head_shapes
            .iter()
            .find(|(pattern, _)| pattern.is_match(title))
            .map(|(_, shape)| shape.clone())
            .unwrap_or_default()
    }

    pub fn mentions_eta(&self, text: &str) -> bool {
        self.eta.is_match(text)
    }
}

impl Default for AttributeRules {
    fn default() -> Self {
        // Built-in keywords are escaped literals and always compile.
        Self::new(&default_material_rules(), &default_head_shapes())
            .expect("default attribute rules are valid")
    }
}

fn case_insensitive(literal: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(&regex::escape(literal))
        .case_insensitive(true)
        .build()?)
}
