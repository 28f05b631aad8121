use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SelectionError;

/// Depth of an area in the region → prefecture → city → district hierarchy.
///
/// Variants are declared top-down so that `Ord` follows the hierarchy depth.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[serde(rename = "regions", alias = "region", alias = "地方")]
    Region,
    #[serde(rename = "prefectures", alias = "prefecture", alias = "都道府県")]
    Prefecture,
    #[serde(rename = "cities", alias = "city", alias = "市区町村")]
    City,
    #[serde(rename = "districts", alias = "district", alias = "地区")]
    District,
}

impl Category {
    pub fn iter() -> impl Iterator<Item = Category> {
        [
            Category::Region,
            Category::Prefecture,
            Category::City,
            Category::District,
        ]
        .into_iter()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Region => "regions",
            Category::Prefecture => "prefectures",
            Category::City => "cities",
            Category::District => "districts",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Region => "地方",
            Category::Prefecture => "都道府県",
            Category::City => "市区町村",
            Category::District => "地区",
        }
    }

    /// Category listed underneath this one in the menu, if any.
    pub fn child(self) -> Option<Category> {
        match self {
            Category::Region => Some(Category::Prefecture),
            Category::Prefecture => Some(Category::City),
            Category::City => Some(Category::District),
            Category::District => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "regions" | "region" | "地方" => Ok(Category::Region),
            "prefectures" | "prefecture" | "pref" | "都道府県" => Ok(Category::Prefecture),
            "cities" | "city" | "市区町村" => Ok(Category::City),
            "districts" | "district" | "地区" => Ok(Category::District),
            _ => Err(SelectionError::UnknownCategory(s.trim().to_string())),
        }
    }
}

/// Ancestor slot of a selected node's parent chain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    #[serde(rename = "level 1")]
    One,
    #[serde(rename = "level 2")]
    Two,
    #[serde(rename = "level 3")]
    Three,
}

impl Level {
    pub fn iter() -> impl Iterator<Item = Level> {
        [Level::One, Level::Two, Level::Three].into_iter()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::One => "level 1",
            Level::Two => "level 2",
            Level::Three => "level 3",
        }
    }

    /// Category reached by descending one step below an ancestor in this slot.
    pub fn target_category(self) -> Category {
        match self {
            Level::One => Category::Prefecture,
            Level::Two => Category::City,
            Level::Three => Category::District,
        }
    }

    pub fn next(self) -> Option<Level> {
        match self {
            Level::One => Some(Level::Two),
            Level::Two => Some(Level::Three),
            Level::Three => None,
        }
    }

    fn from_index(index: usize) -> Option<Level> {
        Level::iter().nth(index)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Level {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match compact.as_str() {
            "level1" | "1" => Ok(Level::One),
            "level2" | "2" => Ok(Level::Two),
            "level3" | "3" => Ok(Level::Three),
            _ => Err(SelectionError::UnknownLevel(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AncestorRef {
    pub category: Category,
    pub name: String,
}

impl AncestorRef {
    pub fn new<N: Into<String>>(category: Category, name: N) -> Self {
        Self {
            category,
            name: name.into(),
        }
    }
}

impl fmt::Display for AncestorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.name)
    }
}

impl FromStr for AncestorRef {
    type Err = SelectionError;

    /// Parses `category:name` (also `category/name`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let (category, name) = raw
            .split_once(|c| c == ':' || c == '/')
            .ok_or_else(|| SelectionError::UnknownCategory(raw.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(SelectionError::UnknownCategory(raw.to_string()));
        }
        Ok(Self::new(category.parse()?, name))
    }
}

/// Ancestors of a selected node, contiguous from `level 1` downwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "Option<BTreeMap<Level, AncestorRef>>",
    into = "BTreeMap<Level, AncestorRef>"
)]
pub struct ParentChain {
    levels: BTreeMap<Level, AncestorRef>,
}

impl ParentChain {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a chain from ancestors ordered top-down (`level 1` first).
    pub fn from_ancestors<I>(ancestors: I) -> Result<Self, SelectionError>
    where
        I: IntoIterator<Item = AncestorRef>,
    {
        let mut levels = BTreeMap::new();
        for (index, ancestor) in ancestors.into_iter().enumerate() {
            let level = Level::from_index(index)
                .ok_or_else(|| SelectionError::UnknownLevel(format!("level {}", index + 1)))?;
            levels.insert(level, ancestor);
        }
        Ok(Self { levels })
    }

    pub fn get(&self, level: Level) -> Option<&AncestorRef> {
        self.levels.get(&level)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Level, &AncestorRef)> {
        self.levels.iter().map(|(level, ancestor)| (*level, ancestor))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn deepest(&self) -> Option<&AncestorRef> {
        self.levels.values().next_back()
    }
}

impl TryFrom<BTreeMap<Level, AncestorRef>> for ParentChain {
    type Error = SelectionError;

    fn try_from(levels: BTreeMap<Level, AncestorRef>) -> Result<Self, Self::Error> {
        for (expected, present) in Level::iter().zip(levels.keys()) {
            if expected != *present {
                return Err(SelectionError::GapInChain { level: *present });
            }
        }
        Ok(Self { levels })
    }
}

impl TryFrom<Option<BTreeMap<Level, AncestorRef>>> for ParentChain {
    type Error = SelectionError;

    fn try_from(levels: Option<BTreeMap<Level, AncestorRef>>) -> Result<Self, Self::Error> {
        levels.map_or_else(|| Ok(Self::empty()), Self::try_from)
    }
}

impl From<ParentChain> for BTreeMap<Level, AncestorRef> {
    fn from(chain: ParentChain) -> Self {
        chain.levels
    }
}

/// One area the user ticked in the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionNode {
    pub category: Category,
    pub name: String,
    #[serde(rename = "partOf", alias = "parentChain", default)]
    pub parent_chain: ParentChain,
}

impl SelectionNode {
    pub fn new<N: Into<String>>(category: Category, name: N, parent_chain: ParentChain) -> Self {
        Self {
            category,
            name: name.into(),
            parent_chain,
        }
    }

    pub fn region<N: Into<String>>(name: N) -> Self {
        Self::new(Category::Region, name, ParentChain::empty())
    }

    pub fn is_same_area(&self, category: Category, name: &str) -> bool {
        self.category == category && self.name == name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_plural_singular_and_japanese_names() {
        assert_eq!("regions".parse::<Category>().unwrap(), Category::Region);
        assert_eq!("City".parse::<Category>().unwrap(), Category::City);
        assert_eq!("都道府県".parse::<Category>().unwrap(), Category::Prefecture);
        assert!("ward".parse::<Category>().is_err());
    }

    #[test]
    fn level_maps_to_category_below_it() {
        assert_eq!(Level::One.target_category(), Category::Prefecture);
        assert_eq!(Level::Two.target_category(), Category::City);
        assert_eq!(Level::Three.target_category(), Category::District);
        assert_eq!(Level::Three.next(), None);
    }

    #[test]
    fn selection_node_deserializes_part_of_chain() {
        let node: SelectionNode = serde_json::from_str(
            r#"{
                "category": "cities",
                "name": "新宿区",
                "partOf": {
                    "level 2": { "category": "prefectures", "name": "東京都" },
                    "level 1": { "category": "regions", "name": "関東" }
                }
            }"#,
        )
        .expect("valid node");
        assert_eq!(node.category, Category::City);
        assert_eq!(node.parent_chain.len(), 2);
        assert_eq!(node.parent_chain.get(Level::One).unwrap().name, "関東");
        assert_eq!(node.parent_chain.deepest().unwrap().name, "東京都");
    }

    #[test]
    fn selection_node_accepts_japanese_category_names() {
        let node: SelectionNode = serde_json::from_str(
            r#"{
                "category": "都道府県",
                "name": "東京都",
                "partOf": { "level 1": { "category": "地方", "name": "関東" } }
            }"#,
        )
        .expect("japanese category names");
        assert_eq!(node.category, Category::Prefecture);
        assert_eq!(node.parent_chain.get(Level::One).unwrap().category, Category::Region);
        let city: Category = serde_json::from_str(r#""市区町村""#).unwrap();
        assert_eq!(city, Category::City);
        assert_eq!(serde_json::to_string(&city).unwrap(), r#""cities""#);
    }

    #[test]
    fn null_or_missing_part_of_is_an_empty_chain() {
        let node: SelectionNode =
            serde_json::from_str(r#"{ "category": "regions", "name": "関東", "partOf": null }"#)
                .expect("null chain");
        assert!(node.parent_chain.is_empty());
        let node: SelectionNode =
            serde_json::from_str(r#"{ "category": "regions", "name": "関東" }"#)
                .expect("missing chain");
        assert!(node.parent_chain.is_empty());
    }

    #[test]
    fn chain_with_gap_is_rejected() {
        let err = serde_json::from_str::<SelectionNode>(
            r#"{
                "category": "cities",
                "name": "新宿区",
                "partOf": { "level 2": { "category": "prefectures", "name": "東京都" } }
            }"#,
        )
        .expect_err("level 2 without level 1");
        assert!(err.to_string().contains("level 2"));
    }

    #[test]
    fn from_ancestors_rejects_more_than_three_levels() {
        let ancestors = (0..4).map(|idx| AncestorRef::new(Category::Region, format!("r{idx}")));
        assert!(ParentChain::from_ancestors(ancestors).is_err());
    }

    #[test]
    fn ancestor_ref_parses_category_name_pairs() {
        let parsed: AncestorRef = "prefectures:東京都".parse().expect("pair");
        assert_eq!(parsed, AncestorRef::new(Category::Prefecture, "東京都"));
        assert!("東京都".parse::<AncestorRef>().is_err());
        assert!("prefectures:".parse::<AncestorRef>().is_err());
    }
}
