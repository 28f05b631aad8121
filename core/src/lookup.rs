use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{LookupError, LookupMiss};
use crate::geo::{AncestorRef, Category};

const TRANSACT_YEAR_KEY: &str = "transactYear";

/// Transactions recorded for one calendar year. `None` means nothing was recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct YearPoint {
    #[serde(default)]
    pub count: Option<f64>,
    #[serde(rename = "priceMean", default)]
    pub price_mean: Option<f64>,
}

impl YearPoint {
    pub const EMPTY: YearPoint = YearPoint {
        count: None,
        price_mean: None,
    };

    pub fn new(count: f64, price_mean: f64) -> Self {
        Self {
            count: Some(count),
            price_mean: Some(price_mean),
        }
    }
}

/// One area in the lookup tree: its yearly figures plus the areas below it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupNode {
    transact_year: BTreeMap<String, YearPoint>,
    children: BTreeMap<Category, BTreeMap<String, LookupNode>>,
}

impl LookupNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_year<Y: Into<String>>(mut self, year: Y, point: YearPoint) -> Self {
        self.transact_year.insert(year.into(), point);
        self
    }

    pub fn with_child<N: Into<String>>(
        mut self,
        category: Category,
        name: N,
        child: LookupNode,
    ) -> Self {
        self.children
            .entry(category)
            .or_default()
            .insert(name.into(), child);
        self
    }

    pub fn transact_year(&self) -> &BTreeMap<String, YearPoint> {
        &self.transact_year
    }

    pub fn children(&self, category: Category) -> Option<&BTreeMap<String, LookupNode>> {
        self.children.get(&category)
    }

    /// One descent step: `self[category][name]`.
    pub fn descend(&self, category: Category, name: &str) -> Result<&LookupNode, LookupMiss> {
        let entries = self
            .children
            .get(&category)
            .ok_or(LookupMiss::MissingCategory { category })?;
        entries.get(name).ok_or_else(|| LookupMiss::MissingName {
            category,
            name: name.to_string(),
        })
    }

    fn from_object(path: &str, object: Map<String, Value>) -> Result<Self, LookupError> {
        let mut node = LookupNode::new();
        for (key, value) in object {
            if key == TRANSACT_YEAR_KEY {
                node.transact_year = parse_transact_year(&join_path(path, &key), value)?;
                continue;
            }
            let Ok(category) = key.parse::<Category>() else {
                trace!(path, key = %key, "ignoring non-hierarchy key");
                continue;
            };
            let category_path = join_path(path, &key);
            let entries = expect_object(&category_path, value)?;
            let children = node.children.entry(category).or_default();
            for (name, child) in entries {
                let child_path = join_path(&category_path, &name);
                let child = LookupNode::from_object(&child_path, expect_object(&child_path, child)?)?;
                children.insert(name, child);
            }
        }
        Ok(node)
    }
}

/// Nested `category → name → … → transactYear` table for one dataset.
///
/// Built from the data layer's JSON, keys that are neither a category nor
/// `transactYear` are skipped.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct TimeSeriesLookup {
    root: LookupNode,
}

impl TimeSeriesLookup {
    pub fn new(root: LookupNode) -> Self {
        Self { root }
    }

    pub fn from_json_str(body: &str) -> anyhow::Result<Self> {
        let value: Value = serde_json::from_str(body)?;
        Ok(Self::try_from(value)?)
    }

    pub fn root(&self) -> &LookupNode {
        &self.root
    }

    pub fn descend(&self, category: Category, name: &str) -> Result<&LookupNode, LookupMiss> {
        self.root.descend(category, name)
    }

    /// Names listed at the menu level reached by following `path` from the top.
    ///
    /// An empty path lists the regions; a path ending at a prefecture lists its
    /// cities. Names come back in key order, which is the order the menu shows.
    ///
    /// # Errors
    ///
    /// Returns the [`LookupMiss`] of the first step that is not in the tree. An
    /// area with nothing recorded beneath it misses with
    /// [`LookupMiss::MissingCategory`] for the level below; a path ending at a
    /// district misses with `MissingCategory` for districts, the deepest level.
    pub fn names_under(&self, path: &[AncestorRef]) -> Result<Vec<&str>, LookupMiss> {
        let mut current = &self.root;
        let mut category = Category::Region;
        for step in path {
            current = current.descend(step.category, &step.name)?;
            category = step
                .category
                .child()
                .ok_or(LookupMiss::MissingCategory { category: step.category })?;
        }
        let entries = current
            .children(category)
            .ok_or(LookupMiss::MissingCategory { category })?;
        Ok(entries.keys().map(String::as_str).collect())
    }

    pub fn is_available(&self, path: &[AncestorRef], name: &str) -> bool {
        self.names_under(path)
            .map(|names| names.contains(&name))
            .unwrap_or(false)
    }
}

impl TryFrom<Value> for TimeSeriesLookup {
    type Error = LookupError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let object = expect_object("$", value)?;
        Ok(Self {
            root: LookupNode::from_object("$", object)?,
        })
    }
}

fn parse_transact_year(
    path: &str,
    value: Value,
) -> Result<BTreeMap<String, YearPoint>, LookupError> {
    expect_object(path, value)?
        .into_iter()
        .map(|(year, point)| {
            serde_json::from_value::<YearPoint>(point)
                .map(|point| (year.clone(), point))
                .map_err(|err| LookupError::InvalidYearPoint {
                    path: join_path(path, &year),
                    message: err.to_string(),
                })
        })
        .collect()
}

fn expect_object(path: &str, value: Value) -> Result<Map<String, Value>, LookupError> {
    match value {
        Value::Object(object) => Ok(object),
        _ => Err(LookupError::NotAnObject {
            path: path.to_string(),
        }),
    }
}

fn join_path(parent: &str, key: &str) -> String {
    format!("{parent}.{key}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_lookup() -> TimeSeriesLookup {
        serde_json::from_str(
            r#"{
                "_id": "ignored",
                "regions": {
                    "関東": {
                        "name": "関東",
                        "transactYear": { "2015": { "count": 12, "priceMean": 3400.5 } },
                        "prefectures": {
                            "東京都": {
                                "transactYear": { "2016": { "count": 4, "priceMean": null } },
                                "cities": { "新宿区": { "transactYear": {} } }
                            },
                            "千葉県": { "transactYear": {} }
                        }
                    }
                }
            }"#,
        )
        .expect("sample lookup")
    }

    #[test]
    fn descends_through_typed_children() {
        let lookup = sample_lookup();
        let kanto = lookup.descend(Category::Region, "関東").expect("region");
        assert_eq!(kanto.transact_year()["2015"], YearPoint::new(12.0, 3400.5));
        let tokyo = kanto
            .descend(Category::Prefecture, "東京都")
            .expect("prefecture");
        assert_eq!(tokyo.transact_year()["2016"].price_mean, None);
        assert_eq!(tokyo.transact_year()["2016"].count, Some(4.0));
    }

    #[test]
    fn descend_reports_missing_category_and_name() {
        let lookup = sample_lookup();
        let kanto = lookup.descend(Category::Region, "関東").unwrap();
        assert_eq!(
            kanto.descend(Category::District, "x"),
            Err(LookupMiss::MissingCategory {
                category: Category::District
            })
        );
        assert_eq!(
            kanto.descend(Category::Prefecture, "大阪府"),
            Err(LookupMiss::MissingName {
                category: Category::Prefecture,
                name: "大阪府".to_string()
            })
        );
    }

    #[test]
    fn names_under_follows_menu_path() {
        let lookup = sample_lookup();
        assert_eq!(lookup.names_under(&[]).unwrap(), vec!["関東"]);
        let path = [AncestorRef::new(Category::Region, "関東")];
        assert_eq!(lookup.names_under(&path).unwrap(), vec!["千葉県", "東京都"]);
        assert!(lookup.is_available(&path, "東京都"));
        assert!(!lookup.is_available(&path, "大阪府"));
        let deeper = [
            AncestorRef::new(Category::Region, "関東"),
            AncestorRef::new(Category::Prefecture, "千葉県"),
        ];
        assert!(lookup.names_under(&deeper).is_err());
    }

    #[test]
    fn rejects_malformed_year_points() {
        let err = TimeSeriesLookup::from_json_str(
            r#"{ "regions": { "関東": { "transactYear": { "2015": { "count": "many" } } } } }"#,
        )
        .expect_err("count must be numeric");
        assert!(err.to_string().contains("$.regions.関東.transactYear.2015"));
    }

    #[test]
    fn rejects_category_that_is_not_an_object() {
        let err = TimeSeriesLookup::from_json_str(r#"{ "regions": [1, 2] }"#)
            .expect_err("array under category");
        assert!(err.to_string().contains("$.regions"));
    }

    #[test]
    fn builder_matches_parsed_tree() {
        let built = TimeSeriesLookup::new(LookupNode::new().with_child(
            Category::Region,
            "関東",
            LookupNode::new().with_year("2011", YearPoint::new(5.0, 1200.0)),
        ));
        let parsed = TimeSeriesLookup::from_json_str(
            r#"{ "regions": { "関東": { "transactYear": { "2011": { "count": 5, "priceMean": 1200 } } } } }"#,
        )
        .unwrap();
        assert_eq!(built, parsed);
    }
}
