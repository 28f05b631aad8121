use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LookupMiss, YearRangeError};
use crate::geo::{Category, SelectionNode};
use crate::lookup::{LookupNode, TimeSeriesLookup, YearPoint};

pub const DEFAULT_FIRST_YEAR: u16 = 2010;
pub const DEFAULT_LAST_YEAR: u16 = 2020;

/// Ascending, duplicate-free year labels that every series is aligned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct YearRange {
    years: Vec<String>,
}

impl YearRange {
    pub fn new(years: Vec<String>) -> Result<Self, YearRangeError> {
        if years.is_empty() {
            return Err(YearRangeError::Empty);
        }
        for year in &years {
            if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
                return Err(YearRangeError::InvalidLabel(year.clone()));
            }
        }
        for pair in years.windows(2) {
            if pair[0] >= pair[1] {
                return Err(YearRangeError::NotAscending {
                    previous: pair[0].clone(),
                    next: pair[1].clone(),
                });
            }
        }
        Ok(Self { years })
    }

    /// Inclusive span of calendar years.
    pub fn span(first: u16, last: u16) -> Result<Self, YearRangeError> {
        Self::new((first..=last).map(|year| format!("{year:04}")).collect())
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.years.iter().map(String::as_str)
    }

    pub fn contains(&self, year: &str) -> bool {
        self.years
            .binary_search_by(|probe| probe.as_str().cmp(year))
            .is_ok()
    }

    pub fn labels_with_suffix(&self, suffix: &str) -> Vec<String> {
        self.iter().map(|year| format!("{year}{suffix}")).collect()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.years
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            years: (DEFAULT_FIRST_YEAR..=DEFAULT_LAST_YEAR)
                .map(|year| year.to_string())
                .collect(),
        }
    }
}

impl TryFrom<Vec<String>> for YearRange {
    type Error = YearRangeError;

    fn try_from(years: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(years)
    }
}

impl From<YearRange> for Vec<String> {
    fn from(range: YearRange) -> Self {
        range.years
    }
}

/// Chart-ready arrays for one selected area, index-aligned with the year range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesResult {
    pub id: String,
    pub price: Vec<Option<f64>>,
    pub count: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnresolvedNode {
    pub id: String,
    pub category: Category,
    pub miss: LookupMiss,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesReport {
    pub series: Vec<SeriesResult>,
    pub unresolved: Vec<UnresolvedNode>,
}

impl SeriesReport {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Turns the current selection into per-area series against one lookup.
#[derive(Debug, Clone, Default)]
pub struct HierarchicalSeriesBuilder {
    years: YearRange,
}

impl HierarchicalSeriesBuilder {
    pub fn new(years: YearRange) -> Self {
        Self { years }
    }

    pub fn years(&self) -> &YearRange {
        &self.years
    }

    pub fn resolve<'a, I>(&self, selection: I, lookup: &TimeSeriesLookup) -> SeriesReport
    where
        I: IntoIterator<Item = &'a SelectionNode>,
    {
        resolve_series(selection, lookup, &self.years)
    }
}

/// Resolves every selected node into a year-aligned series.
///
/// Each node is looked up through its parent chain (see [`resolve_node`]) and
/// its `transactYear` table is projected onto `years`: years missing from the
/// table become `None` in both `price` and `count`, years outside the range are
/// dropped, and the output follows the range's ascending order.
///
/// A node the lookup cannot reach does not abort the pass. It is skipped, logged
/// at `warn`, and recorded in [`SeriesReport::unresolved`] with the step that
/// missed. Series keep the selection order; an empty selection yields an empty
/// report.
pub fn resolve_series<'a, I>(
    selection: I,
    lookup: &TimeSeriesLookup,
    years: &YearRange,
) -> SeriesReport
where
    I: IntoIterator<Item = &'a SelectionNode>,
{
    let mut report = SeriesReport::default();
    for node in selection {
        match resolve_node(node, lookup) {
            Ok(resolved) => {
                let series = align_years(&node.name, resolved.transact_year(), years);
                debug!(
                    id = %series.id,
                    category = %node.category,
                    recorded = resolved.transact_year().len(),
                    "resolved series"
                );
                report.series.push(series);
            }
            Err(miss) => {
                warn!(id = %node.name, category = %node.category, %miss, "skipping unresolved node");
                report.unresolved.push(UnresolvedNode {
                    id: node.name.clone(),
                    category: node.category,
                    miss,
                });
            }
        }
    }
    report
}

/// Walks the lookup down a node's parent chain to the node's own entry.
///
/// At each ancestor level the key is the node itself when its category is the
/// level's target category, otherwise the next deeper ancestor, falling back to
/// the node itself below the last ancestor.
pub fn resolve_node<'a>(
    node: &SelectionNode,
    lookup: &'a TimeSeriesLookup,
) -> Result<&'a LookupNode, LookupMiss> {
    let chain = &node.parent_chain;
    let Some((_, top)) = chain.iter().next() else {
        return lookup.descend(node.category, &node.name);
    };

    let mut current = lookup.descend(top.category, &top.name)?;
    for (level, _) in chain.iter() {
        let target = level.target_category();
        let (category, name) = if node.category == target {
            (node.category, node.name.as_str())
        } else {
            match level.next().and_then(|next| chain.get(next)) {
                Some(next) => (next.category, next.name.as_str()),
                None => (node.category, node.name.as_str()),
            }
        };
        current = current.descend(category, name)?;
    }
    Ok(current)
}

fn align_years(
    id: &str,
    transact_year: &BTreeMap<String, YearPoint>,
    years: &YearRange,
) -> SeriesResult {
    let mut points: Vec<(&str, YearPoint)> = transact_year
        .iter()
        .filter(|(year, _)| years.contains(year))
        .map(|(year, point)| (year.as_str(), *point))
        .collect();
    points.extend(
        years
            .iter()
            .filter(|year| !transact_year.contains_key(*year))
            .map(|year| (year, YearPoint::EMPTY)),
    );
    points.sort_by(|a, b| a.0.cmp(b.0));

    let (price, count) = points
        .into_iter()
        .map(|(_, point)| (point.price_mean, point.count))
        .unzip();
    SeriesResult {
        id: id.to_string(),
        price,
        count,
    }
}
