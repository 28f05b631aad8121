use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::info;

use crate::error::DataError;
use crate::lookup::TimeSeriesLookup;
use crate::options::QueryOptions;

/// Lookups fetched so far, filed under `collection → options`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "BTreeMap<String, BTreeMap<String, TimeSeriesLookup>>")]
pub struct DataStore {
    collections: BTreeMap<String, BTreeMap<String, TimeSeriesLookup>>,
    current: Option<(String, String)>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a freshly fetched lookup, replacing any previous one, and makes it current.
    pub fn insert<C, O>(&mut self, collection: C, options: O, lookup: TimeSeriesLookup)
    where
        C: Into<String>,
        O: Into<String>,
    {
        let collection = collection.into();
        let options = options.into();
        info!(collection = %collection, options = %options, "dataset replaced");
        self.collections
            .entry(collection.clone())
            .or_default()
            .insert(options.clone(), lookup);
        self.current = Some((collection, options));
    }

    pub fn set_current(&mut self, collection: &str, options: &str) -> Result<(), DataError> {
        if self.get(collection, options).is_none() {
            return Err(DataError::NotLoaded {
                collection: collection.to_string(),
                options: options.to_string(),
            });
        }
        self.current = Some((collection.to_string(), options.to_string()));
        Ok(())
    }

    pub fn set_query(&mut self, query: &QueryOptions) -> Result<(), DataError> {
        self.set_current(query.collection_key(), &query.options_key())
    }

    pub fn get(&self, collection: &str, options: &str) -> Option<&TimeSeriesLookup> {
        self.collections.get(collection)?.get(options)
    }

    pub fn current(&self) -> Option<(&str, &str)> {
        self.current
            .as_ref()
            .map(|(collection, options)| (collection.as_str(), options.as_str()))
    }

    pub fn current_lookup(&self) -> Option<&TimeSeriesLookup> {
        let (collection, options) = self.current()?;
        self.get(collection, options)
    }

    pub fn keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.collections.iter().flat_map(|(collection, entries)| {
            entries
                .keys()
                .map(move |options| (collection.as_str(), options.as_str()))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.collections.values().all(BTreeMap::is_empty)
    }
}

impl From<BTreeMap<String, BTreeMap<String, TimeSeriesLookup>>> for DataStore {
    /// The first `(collection, options)` pair in key order becomes current.
    fn from(collections: BTreeMap<String, BTreeMap<String, TimeSeriesLookup>>) -> Self {
        let current = collections.iter().find_map(|(collection, entries)| {
            entries
                .keys()
                .next()
                .map(|options| (collection.clone(), options.clone()))
        });
        Self {
            collections,
            current,
        }
    }
}
