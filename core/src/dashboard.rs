use serde::Serialize;
use tracing::debug;

use crate::chart::{ChartKind, ChartOptions, ChartSpec, build_chart_payloads};
use crate::config::DashboardConfig;
use crate::dataset::DataStore;
use crate::error::{DataError, SelectionError};
use crate::geo::{Category, SelectionNode};
use crate::lookup::TimeSeriesLookup;
use crate::options::QueryOptions;
use crate::selection::SelectionState;
use crate::series::{HierarchicalSeriesBuilder, SeriesReport, UnresolvedNode};
use crate::view_state::{ChartViewState, ViewAction};

/// Everything the charting surface needs after one render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub price_chart: ChartSpec,
    pub count_chart: ChartSpec,
    pub unresolved: Vec<UnresolvedNode>,
}

pub struct Dashboard {
    config: DashboardConfig,
    builder: HierarchicalSeriesBuilder,
    data: DataStore,
    selection: SelectionState,
    view: ChartViewState,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Self::with_data(config, DataStore::new())
    }

    pub fn with_data(config: DashboardConfig, data: DataStore) -> Self {
        let builder = HierarchicalSeriesBuilder::new(config.year_range.clone());
        Self {
            config,
            builder,
            data,
            selection: SelectionState::new(),
            view: ChartViewState::new(),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn data(&self) -> &DataStore {
        &self.data
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn view_state(&self) -> &ChartViewState {
        &self.view
    }

    pub fn load_dataset<C, O>(&mut self, collection: C, options: O, lookup: TimeSeriesLookup)
    where
        C: Into<String>,
        O: Into<String>,
    {
        self.data.insert(collection, options, lookup);
    }

    pub fn switch_dataset(&mut self, collection: &str, options: &str) -> Result<(), DataError> {
        self.data.set_current(collection, options)
    }

    pub fn apply_query(&mut self, query: &QueryOptions) -> Result<(), DataError> {
        self.data.set_query(query)
    }

    pub fn select(&mut self, node: SelectionNode) {
        self.selection.select(node);
    }

    pub fn deselect(&mut self, category: Category, name: &str) -> Result<(), SelectionError> {
        self.selection.deselect(category, name)?;
        let remaining = self
            .selection
            .nodes()
            .map(|node| node.name.clone())
            .collect();
        self.view.apply(ViewAction::Retain(remaining));
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear_all();
        self.view.apply(ViewAction::ShowAll);
    }

    pub fn toggle_dataset(&mut self, label: &str) {
        self.view.apply(ViewAction::Toggle(label.to_string()));
    }

    /// Resolves the current selection; empty when no dataset is loaded yet.
    pub fn series(&self) -> SeriesReport {
        match self.data.current_lookup() {
            Some(lookup) => self.builder.resolve(self.selection.nodes(), lookup),
            None => {
                debug!("no dataset loaded, rendering empty charts");
                SeriesReport::default()
            }
        }
    }

    /// Runs one render pass over the current selection and dataset.
    ///
    /// Both charts share the configured axis labels, the palette order of
    /// [`SelectionState::nodes`] and the hidden flags of the view state, so a
    /// legend toggle shows up in the price and count charts alike.
    ///
    /// Before any dataset is loaded the charts carry labels but no datasets.
    /// Selected areas the current dataset cannot reach are left out of both
    /// charts and listed in [`DashboardView::unresolved`] instead; the rest of
    /// the selection still renders.
    pub fn render(&self) -> DashboardView {
        let report = self.series();
        let labels = self.config.axis_labels();
        let payloads = build_chart_payloads(&report.series, &labels, &self.view);
        DashboardView {
            price_chart: ChartSpec {
                kind: ChartKind::Line,
                data: payloads.price,
                options: ChartOptions::line(&self.config.price_title),
            },
            count_chart: ChartSpec {
                kind: ChartKind::Bar,
                data: payloads.count,
                options: ChartOptions::stacked_bar(&self.config.count_title),
            },
            unresolved: report.unresolved,
        }
    }
}
