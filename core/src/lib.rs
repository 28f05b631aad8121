mod chart;
mod config;
mod dashboard;
mod dataset;
mod error;
mod geo;
mod lookup;
mod options;
mod selection;
mod series;
mod view_state;

pub use chart::{
    ChartDataset, ChartKind, ChartOptions, ChartPayload, ChartPayloads, ChartSpec, FADED_COLOURS,
    SOLID_COLOURS, build_chart_payloads, palette_colour,
};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardView};
pub use dataset::DataStore;
pub use error::{DataError, LookupError, LookupMiss, SelectionError, YearRangeError};
pub use geo::{AncestorRef, Category, Level, ParentChain, SelectionNode};
pub use lookup::{LookupNode, TimeSeriesLookup, YearPoint};
pub use options::{BuildingAge, BuildingType, FloorArea, Material, QueryOptions, StationDistance};
pub use selection::SelectionState;
pub use series::{
    HierarchicalSeriesBuilder, SeriesReport, SeriesResult, UnresolvedNode, YearRange,
    resolve_node, resolve_series,
};
pub use view_state::{ChartViewState, ViewAction};
