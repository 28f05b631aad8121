use serde::{Deserialize, Serialize};

use crate::series::SeriesResult;
use crate::view_state::ChartViewState;

pub const SOLID_COLOURS: [&str; 17] = [
    "rgba(0,0,0,0.95)",
    "rgba(13,112,83,0.95)",
    "rgba(0,171,60,0.95)",
    "rgba(197,198,38,0.95)",
    "rgba(255,155,32,0.95)",
    "rgba(255,59,0,0.95)",
    "rgba(171,42,23,0.95)",
    "rgba(121,67,28,0.95)",
    "rgba(126,114,88,0.95)",
    "rgba(66,88,94,0.95)",
    "rgba(66,138,158,0.95)",
    "rgba(31,122,194,0.95)",
    "rgba(22,36,226,0.95)",
    "rgba(93,22,226,0.95)",
    "rgba(171,12,238,0.95)",
    "rgba(245,7,235,0.95)",
    "rgba(144,5,119,0.95)",
];

pub const FADED_COLOURS: [&str; 17] = [
    "rgba(0,0,0,0.70)",
    "rgba(13,112,83,0.70)",
    "rgba(0,171,60,0.70)",
    "rgba(197,198,38,0.70)",
    "rgba(255,155,32,0.70)",
    "rgba(255,59,0,0.70)",
    "rgba(171,42,23,0.70)",
    "rgba(121,67,28,0.70)",
    "rgba(126,114,88,0.70)",
    "rgba(66,88,94,0.70)",
    "rgba(66,138,158,0.70)",
    "rgba(31,122,194,0.70)",
    "rgba(22,36,226,0.70)",
    "rgba(93,22,226,0.70)",
    "rgba(171,12,238,0.70)",
    "rgba(245,7,235,0.70)",
    "rgba(144,5,119,0.70)",
];

/// Border and fill colour for the dataset at `index`, wrapping after the last preset.
pub fn palette_colour(index: usize) -> (&'static str, &'static str) {
    let slot = index % SOLID_COLOURS.len();
    (SOLID_COLOURS[slot], FADED_COLOURS[slot])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<Option<f64>>,
    pub border_color: String,
    pub background_color: String,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartPayloads {
    pub price: ChartPayload,
    pub count: ChartPayload,
}

/// Builds the line (mean price) and stacked-bar (count) payloads.
///
/// Dataset `i` of both payloads gets palette slot `i`, and both read their
/// `hidden` flag from the same view state.
pub fn build_chart_payloads(
    series: &[SeriesResult],
    labels: &[String],
    view: &ChartViewState,
) -> ChartPayloads {
    let mut payloads = ChartPayloads {
        price: ChartPayload {
            labels: labels.to_vec(),
            datasets: Vec::with_capacity(series.len()),
        },
        count: ChartPayload {
            labels: labels.to_vec(),
            datasets: Vec::with_capacity(series.len()),
        },
    };
    for (index, item) in series.iter().enumerate() {
        let (border, background) = palette_colour(index);
        let hidden = view.is_hidden(&item.id);
        let dataset = |data: &[Option<f64>]| ChartDataset {
            label: item.id.clone(),
            data: data.to_vec(),
            border_color: border.to_string(),
            background_color: background.to_string(),
            hidden,
        };
        payloads.price.datasets.push(dataset(&item.price));
        payloads.count.datasets.push(dataset(&item.count));
    }
    payloads
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleOptions {
    pub display: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipOptions {
    pub caret_size: u32,
    pub corner_radius: u32,
    pub display_colors: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub intersect: Option<bool>,
    pub position: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginOptions {
    pub title: TitleOptions,
    pub tooltip: TooltipOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineElementOptions {
    pub cubic_interpolation_mode: String,
    pub fill: bool,
    pub tension: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointElementOptions {
    pub border_width: u32,
    pub point_style: String,
    pub radius: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementOptions {
    pub line: LineElementOptions,
    pub point: PointElementOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisOptions {
    pub stacked: bool,
    pub begin_at_zero: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleOptions {
    pub x: AxisOptions,
    pub y: AxisOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub maintain_aspect_ratio: bool,
    pub responsive: bool,
    pub plugins: PluginOptions,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub elements: Option<ElementOptions>,
    pub scales: ScaleOptions,
}

impl ChartOptions {
    pub fn line(title: &str) -> Self {
        Self {
            maintain_aspect_ratio: true,
            responsive: true,
            plugins: PluginOptions {
                title: TitleOptions {
                    display: true,
                    text: title.to_string(),
                },
                tooltip: TooltipOptions {
                    caret_size: 8,
                    corner_radius: 3,
                    display_colors: true,
                    intersect: Some(false),
                    position: "nearest".to_string(),
                },
            },
            elements: Some(ElementOptions {
                line: LineElementOptions {
                    cubic_interpolation_mode: "monotone".to_string(),
                    fill: false,
                    tension: 0.3,
                },
                point: PointElementOptions {
                    border_width: 0,
                    point_style: "circle".to_string(),
                    radius: 4,
                },
            }),
            scales: ScaleOptions {
                x: AxisOptions::default(),
                y: AxisOptions {
                    stacked: false,
                    begin_at_zero: true,
                },
            },
        }
    }

    pub fn stacked_bar(title: &str) -> Self {
        Self {
            maintain_aspect_ratio: true,
            responsive: true,
            plugins: PluginOptions {
                title: TitleOptions {
                    display: true,
                    text: title.to_string(),
                },
                tooltip: TooltipOptions {
                    caret_size: 8,
                    corner_radius: 3,
                    display_colors: true,
                    intersect: None,
                    position: "nearest".to_string(),
                },
            },
            elements: None,
            scales: ScaleOptions {
                x: AxisOptions {
                    stacked: true,
                    begin_at_zero: false,
                },
                y: AxisOptions {
                    stacked: true,
                    begin_at_zero: false,
                },
            },
        }
    }
}

/// A payload together with the options the charting surface needs to draw it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub data: ChartPayload,
    pub options: ChartOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view_state::ViewAction;

    fn series(id: &str) -> SeriesResult {
        SeriesResult {
            id: id.to_string(),
            price: vec![None, Some(1200.0)],
            count: vec![None, Some(5.0)],
        }
    }

    fn labels() -> Vec<String> {
        vec!["2010".to_string(), "2011".to_string()]
    }

    #[test]
    fn payloads_share_labels_and_colours() {
        let payloads = build_chart_payloads(
            &[series("関東"), series("関西")],
            &labels(),
            &ChartViewState::new(),
        );
        assert_eq!(payloads.price.labels, labels());
        assert_eq!(payloads.count.labels, labels());
        assert_eq!(payloads.price.datasets[1].label, "関西");
        assert_eq!(payloads.price.datasets[1].data, vec![None, Some(1200.0)]);
        assert_eq!(payloads.count.datasets[1].data, vec![None, Some(5.0)]);
        assert_eq!(
            payloads.price.datasets[1].border_color,
            payloads.count.datasets[1].border_color
        );
        assert_eq!(payloads.price.datasets[0].border_color, SOLID_COLOURS[0]);
        assert_eq!(payloads.price.datasets[0].background_color, FADED_COLOURS[0]);
    }

    #[test]
    fn palette_wraps_after_last_preset() {
        assert_eq!(palette_colour(17), palette_colour(0));
        assert_eq!(palette_colour(18).0, SOLID_COLOURS[1]);
    }

    #[test]
    fn hidden_label_applies_to_both_charts() {
        let mut view = ChartViewState::new();
        view.apply(ViewAction::Toggle("関西".into()));
        let payloads = build_chart_payloads(&[series("関東"), series("関西")], &labels(), &view);
        assert!(!payloads.price.datasets[0].hidden);
        assert!(payloads.price.datasets[1].hidden);
        assert!(payloads.count.datasets[1].hidden);
    }

    #[test]
    fn datasets_serialize_with_chart_field_names() {
        let payloads = build_chart_payloads(&[series("関東")], &labels(), &ChartViewState::new());
        let json = serde_json::to_value(&payloads.price).unwrap();
        assert_eq!(json["datasets"][0]["borderColor"], SOLID_COLOURS[0]);
        assert_eq!(json["datasets"][0]["data"][0], serde_json::Value::Null);
        assert_eq!(json["datasets"][0]["data"][1], 1200.0);
    }

    #[test]
    fn options_carry_titles_and_stacking() {
        let line = serde_json::to_value(ChartOptions::line("取引平均価格（万円）")).unwrap();
        assert_eq!(line["plugins"]["title"]["text"], "取引平均価格（万円）");
        assert_eq!(line["elements"]["line"]["cubicInterpolationMode"], "monotone");
        let bar = serde_json::to_value(ChartOptions::stacked_bar("取引件数")).unwrap();
        assert_eq!(bar["scales"]["x"]["stacked"], true);
        assert!(bar.get("elements").is_none());
        assert!(bar["plugins"]["tooltip"].get("intersect").is_none());
    }
}
