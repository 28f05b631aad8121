#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

use fudousan_stats_core::{AncestorRef, Category, Dashboard, DashboardConfig, DataStore};
use serde_json::Error as SerdeError;

#[cfg(target_arch = "wasm32")]
use fudousan_stats_core::{ChartSpec, ParentChain, QueryOptions, SelectionNode};

#[cfg(target_arch = "wasm32")]
use yew::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

#[cfg(target_arch = "wasm32")]
use web_sys::{HtmlInputElement, HtmlSelectElement};

const SAMPLE_DATA: &str = include_str!("../../config/sample_data.json");

fn load_default_store() -> Result<DataStore, SerdeError> {
    serde_json::from_str::<DataStore>(SAMPLE_DATA)
}

/// One row of the area menu at the current drill-down level.
#[derive(Debug, Clone, PartialEq)]
struct MenuEntry {
    category: Category,
    name: String,
    selected: bool,
    has_children: bool,
}

fn menu_category(path: &[AncestorRef]) -> Option<Category> {
    match path.last() {
        Some(ancestor) => ancestor.category.child(),
        None => Some(Category::Region),
    }
}

fn menu_entries(dashboard: &Dashboard, path: &[AncestorRef]) -> Vec<MenuEntry> {
    let Some(lookup) = dashboard.data().current_lookup() else {
        return Vec::new();
    };
    let Some(category) = menu_category(path) else {
        return Vec::new();
    };
    let Ok(names) = lookup.names_under(path) else {
        return Vec::new();
    };
    names
        .into_iter()
        .map(|name| {
            let mut child_path = path.to_vec();
            child_path.push(AncestorRef::new(category, name));
            let has_children = category.child().is_some()
                && lookup
                    .names_under(&child_path)
                    .map(|children| !children.is_empty())
                    .unwrap_or(false);
            MenuEntry {
                category,
                name: name.to_string(),
                selected: dashboard.selection().is_selected(category, name),
                has_children,
            }
        })
        .collect()
}

fn breadcrumb(path: &[AncestorRef]) -> String {
    let mut parts = vec!["全国".to_string()];
    parts.extend(path.iter().map(|ancestor| ancestor.name.clone()));
    parts.join(" > ")
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{:.1}", value),
        None => "-".to_string(),
    }
}

#[cfg(target_arch = "wasm32")]
fn chart_panel(chart: &ChartSpec, on_toggle: &Callback<String>) -> Html {
    let payload = serde_json::to_string(chart).unwrap_or_default();
    let labels = &chart.data.labels;
    html! {
        <section class="chart" data-chart={payload}>
            <h2>{ &chart.options.plugins.title.text }</h2>
            <div class="legend">
                { for chart.data.datasets.iter().map(|dataset| {
                    let label = dataset.label.clone();
                    let on_toggle = on_toggle.clone();
                    let onclick = Callback::from(move |_| on_toggle.emit(label.clone()));
                    let class = if dataset.hidden { "legend-item hidden" } else { "legend-item" };
                    let style = format!("border-color: {};", dataset.border_color);
                    html! {
                        <button class={class} style={style} onclick={onclick}>{ &dataset.label }</button>
                    }
                }) }
            </div>
            <table>
                <thead>
                    <tr>
                        <th>{ "地域" }</th>
                        { for labels.iter().map(|label| html! { <th>{ label }</th> }) }
                    </tr>
                </thead>
                <tbody>
                    { for chart.data.datasets.iter().filter(|dataset| !dataset.hidden).map(|dataset| {
                        html! {
                            <tr>
                                <td>{ &dataset.label }</td>
                                { for dataset.data.iter().map(|value| html! { <td>{ format_value(*value) }</td> }) }
                            </tr>
                        }
                    }) }
                </tbody>
            </table>
        </section>
    }
}

#[cfg(target_arch = "wasm32")]
#[function_component(App)]
fn app() -> Html {
    let dashboard = use_mut_ref(|| {
        let store = load_default_store().expect("取引データの読み込みに失敗しました");
        let config = DashboardConfig::builtin().expect("設定の読み込みに失敗しました");
        Dashboard::with_data(config, store)
    });

    let refresh = use_state(|| 0u32);
    let path = use_state(Vec::<AncestorRef>::new);
    let query = use_state(QueryOptions::default);
    let message = use_state(|| Option::<String>::None);

    let force_refresh = {
        let refresh = refresh.clone();
        Callback::from(move |_| {
            refresh.set(refresh.wrapping_add(1));
        })
    };

    let set_error = {
        let message = message.clone();
        Callback::from(move |err: String| {
            message.set(Some(err));
        })
    };

    let clear_error = {
        let message = message.clone();
        Callback::from(move |_| {
            message.set(None);
        })
    };

    let on_select_change = {
        let dashboard = dashboard.clone();
        let path = path.clone();
        let force_refresh = force_refresh.clone();
        let set_error = set_error.clone();
        let clear_error = clear_error.clone();
        Callback::from(move |(category, name, checked): (Category, String, bool)| {
            let mut dashboard_mut = dashboard.borrow_mut();
            if checked {
                match ParentChain::from_ancestors((*path).clone()) {
                    Ok(chain) => {
                        dashboard_mut.select(SelectionNode::new(category, name, chain));
                        clear_error.emit(());
                    }
                    Err(err) => set_error.emit(err.to_string()),
                }
            } else if let Err(err) = dashboard_mut.deselect(category, &name) {
                set_error.emit(err.to_string());
            } else {
                clear_error.emit(());
            }
            force_refresh.emit(());
        })
    };

    let on_drill_down = {
        let path = path.clone();
        Callback::from(move |(category, name): (Category, String)| {
            let mut next = (*path).clone();
            next.push(AncestorRef::new(category, name));
            path.set(next);
        })
    };

    let on_drill_up = {
        let path = path.clone();
        Callback::from(move |_| {
            let mut next = (*path).clone();
            next.pop();
            path.set(next);
        })
    };

    let on_clear = {
        let dashboard = dashboard.clone();
        let force_refresh = force_refresh.clone();
        Callback::from(move |_| {
            dashboard.borrow_mut().clear_selection();
            force_refresh.emit(());
        })
    };

    let on_toggle = {
        let dashboard = dashboard.clone();
        let force_refresh = force_refresh.clone();
        Callback::from(move |label: String| {
            dashboard.borrow_mut().toggle_dataset(&label);
            force_refresh.emit(());
        })
    };

    let on_query_change = {
        let dashboard = dashboard.clone();
        let query = query.clone();
        let path = path.clone();
        let set_error = set_error.clone();
        let clear_error = clear_error.clone();
        Callback::from(move |(slider, value): (&'static str, String)| {
            let mut updated = *query;
            if let Err(err) = updated.set(slider, &value) {
                set_error.emit(err.to_string());
                return;
            }
            match dashboard.borrow_mut().apply_query(&updated) {
                Ok(()) => {
                    query.set(updated);
                    path.set(Vec::new());
                    clear_error.emit(());
                }
                Err(err) => set_error.emit(format!("{err} (検索条件は変更前のまま維持されます)")),
            }
        })
    };

    let dashboard_ref = dashboard.borrow();
    let entries = menu_entries(&dashboard_ref, &path);
    let view = dashboard_ref.render();
    let current = dashboard_ref
        .data()
        .current()
        .map(|(collection, options)| format!("{} / {}", collection, options))
        .unwrap_or_else(|| "未選択".to_string());
    let selected_count = dashboard_ref.selection().count();
    let level_label = menu_category(&path)
        .map(|category| category.label())
        .unwrap_or("-");

    let message_view = if let Some(msg) = &*message {
        html! { <div class="error">{ msg }</div> }
    } else {
        html! {}
    };

    let unresolved_view = if view.unresolved.is_empty() {
        html! {}
    } else {
        html! {
            <ul class="unresolved">
                { for view.unresolved.iter().map(|node| {
                    html! { <li>{ format!("{} ({}): {}", node.id, node.category.label(), node.miss) }</li> }
                }) }
            </ul>
        }
    };

    let slider = |slider: &'static str, title: &str, current: &'static str, choices: Vec<(&'static str, &'static str)>| {
        let on_query_change = on_query_change.clone();
        let onchange = Callback::from(move |event: Event| {
            if let Some(select) = event
                .target()
                .and_then(|target| target.dyn_into::<HtmlSelectElement>().ok())
            {
                on_query_change.emit((slider, select.value()));
            }
        });
        html! {
            <label>
                { title.to_string() }
                <select onchange={onchange} value={current}>
                    { for choices.into_iter().map(|(key, label)| {
                        html! { <option value={key} selected={key == current}>{ label }</option> }
                    }) }
                </select>
            </label>
        }
    };

    html! {
        <div class="app">
            <h1>{ "不動産取引価格ダッシュボード" }</h1>
            { message_view }

            <section class="sidebar">
                <h2>{ "検索条件" }</h2>
                { slider("buildingType", "建物種別", query.building_type.key(),
                    fudousan_stats_core::BuildingType::iter().map(|v| (v.key(), v.label())).collect()) }
                { slider("stationDist", "駅からの距離", query.station_dist.key(),
                    fudousan_stats_core::StationDistance::iter().map(|v| (v.key(), v.label())).collect()) }
                { slider("material", "構造", query.material.key(),
                    fudousan_stats_core::Material::iter().map(|v| (v.key(), v.label())).collect()) }
                { slider("age", "建築年", query.age.key(),
                    fudousan_stats_core::BuildingAge::iter().map(|v| (v.key(), v.label())).collect()) }
                { slider("floorArea", "延床面積", query.floor_area.key(),
                    fudousan_stats_core::FloorArea::iter().map(|v| (v.key(), v.label())).collect()) }
                <p>{ format!("データセット: {}", current) }</p>
            </section>

            <section class="menu">
                <h2>{ format!("{} ({}件選択中)", level_label, selected_count) }</h2>
                <p class="breadcrumb">{ breadcrumb(&path) }</p>
                <div class="control-buttons">
                    <button onclick={on_drill_up} disabled={path.is_empty()}>{ "上の階層へ" }</button>
                    <button onclick={on_clear} disabled={selected_count == 0}>{ "すべて解除" }</button>
                </div>
                <ul>
                    { for entries.iter().map(|entry| {
                        let category = entry.category;
                        let name = entry.name.clone();
                        let on_select_change = on_select_change.clone();
                        let onchange = Callback::from(move |event: Event| {
                            if let Some(input) = event
                                .target()
                                .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
                            {
                                on_select_change.emit((category, name.clone(), input.checked()));
                            }
                        });
                        let drill = if entry.has_children {
                            let name = entry.name.clone();
                            let on_drill_down = on_drill_down.clone();
                            let onclick = Callback::from(move |_| on_drill_down.emit((category, name.clone())));
                            html! { <button class="drill" onclick={onclick}>{ "▶" }</button> }
                        } else {
                            html! {}
                        };
                        html! {
                            <li key={entry.name.clone()}>
                                <label>
                                    <input type="checkbox" checked={entry.selected} onchange={onchange} />
                                    { &entry.name }
                                </label>
                                { drill }
                            </li>
                        }
                    }) }
                </ul>
            </section>

            { chart_panel(&view.price_chart, &on_toggle) }
            { chart_panel(&view.count_chart, &on_toggle) }
            { unresolved_view }
        </div>
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    yew::Renderer::<App>::new().render();
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn start() {
    panic!("fudousan-stats-web は wasm32-unknown-unknown ターゲットでのみ利用できます。");
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn embedded_sample_renders_in_browser() {
        let store = load_default_store().expect("embedded sample data");
        let config = DashboardConfig::builtin().expect("built-in config");
        let mut dashboard = Dashboard::with_data(config, store);
        dashboard.select(fudousan_stats_core::SelectionNode::region("関東"));
        let view = dashboard.render();
        assert_eq!(view.price_chart.data.datasets.len(), 1);
        assert_eq!(view.price_chart.data.labels[0], "2010年");
    }
}
