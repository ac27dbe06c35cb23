use engine::filter::{commune_names, filter_features};
use engine::loader::parse_layer;
use engine::schema::{Cooperative, CooperativeDetails, MISSING_FIELD};
use engine::viewport::{commune_viewport, feature_address, focus_target};
use engine::{
    Coordinate, DataLoader, FocusTarget, Layer, LoadError, LoadStatus, Selection, ALL_COMMUNES,
};
use geojson::{Feature, FeatureCollection};
use seed::{prelude::*, virtual_dom::AtValue, *};
use serde::Serialize;
use wasm_bindgen::prelude::{wasm_bindgen, JsValue};

#[wasm_bindgen(module = "/leaflet_map.js")]
extern "C" {
    #[wasm_bindgen(js_name = initMap)]
    fn init_map(center: JsValue, zoom: f64);
    #[wasm_bindgen(js_name = renderBoundaries)]
    fn render_boundaries(province: JsValue, communes: JsValue);
    #[wasm_bindgen(js_name = renderCooperatives)]
    fn render_cooperatives(collection: JsValue, records: JsValue);
    #[wasm_bindgen(js_name = fitViewport)]
    fn fit_viewport(fit: JsValue);
    #[wasm_bindgen(js_name = focusCooperative)]
    fn focus_cooperative(target: JsValue);
}

const DEFAULT_DATA_ROOT: &str =
    "https://raw.githubusercontent.com/geotoposig/AIDSIG/refs/heads/main";
const DEFAULT_VIEW: Coordinate = Coordinate {
    lat: 34.95,
    lon: -3.40,
};
const DEFAULT_ZOOM: f64 = 10.0;

fn data_root() -> String {
    if let Some(url) = option_env!("DASHBOARD_DATA_ROOT") {
        return url.trim_end_matches('/').to_string();
    }
    DEFAULT_DATA_ROOT.to_string()
}

fn layer_url(layer: Layer) -> String {
    format!("{}/{}", data_root(), layer.file_name())
}

pub struct Model {
    loader: DataLoader,
    selection: Selection,
    communes: Vec<String>,
    filtered: Vec<Feature>,
}

pub enum Msg {
    LayerFetched(Layer, Result<FeatureCollection, LoadError>),
    CommuneSelected(String),
    CoopQueryChanged(String),
    RepresentativeQueryChanged(String),
    CooperativeSelected(String),
}

pub fn init(_: Url, orders: &mut impl Orders<Msg>) -> Model {
    for layer in Layer::ALL {
        orders.perform_cmd(fetch_layer(layer));
    }

    Model {
        loader: DataLoader::new(),
        selection: Selection::default(),
        communes: Vec::new(),
        filtered: Vec::new(),
    }
}

pub fn update(msg: Msg, model: &mut Model, _orders: &mut impl Orders<Msg>) {
    match msg {
        Msg::LayerFetched(layer, outcome) => {
            model.loader.record(layer, outcome);
            if let LoadStatus::Ready = model.loader.status() {
                push_boundaries(&model.loader);
                if let Some(cooperatives) = model.loader.cooperatives() {
                    model.communes = commune_names(cooperatives);
                }
                refresh_results(model);
                apply_commune_viewport(model);
            }
        }
        Msg::CommuneSelected(commune) => {
            select_commune(&mut model.selection, commune);
            refresh_results(model);
            apply_commune_viewport(model);
        }
        Msg::CoopQueryChanged(query) => {
            model.selection.coop_query = query;
            refresh_results(model);
        }
        Msg::RepresentativeQueryChanged(query) => {
            model.selection.representative_query = query;
            refresh_results(model);
        }
        Msg::CooperativeSelected(id) => {
            model.selection.selected_id = Some(id.clone());
            match focus_target(&model.filtered, &id) {
                Some(target) => push_focus(&target),
                None => web_sys::console::debug_1(
                    &format!("[frontend] selection {id} is stale, ignoring").into(),
                ),
            }
        }
    }
}

/// Changing commune invalidates any selected cooperative: the filtered list
/// is about to change shape, so index-based addresses go stale.
fn select_commune(selection: &mut Selection, commune: String) {
    selection.commune = commune;
    selection.selected_id = None;
}

async fn fetch_layer(layer: Layer) -> Msg {
    let url = layer_url(layer);
    web_sys::console::debug_1(&format!("[frontend] fetching {url}").into());
    let outcome = match Request::new(url).method(Method::Get).fetch().await {
        Err(err) => Err(fetch_error(layer, format!("{err:?}"))),
        Ok(raw) => match raw.check_status() {
            Err(status_err) => Err(fetch_error(layer, format!("{status_err:?}"))),
            Ok(response) => match response.text().await {
                Err(err) => Err(fetch_error(layer, format!("{err:?}"))),
                Ok(body) => parse_layer(layer, &body),
            },
        },
    };

    Msg::LayerFetched(layer, outcome)
}

fn fetch_error(layer: Layer, reason: String) -> LoadError {
    LoadError::Fetch {
        layer: layer.label(),
        reason,
    }
}

fn refresh_results(model: &mut Model) {
    let Some(cooperatives) = model.loader.cooperatives() else {
        return;
    };
    model.filtered = filter_features(cooperatives, &model.selection);
    push_cooperatives(&model.filtered);
}

fn apply_commune_viewport(model: &Model) {
    if let Some(fit) = commune_viewport(model.loader.communes(), &model.selection.commune) {
        if let Some(fit) = to_plain_js(&fit) {
            fit_viewport(fit);
        }
    }
}

fn push_boundaries(loader: &DataLoader) {
    let province = loader
        .province()
        .and_then(to_plain_js)
        .unwrap_or(JsValue::NULL);
    let communes = loader
        .communes()
        .and_then(to_plain_js)
        .unwrap_or(JsValue::NULL);
    render_boundaries(province, communes);
}

fn push_cooperatives(filtered: &[Feature]) {
    let collection = FeatureCollection {
        bbox: None,
        features: filtered.to_vec(),
        foreign_members: None,
    };
    let records: Vec<CooperativeDetails> = filtered
        .iter()
        .filter_map(Cooperative::from_feature)
        .map(|coop| coop.details())
        .collect();
    if let (Some(collection), Some(records)) = (to_plain_js(&collection), to_plain_js(&records)) {
        render_cooperatives(collection, records);
    }
}

fn push_focus(target: &FocusTarget) {
    if let Some(target) = to_plain_js(target) {
        focus_cooperative(target);
    }
}

// Leaflet needs plain JS objects; the default serializer would turn the
// GeoJSON property bags into JS `Map`s.
fn to_plain_js<T: Serialize + ?Sized>(value: &T) -> Option<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .ok()
}

pub fn view(model: &Model) -> Node<Msg> {
    match model.loader.status() {
        LoadStatus::Loading => view_loading(),
        LoadStatus::Failed(detail) => view_error(detail),
        LoadStatus::Ready => div![
            C!["sidebar"],
            h1!["SIGaid Driouch – atlas des coopératives"],
            view_filters(model),
            view_results(model),
        ],
    }
}

fn view_loading() -> Node<Msg> {
    div![
        C!["loading-screen"],
        div![C!["spinner"]],
        p!["Initialisation SIGaid..."],
    ]
}

fn view_error(detail: &str) -> Node<Msg> {
    div![
        C!["error-screen"],
        p![C!["error"], "Erreur de chargement des données"],
        small![detail],
    ]
}

fn view_filters(model: &Model) -> Node<Msg> {
    let input_field = |label_text: &str, value: &str, placeholder: &str, msg: fn(String) -> Msg| {
        div![
            C!["input-field"],
            label![label_text],
            input![
                attrs! {
                    At::Value => value,
                    At::Placeholder => placeholder,
                    At::AutoComplete => "off",
                    At::SpellCheck => "false",
                },
                input_ev(Ev::Input, msg),
            ]
        ]
    };

    form![
        C!["controls"],
        fieldset![
            legend!["Filtres de recherche"],
            div![
                C!["input-field"],
                label!["Commune"],
                select![
                    option![
                        attrs! {
                            At::Value => ALL_COMMUNES,
                            At::Selected => bool_attr(model.selection.all_communes()),
                        },
                        "Toutes les communes"
                    ],
                    model.communes.iter().map(|commune| {
                        let commune = commune.as_str();
                        option![
                            attrs! {
                                At::Value => commune,
                                At::Selected => bool_attr(model.selection.commune == commune),
                            },
                            commune
                        ]
                    }),
                    input_ev(Ev::Change, Msg::CommuneSelected),
                ],
            ],
            input_field(
                "Nom de la coopérative",
                &model.selection.coop_query,
                "Chercher une coopérative...",
                Msg::CoopQueryChanged,
            ),
            input_field(
                "Président/gestionnaire",
                &model.selection.representative_query,
                "Chercher un gestionnaire...",
                Msg::RepresentativeQueryChanged,
            ),
        ],
    ]
}

fn view_results(model: &Model) -> Node<Msg> {
    let entries = model.filtered.iter().enumerate().map(|(index, feature)| {
        let address = feature_address(feature, index);
        let name = Cooperative::from_feature(feature)
            .map(|coop| coop.display_name())
            .unwrap_or(MISSING_FIELD);
        let commune = Cooperative::from_feature(feature)
            .and_then(|coop| coop.commune())
            .unwrap_or(MISSING_FIELD);

        li![button![
            C!["result-entry"],
            h3![name],
            p![commune],
            ev(Ev::Click, move |event| {
                event.prevent_default();
                Msg::CooperativeSelected(address.clone())
            }),
        ]]
    });

    div![
        C!["results"],
        span![
            C!["results-count"],
            format!("Résultats ({})", model.filtered.len())
        ],
        if model.filtered.is_empty() {
            p![C!["results-empty"], "Aucune coopérative trouvée"]
        } else {
            ul![C!["results-list"], entries]
        }
    ]
}

#[wasm_bindgen(start)]
pub fn start() {
    init_map(
        to_plain_js(&DEFAULT_VIEW).unwrap_or(JsValue::NULL),
        DEFAULT_ZOOM,
    );
    App::start("app", init, update, view);
}

fn bool_attr(value: bool) -> AtValue {
    if value {
        AtValue::Some("true".into())
    } else {
        AtValue::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_urls_point_at_the_data_root() {
        assert_eq!(
            layer_url(Layer::Province),
            format!("{DEFAULT_DATA_ROOT}/PROVINCE_DRIOUCH.geojson")
        );
        assert_eq!(
            layer_url(Layer::Cooperatives),
            format!("{DEFAULT_DATA_ROOT}/Cooperatives_Driouch.geojson")
        );
    }

    #[test]
    fn test_commune_change_clears_feature_selection() {
        let mut selection = Selection {
            selected_id: Some("3".to_string()),
            ..Selection::default()
        };
        select_commune(&mut selection, "Midar".to_string());
        assert_eq!(selection.commune, "Midar");
        assert_eq!(selection.selected_id, None);
    }

    #[test]
    fn test_fetch_errors_carry_the_layer_label() {
        let error = fetch_error(Layer::Communes, "timeout".to_string());
        assert!(error.to_string().contains("communes"));
        assert!(error.to_string().contains("timeout"));
    }

    #[test]
    fn test_default_view_covers_the_province() {
        assert!(DEFAULT_VIEW.lat > 34.0 && DEFAULT_VIEW.lat < 36.0);
        assert!(DEFAULT_VIEW.lon > -4.0 && DEFAULT_VIEW.lon < -3.0);
        assert_eq!(DEFAULT_ZOOM, 10.0);
    }
}
