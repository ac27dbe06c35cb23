//! Reconciles selection state with the map viewport.
//!
//! Two independent rules, each pure and re-evaluated by the view layer
//! whenever its inputs change:
//!
//! - **Commune rule** ([`commune_viewport`]): the selected commune resolves
//!   to a bounding box to fit, from the whole boundary collection ("All") or
//!   from the first boundary carrying the selected name.
//! - **Focus rule** ([`focus_target`]): a selected cooperative id resolves
//!   against the rendered layer, by GeoJSON id first and positional index as
//!   fallback, to a center/zoom/popup command.
//!
//! Boundary data is best-effort enrichment: empty or malformed geometry
//! yields `None` (no viewport change), never an error.

use geojson::{feature::Id, Feature, FeatureCollection, Value};

use crate::models::{BoundingBox, Coordinate, FitBounds, FocusTarget, ALL_COMMUNES};
use crate::schema;

/// Margin kept around a fitted bounding box, in screen pixels.
pub const FIT_PADDING_PX: u32 = 50;
/// Single communes get a wider margin and a zoom cap, so small boundaries do
/// not fill the screen at street level.
pub const COMMUNE_FIT_PADDING_PX: u32 = 60;
pub const COMMUNE_MAX_ZOOM: f64 = 13.0;
/// Zoom applied when centering on a single cooperative.
pub const FOCUS_ZOOM: f64 = 15.0;

/// Viewport fit for the selected commune, or `None` when nothing should
/// change (boundaries missing, name unmatched, or unusable geometry).
///
/// When several boundaries share the selected name, the first one wins; the
/// source data does not disambiguate further.
pub fn commune_viewport(communes: Option<&FeatureCollection>, commune: &str) -> Option<FitBounds> {
    let communes = communes?;

    if commune == ALL_COMMUNES {
        let bounds = collection_bounds(communes)?;
        return Some(FitBounds {
            bounds,
            padding: FIT_PADDING_PX,
            max_zoom: None,
        });
    }

    let Some(boundary) = communes.features.iter().find(|feature| {
        feature
            .properties
            .as_ref()
            .and_then(schema::boundary_name)
            == Some(commune)
    }) else {
        tracing::debug!(commune, "no boundary matches the selected commune");
        return None;
    };

    Some(FitBounds {
        bounds: feature_bounds(boundary)?,
        padding: COMMUNE_FIT_PADDING_PX,
        max_zoom: Some(COMMUNE_MAX_ZOOM),
    })
}

/// Focus command for a selected cooperative id, resolved against the
/// currently rendered features.
///
/// Ids are matched against the features' own GeoJSON ids first; an id that
/// matches none is then read as a positional index into the rendered order.
/// The index fallback is best-effort only: it goes stale whenever the
/// filtered list changes shape, in which case the selection resolves to
/// `None` and the view does nothing.
pub fn focus_target(rendered: &[Feature], id: &str) -> Option<FocusTarget> {
    let index = rendered
        .iter()
        .position(|feature| id_matches(feature, id))
        .or_else(|| {
            let index: usize = id.parse().ok()?;
            (index < rendered.len()).then_some(index)
        });

    let Some(index) = index else {
        tracing::debug!(id, "selected cooperative is not in the rendered layer");
        return None;
    };

    Some(FocusTarget {
        feature_index: index,
        center: point_location(&rendered[index]),
        zoom: FOCUS_ZOOM,
    })
}

/// Stable address of a rendered feature: its GeoJSON id when present, its
/// position in the rendered order otherwise.
pub fn feature_address(feature: &Feature, index: usize) -> String {
    match &feature.id {
        Some(Id::String(id)) => id.clone(),
        Some(Id::Number(id)) => id.to_string(),
        None => index.to_string(),
    }
}

fn id_matches(feature: &Feature, id: &str) -> bool {
    match &feature.id {
        Some(Id::String(value)) => value == id,
        Some(Id::Number(value)) => value.to_string() == id,
        None => false,
    }
}

/// Point location of a feature, when its geometry is a point.
pub fn point_location(feature: &Feature) -> Option<Coordinate> {
    match feature.geometry.as_ref().map(|geometry| &geometry.value) {
        Some(Value::Point(position)) => position_coordinate(position),
        _ => None,
    }
}

/// Bounding box of every usable position in the collection.
pub fn collection_bounds(collection: &FeatureCollection) -> Option<BoundingBox> {
    let mut bounds = None;
    for feature in &collection.features {
        if let Some(geometry) = &feature.geometry {
            accumulate(&geometry.value, &mut bounds);
        }
    }
    if bounds.is_none() {
        tracing::debug!("collection has no usable geometry, leaving viewport unchanged");
    }
    bounds
}

pub fn feature_bounds(feature: &Feature) -> Option<BoundingBox> {
    let mut bounds = None;
    if let Some(geometry) = &feature.geometry {
        accumulate(&geometry.value, &mut bounds);
    }
    bounds
}

fn accumulate(value: &Value, bounds: &mut Option<BoundingBox>) {
    match value {
        Value::Point(position) => include_position(position, bounds),
        Value::MultiPoint(positions) | Value::LineString(positions) => {
            for position in positions {
                include_position(position, bounds);
            }
        }
        Value::Polygon(rings) | Value::MultiLineString(rings) => {
            for ring in rings {
                for position in ring {
                    include_position(position, bounds);
                }
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                for ring in rings {
                    for position in ring {
                        include_position(position, bounds);
                    }
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                accumulate(&geometry.value, bounds);
            }
        }
    }
}

fn include_position(position: &[f64], bounds: &mut Option<BoundingBox>) {
    let Some(coordinate) = position_coordinate(position) else {
        return;
    };
    match bounds {
        Some(bounds) => bounds.include(coordinate),
        None => *bounds = Some(BoundingBox::from_point(coordinate)),
    }
}

// GeoJSON positions are [lon, lat, ...]; short or non-finite positions are
// skipped rather than propagated.
fn position_coordinate(position: &[f64]) -> Option<Coordinate> {
    match position {
        [lon, lat, ..] if lon.is_finite() && lat.is_finite() => Some(Coordinate {
            lat: *lat,
            lon: *lon,
        }),
        _ => {
            tracing::debug!(?position, "skipping malformed position");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn boundaries() -> FeatureCollection {
        serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "NAME": "Driouch" },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[-3.5, 34.8], [-3.3, 34.8], [-3.3, 35.0], [-3.5, 35.0], [-3.5, 34.8]]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": { "nom": "Midar" },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[-3.6, 34.9], [-3.5, 34.9], [-3.5, 35.1], [-3.6, 35.1], [-3.6, 34.9]]]
                    }
                }
            ]
        }))
        .expect("valid boundaries")
    }

    fn point_feature(id: Option<serde_json::Value>, lon: f64, lat: f64) -> Feature {
        let mut feature = json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [lon, lat] },
            "properties": { "NomCoop": "Coop" }
        });
        if let Some(id) = id {
            feature["id"] = id;
        }
        serde_json::from_value(feature).expect("valid feature")
    }

    #[test]
    fn all_communes_fit_the_whole_collection() {
        let fit = commune_viewport(Some(&boundaries()), ALL_COMMUNES).expect("fit");
        assert_eq!(fit.padding, FIT_PADDING_PX);
        assert_eq!(fit.max_zoom, None);
        assert_eq!(fit.bounds.min_lon, -3.6);
        assert_eq!(fit.bounds.max_lon, -3.3);
        assert_eq!(fit.bounds.min_lat, 34.8);
        assert_eq!(fit.bounds.max_lat, 35.1);
    }

    #[test]
    fn named_commune_fits_its_own_boundary_with_zoom_cap() {
        let fit = commune_viewport(Some(&boundaries()), "Midar").expect("fit");
        assert_eq!(fit.padding, COMMUNE_FIT_PADDING_PX);
        assert_eq!(fit.max_zoom, Some(COMMUNE_MAX_ZOOM));
        assert_eq!(fit.bounds.min_lon, -3.6);
        assert_eq!(fit.bounds.max_lon, -3.5);
    }

    #[test]
    fn unmatched_commune_changes_nothing() {
        assert_eq!(commune_viewport(Some(&boundaries()), "Nador"), None);
        assert_eq!(commune_viewport(None, "Driouch"), None);
    }

    #[test]
    fn empty_collection_yields_no_bounds() {
        let empty: FeatureCollection =
            serde_json::from_value(json!({ "type": "FeatureCollection", "features": [] }))
                .unwrap();
        assert_eq!(commune_viewport(Some(&empty), ALL_COMMUNES), None);
    }

    #[test]
    fn focus_prefers_geojson_ids_over_indices() {
        // Feature 0 has id "1"; a bare index read of "1" would hit feature 1.
        let rendered = vec![
            point_feature(Some(json!("1")), -3.40, 34.95),
            point_feature(None, -3.50, 35.00),
        ];
        let target = focus_target(&rendered, "1").expect("target");
        assert_eq!(target.feature_index, 0);
        assert_eq!(target.zoom, FOCUS_ZOOM);
        let center = target.center.expect("point location");
        assert_eq!(center.lon, -3.40);
        assert_eq!(center.lat, 34.95);
    }

    #[test]
    fn focus_falls_back_to_positional_index() {
        let rendered = vec![
            point_feature(None, -3.40, 34.95),
            point_feature(None, -3.50, 35.00),
        ];
        let target = focus_target(&rendered, "1").expect("target");
        assert_eq!(target.feature_index, 1);
    }

    #[test]
    fn stale_selection_is_a_no_op() {
        let rendered = vec![point_feature(None, -3.40, 34.95)];
        assert_eq!(focus_target(&rendered, "7"), None);
        assert_eq!(focus_target(&rendered, "missing-id"), None);
        assert_eq!(focus_target(&[], "0"), None);
    }

    #[test]
    fn numeric_geojson_ids_match_textually() {
        let rendered = vec![
            point_feature(None, -3.40, 34.95),
            point_feature(Some(json!(42)), -3.50, 35.00),
        ];
        let target = focus_target(&rendered, "42").expect("target");
        assert_eq!(target.feature_index, 1);
    }

    #[test]
    fn feature_addresses_prefer_ids() {
        let with_id = point_feature(Some(json!("coop-9")), -3.4, 34.9);
        let without_id = point_feature(None, -3.4, 34.9);
        assert_eq!(feature_address(&with_id, 3), "coop-9");
        assert_eq!(feature_address(&without_id, 3), "3");
    }

    #[test]
    fn malformed_positions_are_skipped() {
        let feature: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": { "type": "LineString", "coordinates": [[-3.4], [-3.5, 35.0]] },
            "properties": {}
        }))
        .expect("valid feature");
        let bounds = feature_bounds(&feature).expect("one usable position");
        assert_eq!(bounds.min_lon, -3.5);
        assert_eq!(bounds.max_lon, -3.5);
    }

    #[test]
    fn geometry_collections_are_walked_recursively() {
        let feature: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": {
                "type": "GeometryCollection",
                "geometries": [
                    { "type": "Point", "coordinates": [-3.2, 34.7] },
                    { "type": "MultiPoint", "coordinates": [[-3.7, 35.2]] }
                ]
            },
            "properties": {}
        }))
        .expect("valid feature");
        let bounds = feature_bounds(&feature).expect("bounds");
        assert_eq!(bounds.min_lon, -3.7);
        assert_eq!(bounds.max_lon, -3.2);
        assert_eq!(bounds.min_lat, 34.7);
        assert_eq!(bounds.max_lat, 35.2);
    }
}
