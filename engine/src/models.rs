use serde::{Deserialize, Serialize};

/// Sentinel commune value meaning "no commune filter applied".
pub const ALL_COMMUNES: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn from_point(point: Coordinate) -> Self {
        Self {
            min_lat: point.lat,
            max_lat: point.lat,
            min_lon: point.lon,
            max_lon: point.lon,
        }
    }

    pub fn include(&mut self, point: Coordinate) {
        self.min_lat = self.min_lat.min(point.lat);
        self.max_lat = self.max_lat.max(point.lat);
        self.min_lon = self.min_lon.min(point.lon);
        self.max_lon = self.max_lon.max(point.lon);
    }

    pub fn center(&self) -> Coordinate {
        Coordinate {
            lat: (self.min_lat + self.max_lat) / 2.0,
            lon: (self.min_lon + self.max_lon) / 2.0,
        }
    }
}

/// Map command: fit the viewport to `bounds`, keeping `padding` pixels of
/// margin, optionally capped at `max_zoom` so tiny areas do not over-zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitBounds {
    pub bounds: BoundingBox,
    pub padding: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<f64>,
}

/// Map command: open the detail popup of the feature at `feature_index` in
/// the rendered layer, centering on `center` when the feature has a point
/// location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FocusTarget {
    pub feature_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<Coordinate>,
    pub zoom: f64,
}

/// Filter and selection state, owned by the view layer. The engine only ever
/// reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub commune: String,
    pub coop_query: String,
    pub representative_query: String,
    pub selected_id: Option<String>,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            commune: ALL_COMMUNES.to_string(),
            coop_query: String::new(),
            representative_query: String::new(),
            selected_id: None,
        }
    }
}

impl Selection {
    pub fn all_communes(&self) -> bool {
        self.commune == ALL_COMMUNES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selection_is_unfiltered() {
        let selection = Selection::default();
        assert!(selection.all_communes());
        assert!(selection.coop_query.is_empty());
        assert!(selection.representative_query.is_empty());
        assert!(selection.selected_id.is_none());
    }

    #[test]
    fn bounding_box_grows_to_include_points() {
        let mut bounds = BoundingBox::from_point(Coordinate { lat: 34.9, lon: -3.4 });
        bounds.include(Coordinate { lat: 35.2, lon: -3.8 });
        bounds.include(Coordinate { lat: 34.7, lon: -3.1 });

        assert_eq!(bounds.min_lat, 34.7);
        assert_eq!(bounds.max_lat, 35.2);
        assert_eq!(bounds.min_lon, -3.8);
        assert_eq!(bounds.max_lon, -3.1);

        let center = bounds.center();
        assert!((center.lat - 34.95).abs() < 1e-9);
        assert!((center.lon - (-3.45)).abs() < 1e-9);
    }
}
