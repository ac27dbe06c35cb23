use geojson::FeatureCollection;

use crate::error::LoadError;

/// The three independently-fetched GeoJSON documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Province,
    Communes,
    Cooperatives,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Province, Layer::Communes, Layer::Cooperatives];

    pub fn label(self) -> &'static str {
        match self {
            Layer::Province => "province",
            Layer::Communes => "communes",
            Layer::Cooperatives => "cooperatives",
        }
    }

    /// File name under the data root.
    pub fn file_name(self) -> &'static str {
        match self {
            Layer::Province => "PROVINCE_DRIOUCH.geojson",
            Layer::Communes => "COMMUNES_DRIOUCH.geojson",
            Layer::Cooperatives => "Cooperatives_Driouch.geojson",
        }
    }
}

pub fn parse_layer(layer: Layer, raw: &str) -> Result<FeatureCollection, LoadError> {
    serde_json::from_str(raw).map_err(|source| LoadError::Parse {
        layer: layer.label(),
        source,
    })
}

/// Joins the three concurrent layer fetches into one ready/error state.
///
/// Stays `Loading` until every layer has reported. Successful layers are kept
/// even when a sibling fails, so the view can show a clear error over
/// whatever partial data landed. Data is immutable once loaded; there is no
/// retry and no refetch.
#[derive(Debug, Default)]
pub struct DataLoader {
    province: Option<FeatureCollection>,
    communes: Option<FeatureCollection>,
    cooperatives: Option<FeatureCollection>,
    reported: [bool; 3],
    error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus<'a> {
    Loading,
    Ready,
    Failed(&'a str),
}

impl DataLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one fetch outcome. The first failure message is the one
    /// surfaced to the user; later outcomes for the same layer are ignored.
    pub fn record(&mut self, layer: Layer, outcome: Result<FeatureCollection, LoadError>) {
        let slot = layer as usize;
        if self.reported[slot] {
            tracing::warn!(layer = layer.label(), "duplicate fetch outcome ignored");
            return;
        }
        self.reported[slot] = true;

        match outcome {
            Ok(collection) => {
                tracing::info!(
                    layer = layer.label(),
                    features = collection.features.len(),
                    "layer loaded"
                );
                match layer {
                    Layer::Province => self.province = Some(collection),
                    Layer::Communes => self.communes = Some(collection),
                    Layer::Cooperatives => self.cooperatives = Some(collection),
                }
            }
            Err(error) => {
                tracing::error!(layer = layer.label(), %error, "layer failed to load");
                if self.error.is_none() {
                    self.error = Some(error.to_string());
                }
            }
        }
    }

    pub fn status(&self) -> LoadStatus<'_> {
        if self.reported.contains(&false) {
            LoadStatus::Loading
        } else if let Some(message) = &self.error {
            LoadStatus::Failed(message)
        } else {
            LoadStatus::Ready
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status(), LoadStatus::Loading)
    }

    pub fn province(&self) -> Option<&FeatureCollection> {
        self.province.as_ref()
    }

    pub fn communes(&self) -> Option<&FeatureCollection> {
        self.communes.as_ref()
    }

    pub fn cooperatives(&self) -> Option<&FeatureCollection> {
        self.cooperatives.as_ref()
    }
}
