use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch {layer} layer: {reason}")]
    Fetch { layer: &'static str, reason: String },
    #[error("invalid GeoJSON in {layer} layer: {source}")]
    Parse {
        layer: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
