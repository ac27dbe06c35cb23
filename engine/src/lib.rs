pub mod error;
pub mod filter;
pub mod loader;
pub mod models;
pub mod schema;
pub mod viewport;

pub use error::LoadError;
pub use loader::{DataLoader, Layer, LoadStatus};
pub use models::{BoundingBox, Coordinate, FitBounds, FocusTarget, Selection, ALL_COMMUNES};
