pub mod geometry;
pub mod request;

pub use geometry::{BoundingBox, ConjunctionMode, Crs, ValidityMode};
pub use request::RequestData;
