use serde::{Deserialize, Serialize};

use super::BoundingBox;

/// The spatial footprint of a monitored request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestData {
    /// Raw query string as captured from the request, without the leading `?`
    pub query_string: Option<String>,

    /// Bounding box requested, if the operation carried one
    pub bbox: Option<BoundingBox>,
}

impl RequestData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query_string(mut self, query_string: impl Into<String>) -> Self {
        self.query_string = Some(query_string.into());
        self
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }
}
