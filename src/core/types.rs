use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wall-clock instant used for every event boundary and range edge.
pub type Timestamp = DateTime<Utc>;

/// Outer size of the timeline frame in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}
