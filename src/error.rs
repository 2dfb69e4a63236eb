use thiserror::Error;

use crate::core::EventId;

pub type TimelineResult<T> = Result<T, TimelineError>;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("invalid range: start={start}, end={end}")]
    InvalidRange { start: f64, end: f64 },

    #[error("event {0} is not in the store")]
    RowOutOfRange(EventId),

    #[error("viewport is stale: cached width={cached}, actual width={actual}")]
    ViewportStale { cached: u32, actual: u32 },

    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),
}
