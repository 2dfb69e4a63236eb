//! timeline-rs: interactive timeline engine.
//!
//! Events with a start and an optional end are laid out along a zoomable,
//! pannable time axis. Layout, interaction and animation are computed
//! headless; hosts supply text measurement and a `Renderer` backend.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{TimelineEngine, TimelineOptions};
pub use error::{TimelineError, TimelineResult};
