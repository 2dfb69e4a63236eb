pub mod animation;
pub mod event;
pub mod event_store;
pub mod layout;
pub mod measure;
pub mod primitives;
pub mod range;
pub mod scale;
pub mod step_date;
pub mod types;

pub use animation::{ANIMATION_INTERVAL_MS, Animator};
pub use event::{Event, EventId, EventKind, EventPatch};
pub use event_store::EventStore;
pub use layout::{
    AxisPlacement, EventLayout, GroupBand, LaidOutEvent, LayoutConfig, LayoutEngine, LayoutInput,
    LayoutOutput,
};
pub use measure::{FixedMetrics, MeasurementProvider, TextRole, TextSize};
pub use range::{RangeLimits, VisibleRange};
pub use scale::CoordinateMapper;
pub use step_date::{STEP_LADDER, ScaleUnit, StepDate, StepSpec, select_step};
pub use types::{Timestamp, Viewport};
