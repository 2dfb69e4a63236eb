mod axis_builder;
mod data_controller;
mod engine;
mod engine_config;
mod engine_init;
mod engine_snapshot;
mod hook_dispatch;
mod interaction_controller;
mod json_contract;
mod layout_pass;
mod range_controller;
mod render_frame_builder;
mod selection_controller;
mod validation;

pub use axis_builder::AxisTick;
pub use engine::TimelineEngine;
pub use engine_config::TimelineOptions;
pub use engine_snapshot::{EngineSnapshot, EventRow};
pub use json_contract::{ENGINE_SNAPSHOT_JSON_SCHEMA_V1, EngineSnapshotJsonContractV1};
