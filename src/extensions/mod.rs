//! Host-facing extension points.
//!
//! Hooks observe engine notifications and may veto pending mutations; they
//! never reach into engine internals directly.

pub mod plugins;

pub use plugins::{HookContext, HookDecision, HookEvent, PendingMutation, TimelineHook};
