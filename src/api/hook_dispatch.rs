use tracing::debug;

use crate::error::{TimelineError, TimelineResult};
use crate::extensions::{HookContext, HookDecision, HookEvent, PendingMutation, TimelineHook};
use crate::render::Renderer;

use super::TimelineEngine;

impl<R: Renderer> TimelineEngine<R> {
    /// Registers a hook with a unique identifier.
    pub fn add_hook(&mut self, hook: Box<dyn TimelineHook>) -> TimelineResult<()> {
        let hook_id = hook.id().to_owned();
        if hook_id.is_empty() {
            return Err(TimelineError::InvalidData(
                "hook id must not be empty".to_owned(),
            ));
        }
        if self.hooks.iter().any(|entry| entry.id() == hook_id) {
            return Err(TimelineError::InvalidData(format!(
                "hook with id `{hook_id}` is already registered"
            )));
        }
        self.hooks.push(hook);
        Ok(())
    }

    /// Unregisters a hook by id. Returns `true` when removed.
    pub fn remove_hook(&mut self, hook_id: &str) -> bool {
        match self.hooks.iter().position(|entry| entry.id() == hook_id) {
            Some(position) => {
                self.hooks.remove(position);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    #[must_use]
    pub fn has_hook(&self, hook_id: &str) -> bool {
        self.hooks.iter().any(|hook| hook.id() == hook_id)
    }

    pub(super) fn hook_context(&self) -> HookContext {
        HookContext {
            viewport: self.viewport,
            visible_range: self.range,
            events_len: self.store.len(),
            selection: self.selection,
            interaction_mode: self.interaction.mode(),
        }
    }

    pub(super) fn emit(&mut self, event: HookEvent) {
        let context = self.hook_context();
        for hook in &mut self.hooks {
            hook.on_event(event, context);
        }
    }

    /// Asks every hook in registration order; the first `Cancel` wins.
    pub(super) fn approve(&mut self, mutation: &PendingMutation) -> HookDecision {
        let context = self.hook_context();
        for hook in &mut self.hooks {
            if hook.before_commit(mutation, context) == HookDecision::Cancel {
                debug!(
                    hook = hook.id(),
                    id = %mutation.id(),
                    "hook vetoed pending mutation"
                );
                return HookDecision::Cancel;
            }
        }
        HookDecision::Proceed
    }
}
