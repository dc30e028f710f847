//! GoalSelector ECS component: runs at most one of a mob's behaviors.

use bevy_ecs::prelude::*;
use tracing::debug;

use super::behavior::{Behavior, BehaviorContext, BehaviorOutput};
use super::navigator::PathNavigator;

/// Ordered behaviors (earlier = higher priority) and the index of the active one.
///
/// Selection is non-preemptive: once a behavior is active it keeps running
/// until its own `should_continue` fails, even if a higher-priority behavior
/// becomes startable in the meantime.
#[derive(Component, Default)]
pub struct GoalSelector {
    behaviors: Vec<Box<dyn Behavior>>,
    active: Option<usize>,
}

impl GoalSelector {
    /// Create a selector from a priority-ordered list of behaviors.
    pub fn new(behaviors: Vec<Box<dyn Behavior>>) -> Self {
        Self {
            behaviors,
            active: None,
        }
    }

    /// Append a behavior with lower priority than every existing one.
    pub fn add_behavior(&mut self, behavior: Box<dyn Behavior>) -> &mut Self {
        self.behaviors.push(behavior);
        self
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    /// Index of the active behavior.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Name of the active behavior.
    pub fn active_name(&self) -> Option<&'static str> {
        self.active.map(|i| self.behaviors[i].name())
    }

    /// Names in priority order.
    pub fn names(&self) -> Vec<&'static str> {
        self.behaviors.iter().map(|b| b.name()).collect()
    }

    /// Run one selection step and tick the active behavior.
    pub fn tick(&mut self, ctx: &BehaviorContext<'_>, nav: &mut PathNavigator) -> BehaviorOutput {
        if let Some(index) = self.active {
            if !self.behaviors[index].should_continue(ctx) {
                self.deactivate(index, nav);
            }
        }

        if self.active.is_none() {
            if let Some(index) = self.behaviors.iter().position(|b| b.can_start(ctx)) {
                debug!(behavior = self.behaviors[index].name(), "behavior started");
                self.behaviors[index].start(ctx, nav);
                self.active = Some(index);
            }
        }

        match self.active {
            Some(index) => self.behaviors[index].tick(ctx, nav),
            None => BehaviorOutput::default(),
        }
    }

    /// Stop the active behavior (if any), e.g. when the mob despawns.
    pub fn reset(&mut self, nav: &mut PathNavigator) {
        if let Some(index) = self.active {
            self.deactivate(index, nav);
        }
    }

    fn deactivate(&mut self, index: usize, nav: &mut PathNavigator) {
        debug!(behavior = self.behaviors[index].name(), "behavior stopped");
        self.behaviors[index].stop();
        nav.clear();
        self.active = None;
    }
}

impl std::fmt::Debug for GoalSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoalSelector")
            .field("behaviors", &self.names())
            .field("active", &self.active_name())
            .finish()
    }
}
