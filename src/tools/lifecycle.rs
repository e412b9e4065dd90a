//! Activation phase and subscription bookkeeping shared by every tool.

use crate::error::OverlayError;
use crate::input::{ListenerId, ToolKind};
use crate::scene::{ObjectEvent, ObjectId, Scene, SubscriptionId, SurfaceEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Inactive,
    Active,
}

/// Per-tool activation state.
#[derive(Debug, Default)]
pub struct Lifecycle {
    pub phase: Phase,
    /// Global wheel listener held while active
    pub wheel: Option<ListenerId>,
}

impl Lifecycle {
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn has_wheel_listener(&self) -> bool {
        self.wheel.is_some()
    }
}

/// Scene subscriptions a tool holds, released together.
#[derive(Debug, Default)]
pub struct Subscriptions {
    ids: Vec<SubscriptionId>,
}

impl Subscriptions {
    pub fn on(&mut self, scene: &mut Scene, owner: ToolKind, event: SurfaceEvent) {
        self.ids.push(scene.on(owner, event));
    }

    pub fn on_object(
        &mut self,
        scene: &mut Scene,
        owner: ToolKind,
        object: ObjectId,
        events: &[ObjectEvent],
    ) -> Result<(), OverlayError> {
        for event in events {
            self.ids.push(scene.on_object(owner, object, *event)?);
        }
        Ok(())
    }

    /// Unsubscribes everything. Calling it again is a no-op.
    pub fn release(&mut self, scene: &mut Scene) {
        for id in self.ids.drain(..) {
            scene.off(id);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
