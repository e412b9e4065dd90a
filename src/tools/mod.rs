//! Interactive tools and their shared activation contract.
//!
//! Every tool is constructed once per session and owned by the
//! [`crate::overlay::Overlay`]. The overlay activates at most one tool at a
//! time; a tool only receives scene events while it holds subscriptions, and
//! it releases all of them before [`Tool::deactivate`] returns.

mod drawing;
mod lifecycle;
mod magnifier;
mod selection;

pub use drawing::{ArrowOptions, ArrowTool, RectOptions, RectTool};
pub use lifecycle::{Lifecycle, Phase, Subscriptions};
pub use magnifier::{
    HeadlessView, MagnifierOptions, MagnifierState, MagnifierTool, MagnifierView,
};
pub use selection::{
    ClipMask, CropTool, HoleMask, MaskBinding, MaskTool, SelectionGesture, SelectionOptions,
    SelectionTool,
};

use crate::error::OverlayError;
use crate::input::{EventHost, FrameId, ListenerKind, ToolKind, WheelDelta};
use crate::scene::{ObjectEvent, ObjectId, PointerEvent, Scene};

/// The session's mask primitive.
///
/// Exactly one variant exists per session, chosen by the selection tool
/// family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskOverlay {
    /// Dimming group whose children live in its local plane; the selection is
    /// cut out by a destination-out rectangle inside the group
    Hole { group: ObjectId },
    /// Full-canvas dimming rectangle restricted by an even-odd clip outline in
    /// scene coordinates
    Clip { overlay: ObjectId },
}

/// Everything a tool may touch while handling an event.
pub struct ToolContext<'a> {
    pub scene: &'a mut Scene,
    pub host: &'a mut dyn EventHost,
    pub mask: Option<MaskOverlay>,
}

/// Uniform activation contract shared by every interactive mode.
///
/// Implementors provide the tool-specific setup and teardown
/// ([`Tool::on_activate`], [`Tool::on_deactivate`]) and event handlers; the
/// provided [`Tool::activate`] and [`Tool::deactivate`] add the phase
/// bookkeeping and the optional global wheel listener.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    fn lifecycle(&self) -> &Lifecycle;

    fn lifecycle_mut(&mut self) -> &mut Lifecycle;

    /// Key that switches to this tool, if any.
    fn shortcut_key(&self) -> Option<&str> {
        None
    }

    /// Whether the tool wants wheel notifications while active.
    fn handles_wheel(&self) -> bool {
        false
    }

    /// Tool-specific setup: subscribe to scene events.
    fn on_activate(&mut self, ctx: &mut ToolContext<'_>) -> Result<(), OverlayError>;

    /// Tool-specific teardown: release every scene subscription.
    fn on_deactivate(&mut self, ctx: &mut ToolContext<'_>) -> Result<(), OverlayError>;

    fn on_pointer(
        &mut self,
        _ctx: &mut ToolContext<'_>,
        _event: &PointerEvent,
    ) -> Result<(), OverlayError> {
        Ok(())
    }

    fn on_object_event(
        &mut self,
        _ctx: &mut ToolContext<'_>,
        _object: ObjectId,
        _event: ObjectEvent,
    ) -> Result<(), OverlayError> {
        Ok(())
    }

    fn on_frame(&mut self, _ctx: &mut ToolContext<'_>, _frame: FrameId) -> Result<(), OverlayError> {
        Ok(())
    }

    fn on_wheel(&mut self, _ctx: &mut ToolContext<'_>, _delta: WheelDelta) {}

    fn is_active(&self) -> bool {
        self.lifecycle().is_active()
    }

    /// Inactive → Active. Calling it on an active tool is a no-op.
    ///
    /// If the wheel listener cannot be attached the tool-specific setup is
    /// rolled back and the tool stays inactive.
    fn activate(&mut self, ctx: &mut ToolContext<'_>) -> Result<(), OverlayError> {
        if self.is_active() {
            return Ok(());
        }

        self.on_activate(ctx)?;

        if self.handles_wheel() {
            match ctx.host.attach_listener(ListenerKind::Wheel) {
                Ok(id) => self.lifecycle_mut().wheel = Some(id),
                Err(err) => {
                    if let Err(rollback) = self.on_deactivate(ctx) {
                        log::error!(
                            "Rolling back {} tool setup failed: {}",
                            self.kind().label(),
                            rollback
                        );
                    }
                    return Err(err);
                }
            }
        }

        self.lifecycle_mut().phase = Phase::Active;
        log::debug!("{} tool activated", self.kind().label());
        Ok(())
    }

    /// Active → Inactive. Calling it on an inactive tool is a no-op.
    ///
    /// The tool is inactive and its wheel listener released when this
    /// returns, even if teardown reported an error.
    fn deactivate(&mut self, ctx: &mut ToolContext<'_>) -> Result<(), OverlayError> {
        if !self.is_active() {
            return Ok(());
        }
        self.lifecycle_mut().phase = Phase::Inactive;

        let teardown = self.on_deactivate(ctx);
        let detach = match self.lifecycle_mut().wheel.take() {
            Some(id) => ctx.host.detach_listener(id),
            None => Ok(()),
        };

        log::debug!("{} tool deactivated", self.kind().label());
        teardown.and(detach)
    }
}
