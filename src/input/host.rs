//! Host-provided event sources.
//!
//! Global keyboard/wheel listeners and display-frame callbacks belong to the
//! embedding host (a web view, a Wayland surface, a test harness). The overlay
//! never registers them ambiently: it asks an injected [`EventHost`] for a
//! listener handle and hands it back on teardown, so repeated session
//! creation and disposal cannot leak listeners.

use crate::error::OverlayError;
use std::collections::BTreeSet;

/// Kind of global listener the overlay may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListenerKind {
    /// Key presses feeding the shortcut dispatcher
    Keyboard,
    /// Wheel notifications feeding the active tool
    Wheel,
}

/// Handle for an attached global listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Handle for a requested display-frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u64);

/// Capability the host lends to the overlay for global input and frame pacing.
pub trait EventHost {
    /// Starts delivering events of `kind`; the returned handle detaches them.
    fn attach_listener(&mut self, kind: ListenerKind) -> Result<ListenerId, OverlayError>;

    /// Stops delivering events for a previously attached listener.
    fn detach_listener(&mut self, id: ListenerId) -> Result<(), OverlayError>;

    /// Schedules one callback before the next repaint.
    fn request_frame(&mut self) -> FrameId;

    /// Cancels a pending frame callback; unknown ids are ignored.
    fn cancel_frame(&mut self, id: FrameId);
}

/// In-process [`EventHost`] that only keeps bookkeeping.
///
/// Headless hosts drive it by draining [`LocalHost::take_frames`] and feeding
/// the ids back to the overlay; tests use it to observe listener counts and to
/// inject attach/detach failures.
#[derive(Debug, Default)]
pub struct LocalHost {
    next_id: u64,
    listeners: Vec<(ListenerId, ListenerKind)>,
    frames: BTreeSet<FrameId>,
    fail_attach: bool,
    fail_detach: bool,
}

impl LocalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent attach fail.
    pub fn fail_attach(&mut self, fail: bool) {
        self.fail_attach = fail;
    }

    /// Makes every subsequent detach fail (the listener is still dropped).
    pub fn fail_detach(&mut self, fail: bool) {
        self.fail_detach = fail;
    }

    /// Number of live listeners of the given kind.
    pub fn listener_count(&self, kind: ListenerKind) -> usize {
        self.listeners.iter().filter(|(_, k)| *k == kind).count()
    }

    /// Frame callbacks requested and not yet delivered or cancelled.
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    /// Drains the pending frame callbacks in request order.
    pub fn take_frames(&mut self) -> Vec<FrameId> {
        std::mem::take(&mut self.frames).into_iter().collect()
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl EventHost for LocalHost {
    fn attach_listener(&mut self, kind: ListenerKind) -> Result<ListenerId, OverlayError> {
        if self.fail_attach {
            return Err(OverlayError::Listener(format!(
                "host refused {kind:?} listener"
            )));
        }
        let id = ListenerId(self.next());
        self.listeners.push((id, kind));
        log::trace!("Attached {:?} listener {:?}", kind, id);
        Ok(id)
    }

    fn detach_listener(&mut self, id: ListenerId) -> Result<(), OverlayError> {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        if self.fail_detach {
            return Err(OverlayError::Listener(format!(
                "host failed to detach listener {id:?}"
            )));
        }
        if self.listeners.len() == before {
            log::debug!("Detach of unknown listener {:?} ignored", id);
        }
        Ok(())
    }

    fn request_frame(&mut self) -> FrameId {
        let id = FrameId(self.next());
        self.frames.insert(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        self.frames.remove(&id);
    }
}
