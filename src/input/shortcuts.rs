//! Single-key shortcut dispatch.

use super::events::{Focus, KeyPress};
use super::host::{EventHost, ListenerId, ListenerKind};
use crate::error::OverlayError;
use std::collections::HashMap;

type Handler<A> = Box<dyn FnMut() -> A>;

/// Maps key identifiers to zero-argument callbacks.
///
/// A callback's return value is handed back to the caller of [`dispatch`], so
/// the owner can act on it (the overlay binds each tool key to a closure that
/// yields the tool to switch to) without the callback borrowing the owner.
///
/// Key presses are ignored while host text-input focus is active and while the
/// dispatcher is not listening.
///
/// [`dispatch`]: ShortcutDispatcher::dispatch
pub struct ShortcutDispatcher<A> {
    shortcuts: HashMap<String, Handler<A>>,
    listener: Option<ListenerId>,
}

impl<A> Default for ShortcutDispatcher<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> ShortcutDispatcher<A> {
    pub fn new() -> Self {
        Self {
            shortcuts: HashMap::new(),
            listener: None,
        }
    }

    /// Binds `key` to `handler`. A second registration for the same key
    /// replaces the first.
    pub fn register(&mut self, key: impl Into<String>, handler: impl FnMut() -> A + 'static) {
        let key = key.into();
        if self.shortcuts.insert(key.clone(), Box::new(handler)).is_some() {
            log::warn!("Shortcut '{}' re-registered; the previous binding was replaced", key);
        }
    }

    /// Removes the binding for `key`, if any.
    pub fn unregister(&mut self, key: &str) {
        self.shortcuts.remove(key);
    }

    pub fn is_registered(&self, key: &str) -> bool {
        self.shortcuts.contains_key(key)
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    /// Attaches the global keyboard listener. Calling it again is a no-op.
    pub fn start_listening(&mut self, host: &mut dyn EventHost) -> Result<(), OverlayError> {
        if self.listener.is_none() {
            self.listener = Some(host.attach_listener(ListenerKind::Keyboard)?);
            log::debug!("Shortcut dispatcher listening");
        }
        Ok(())
    }

    /// Detaches the global keyboard listener. Calling it again is a no-op.
    ///
    /// The dispatcher stops listening even when the host reports a detach
    /// failure; the error is still returned.
    pub fn stop_listening(&mut self, host: &mut dyn EventHost) -> Result<(), OverlayError> {
        if let Some(id) = self.listener.take() {
            host.detach_listener(id)?;
            log::debug!("Shortcut dispatcher stopped listening");
        }
        Ok(())
    }

    /// Runs the callback bound to the pressed key and returns its value.
    pub fn dispatch(&mut self, press: &KeyPress) -> Option<A> {
        if self.listener.is_none() || press.focus == Focus::TextInput {
            return None;
        }

        let name = press.key.name()?;
        let handler = self.shortcuts.get_mut(&name)?;
        Some(handler())
    }
}
