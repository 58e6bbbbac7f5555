//! Host integration: save/unsaved callbacks and scoped keyboard delivery.
//!
//! The editor never persists anything itself. It hands the finished region
//! list and image to an [`EditorHost`], and reports whether there is unsaved
//! work so the host can warn before navigating away.
//!
//! Keyboard shortcuts are document-wide in the host, so the editor listens
//! through a [`KeyboardHub`]. A [`KeyboardSubscription`] unbinds its listener
//! when dropped; [`MountedEditor`] ties that subscription to the editor's
//! time on screen.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::editor::RegionEditor;
use crate::input::KeyEvent;
use crate::model::Region;
use crate::source_image::LoadedImage;

/// Callbacks from the editor to the surrounding application.
pub trait EditorHost {
    /// The operator asked to save. `image` is the loaded reference image.
    fn on_save(&mut self, regions: &[Region], image: &LoadedImage);

    /// Whether the editor holds work that has not been saved.
    fn on_unsaved_changes(&mut self, _has_unsaved: bool) {}
}

/// Host that ignores every callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl EditorHost for NullHost {
    fn on_save(&mut self, regions: &[Region], _image: &LoadedImage) {
        log::debug!("Save requested with {} regions but no host is attached", regions.len());
    }
}

type Listener = Rc<RefCell<dyn FnMut(&KeyEvent) -> bool>>;

#[derive(Default)]
struct HubInner {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Document-level keyboard event source.
#[derive(Clone, Default)]
pub struct KeyboardHub {
    inner: Rc<RefCell<HubInner>>,
}

impl KeyboardHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It receives events until the returned guard is dropped.
    ///
    /// The listener returns `true` when it handled the event.
    pub fn subscribe<F>(&self, listener: F) -> KeyboardSubscription
    where
        F: FnMut(&KeyEvent) -> bool + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let listener: Listener = Rc::new(RefCell::new(listener));
        inner.listeners.push((id, listener));
        log::debug!("Keyboard listener {} subscribed", id);
        KeyboardSubscription {
            id,
            hub: Rc::downgrade(&self.inner),
        }
    }

    /// Deliver `event` to every live listener. Returns `true` if any handled it.
    ///
    /// Listeners may subscribe or unsubscribe while being called; a listener
    /// removed during dispatch is not called afterwards.
    pub fn dispatch(&self, event: &KeyEvent) -> bool {
        let listeners: Vec<(u64, Listener)> = self.inner.borrow().listeners.clone();
        let mut handled = false;
        for (id, listener) in listeners {
            if !self.is_subscribed(id) {
                continue;
            }
            match listener.try_borrow_mut() {
                Ok(mut listener) => handled |= (&mut *listener)(event),
                Err(_) => log::warn!("Keyboard listener {} re-entered, skipping", id),
            }
        }
        handled
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    fn is_subscribed(&self, id: u64) -> bool {
        self.inner.borrow().listeners.iter().any(|(l, _)| *l == id)
    }
}

/// Guard for a keyboard listener; dropping it unsubscribes.
#[must_use = "dropping the subscription immediately unbinds the listener"]
pub struct KeyboardSubscription {
    id: u64,
    hub: Weak<RefCell<HubInner>>,
}

impl Drop for KeyboardSubscription {
    fn drop(&mut self) {
        let Some(hub) = self.hub.upgrade() else {
            return;
        };
        if let Ok(mut inner) = hub.try_borrow_mut() {
            inner.listeners.retain(|(id, _)| *id != self.id);
            log::debug!("Keyboard listener {} unsubscribed", self.id);
        }
    }
}

/// An editor on screen: shortcuts reach it only while this value lives.
pub struct MountedEditor {
    editor: Rc<RefCell<RegionEditor>>,
    _keyboard: KeyboardSubscription,
}

impl MountedEditor {
    /// Mount `editor` and bind its shortcuts on `hub`.
    pub fn mount(editor: RegionEditor, hub: &KeyboardHub) -> Self {
        let editor = Rc::new(RefCell::new(editor));
        let target = Rc::downgrade(&editor);
        let keyboard = hub.subscribe(move |event| {
            let Some(editor) = target.upgrade() else {
                return false;
            };
            match editor.try_borrow_mut() {
                Ok(mut editor) => editor.handle_key(event),
                Err(_) => false,
            }
        });
        log::info!("Editor mounted");
        Self {
            editor,
            _keyboard: keyboard,
        }
    }

    /// Shared handle to the editor, for pointer input and rendering.
    pub fn editor(&self) -> &Rc<RefCell<RegionEditor>> {
        &self.editor
    }

    /// Unbind shortcuts and take the editor off screen.
    pub fn unmount(self) {
        log::info!("Editor unmounted");
    }
}
