//! Keydown listener bookkeeping.
//!
//! The host document gets a listener on start; further elements can be
//! registered individually. Registration is idempotent in both directions.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

/// Where keydown listeners are attached: the host document and its elements.
pub trait KeydownHost {
    /// Identity of a listener target.
    type Target: Eq + Hash + Clone + fmt::Debug;

    /// The top-level document.
    fn document(&self) -> Self::Target;

    fn add_keydown_listener(&mut self, target: &Self::Target);

    fn remove_keydown_listener(&mut self, target: &Self::Target);
}

/// Targets that currently have the plugin's keydown listener.
#[derive(Debug, Clone)]
pub struct Listeners<T> {
    document: Option<T>,
    elements: HashSet<T>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            document: None,
            elements: HashSet::new(),
        }
    }
}

impl<T: Eq + Hash + Clone + fmt::Debug> Listeners<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to the host document. Returns `false` if already attached.
    pub fn attach_document<H: KeydownHost<Target = T>>(&mut self, host: &mut H) -> bool {
        if self.document.is_some() {
            return false;
        }
        let document = host.document();
        host.add_keydown_listener(&document);
        self.document = Some(document);
        true
    }

    /// Attach to one element. Returns `false` if it already has a listener.
    pub fn listen_to<H: KeydownHost<Target = T>>(&mut self, host: &mut H, target: T) -> bool {
        if self.is_listening(&target) {
            return false;
        }
        host.add_keydown_listener(&target);
        self.elements.insert(target);
        true
    }

    /// Detach from one element. Returns `false` if it had no listener.
    pub fn stop_listening_to<H: KeydownHost<Target = T>>(
        &mut self,
        host: &mut H,
        target: &T,
    ) -> bool {
        if !self.elements.remove(target) {
            return false;
        }
        host.remove_keydown_listener(target);
        true
    }

    /// Detach from the document and every element.
    pub fn detach_all<H: KeydownHost<Target = T>>(&mut self, host: &mut H) {
        if let Some(document) = self.document.take() {
            host.remove_keydown_listener(&document);
        }
        for target in self.elements.drain() {
            host.remove_keydown_listener(&target);
        }
    }

    pub fn is_listening(&self, target: &T) -> bool {
        self.document.as_ref() == Some(target) || self.elements.contains(target)
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    /// Number of element listeners, not counting the document.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
