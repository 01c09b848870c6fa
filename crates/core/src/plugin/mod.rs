//! The chat-client plugin: keyboard shortcut → recognise selection → inject.
//!
//! Host integration goes through three narrow traits:
//! - [`SelectionSource`]: the user's current text selection
//! - [`TextInjector`]: best-effort replacement inside the live editor
//! - [`KeydownHost`]: where keydown listeners get attached
//!
//! Settings persist through a [`SettingsStore`].
//!
//! Nothing that goes wrong while handling a key press reaches the host:
//! unrecognised text, a missing editor and panics inside collaborators are
//! all logged and reported as a [`KeyOutcome`].

pub mod listeners;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

pub use listeners::{KeydownHost, Listeners};

use crate::markup::Edit;
use crate::matcher::{MatchResult, RecognizeError};
use crate::settings::Settings;
use crate::store::{SettingsStore, StoreError};
use crate::Chronostamp;

/// A key press as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub ctrl_key: bool,
    pub key: String,
}

impl KeyEvent {
    pub fn new(ctrl_key: bool, key: impl Into<String>) -> Self {
        Self {
            ctrl_key,
            key: key.into(),
        }
    }
}

/// The user's current text selection; empty when nothing is selected.
pub trait SelectionSource {
    fn selected_text(&self) -> String;
}

impl SelectionSource for str {
    fn selected_text(&self) -> String {
        self.to_string()
    }
}

impl SelectionSource for String {
    fn selected_text(&self) -> String {
        self.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InjectionError {
    #[error("no live text editor found")]
    EditorUnavailable,

    #[error("editor rejected the edit: {0}")]
    Rejected(String),
}

/// Applies an [`Edit`] to the host's live editor.
pub trait TextInjector {
    fn inject(&mut self, edit: &Edit) -> Result<(), InjectionError>;
}

/// What a key press did.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    /// Not a trigger chord.
    Ignored,
    /// The selection is not a recognisable date/time.
    Unrecognized(RecognizeError),
    Injected { result: MatchResult, edit: Edit },
    /// Recognised, but the editor could not be updated.
    InjectionFailed {
        result: MatchResult,
        error: InjectionError,
    },
    /// A collaborator panicked; carries the panic message.
    Panicked(String),
}

impl KeyOutcome {
    pub fn edit(&self) -> Option<&Edit> {
        match self {
            Self::Injected { edit, .. } => Some(edit),
            _ => None,
        }
    }
}

/// Plugin lifecycle and key handling.
///
/// Settings are not cached: every key press and settings edit reads the
/// current blob from the store.
pub struct DatetimePlugin<S: SettingsStore, H: KeydownHost> {
    engine: Chronostamp,
    store: S,
    host: H,
    listeners: Listeners<H::Target>,
}

impl<S: SettingsStore, H: KeydownHost> DatetimePlugin<S, H> {
    pub fn new(store: S, host: H) -> Self {
        Self {
            engine: Chronostamp::new(),
            store,
            host,
            listeners: Listeners::new(),
        }
    }

    /// Attach the keydown listener to the host document.
    pub fn start(&mut self) {
        if self.listeners.attach_document(&mut self.host) {
            tracing::info!(triggers = %self.bind_characters(), "Datetime plugin started");
        }
    }

    /// Detach every listener.
    pub fn stop(&mut self) {
        self.listeners.detach_all(&mut self.host);
        tracing::info!("Datetime plugin stopped");
    }

    pub fn is_running(&self) -> bool {
        self.listeners.has_document()
    }

    /// Attach the keydown listener to one more element.
    pub fn listen_to(&mut self, target: H::Target) -> bool {
        self.listeners.listen_to(&mut self.host, target)
    }

    pub fn stop_listening_to(&mut self, target: &H::Target) -> bool {
        self.listeners.stop_listening_to(&mut self.host, target)
    }

    pub fn listeners(&self) -> &Listeners<H::Target> {
        &self.listeners
    }

    /// Settings as currently stored.
    pub fn settings(&self) -> Settings {
        Settings::load(&self.store)
    }

    /// Current value of the "Bind Characters" settings field.
    pub fn bind_characters(&self) -> String {
        self.settings().bind_characters()
    }

    /// Apply and persist an edit of the "Bind Characters" field.
    pub fn set_bind_characters(&mut self, text: &str) -> Result<(), StoreError> {
        let mut settings = self.settings();
        settings.set_bind_characters(text);
        settings.save(&mut self.store)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Handle a key press.
    ///
    /// Acts only on Ctrl + a configured trigger character. The selection is
    /// read, recognised, and on success handed to `injector` as an [`Edit`].
    pub fn on_keydown<Sel, I>(
        &self,
        event: &KeyEvent,
        selection: &Sel,
        injector: &mut I,
    ) -> KeyOutcome
    where
        Sel: SelectionSource + ?Sized,
        I: TextInjector + ?Sized,
    {
        if !event.ctrl_key || !self.settings().is_trigger(&event.key) {
            return KeyOutcome::Ignored;
        }

        let transform = AssertUnwindSafe(|| self.transform_selection(selection, injector));
        match panic::catch_unwind(transform) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(panic = %message, "Keydown handler panicked");
                KeyOutcome::Panicked(message)
            }
        }
    }

    fn transform_selection<Sel, I>(&self, selection: &Sel, injector: &mut I) -> KeyOutcome
    where
        Sel: SelectionSource + ?Sized,
        I: TextInjector + ?Sized,
    {
        let text = selection.selected_text();
        let result = match self.engine.recognize(&text) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(error = %e, "Selection is not a timestamp");
                return KeyOutcome::Unrecognized(e);
            }
        };

        let edit = Edit::from_match(text, &result);
        match injector.inject(&edit) {
            Ok(()) => KeyOutcome::Injected { result, edit },
            Err(error) => {
                tracing::warn!(error = %error, markup = %edit.markup, "Could not inject timestamp");
                KeyOutcome::InjectionFailed { result, error }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
