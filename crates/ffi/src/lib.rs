//! UniFFI bindings for Chronostamp.
//!
//! This crate exposes recognition and the plugin session via UniFFI so a
//! chat-client host (JavaScript, Swift, Kotlin, ...) can drive it. The host
//! keeps ownership of its DOM: listener changes and edits come back as data
//! for the host to apply.

mod types;

pub use types::*;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chronostamp_core::markup;
use chronostamp_core::plugin::{InjectionError, TextInjector};
use chronostamp_core::{
    Chronostamp, DatetimePlugin, Edit, JsonFileStore, KeyEvent, KeydownHost, OutputTag,
};
use tracing_subscriber::EnvFilter;

uniffi::setup_scaffolding!();

/// Environment variable read by [`init_logging`] when no filter is given.
const LOG_ENV: &str = "CHRONOSTAMP_LOG";

// =============================================================================
// Exported Functions
// =============================================================================

/// Get the library version string.
#[uniffi::export]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Install a `tracing` subscriber writing to stderr.
///
/// `filter` uses `EnvFilter` syntax (e.g. `"chronostamp_core=debug"`). When
/// absent, `CHRONOSTAMP_LOG` is read, falling back to `warn`. Calling this
/// more than once is harmless.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) {
    let filter = filter
        .and_then(|f| EnvFilter::try_new(f).ok())
        .or_else(|| EnvFilter::try_from_env(LOG_ENV).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Get information about all rules, in priority order, as JSON.
///
/// Using JSON here since RuleInfo contains static str references which
/// UniFFI cannot handle.
#[uniffi::export]
pub fn list_rules() -> String {
    let infos = Chronostamp::new().rule_infos();
    serde_json::to_string(&infos).unwrap_or_else(|_| "[]".to_string())
}

/// Recognise a date/time in `input` using the local clock.
///
/// Returns None when nothing usable is found.
#[uniffi::export]
pub fn recognize(input: String) -> Option<FfiMatch> {
    Chronostamp::new().recognize(&input).ok().map(Into::into)
}

/// Render `<t:EPOCH:TAG>` for a tag code such as `"F"`.
///
/// Returns None for an unknown tag code.
#[uniffi::export]
pub fn render_markup(epoch_seconds: i64, tag_code: String) -> Option<String> {
    let mut chars = tag_code.chars();
    let tag = match (chars.next(), chars.next()) {
        (Some(c), None) => OutputTag::from_code(c)?,
        _ => return None,
    };
    Some(markup::render(epoch_seconds, tag))
}

// =============================================================================
// Session
// =============================================================================

/// Listener targets named by the host; changes queue until drained.
#[derive(Debug, Default)]
struct ForeignHost {
    pending: Vec<FfiListenerChange>,
}

impl ForeignHost {
    const DOCUMENT: &'static str = "document";

    fn drain(&mut self) -> Vec<FfiListenerChange> {
        std::mem::take(&mut self.pending)
    }
}

impl KeydownHost for ForeignHost {
    type Target = String;

    fn document(&self) -> String {
        Self::DOCUMENT.to_string()
    }

    fn add_keydown_listener(&mut self, target: &String) {
        self.pending.push(FfiListenerChange::Attach {
            target: target.clone(),
        });
    }

    fn remove_keydown_listener(&mut self, target: &String) {
        self.pending.push(FfiListenerChange::Detach {
            target: target.clone(),
        });
    }
}

/// The host applies the edit itself from the returned [`FfiEdit`].
struct HostApplies;

impl TextInjector for HostApplies {
    fn inject(&mut self, _edit: &Edit) -> Result<(), InjectionError> {
        Ok(())
    }
}

/// A running plugin instance with settings persisted on disk.
#[derive(uniffi::Object)]
pub struct Session {
    plugin: Mutex<DatetimePlugin<JsonFileStore, ForeignHost>>,
}

impl Session {
    fn plugin(&self) -> MutexGuard<'_, DatetimePlugin<JsonFileStore, ForeignHost>> {
        self.plugin.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[uniffi::export]
impl Session {
    /// Open a session storing settings in `data_dir`, or in the default
    /// data directory when absent.
    #[uniffi::constructor]
    pub fn new(data_dir: Option<String>) -> Result<Arc<Self>, FfiError> {
        let store = match data_dir {
            Some(dir) => JsonFileStore::new(dir),
            None => JsonFileStore::from_env()?,
        };
        tracing::debug!(dir = %store.dir().display(), "opening session");
        Ok(Arc::new(Self {
            plugin: Mutex::new(DatetimePlugin::new(store, ForeignHost::default())),
        }))
    }

    /// Start listening on the document.
    pub fn start(&self) -> Vec<FfiListenerChange> {
        let mut plugin = self.plugin();
        plugin.start();
        plugin.host_mut().drain()
    }

    /// Stop listening everywhere.
    pub fn stop(&self) -> Vec<FfiListenerChange> {
        let mut plugin = self.plugin();
        plugin.stop();
        plugin.host_mut().drain()
    }

    pub fn listen_to(&self, target: String) -> Vec<FfiListenerChange> {
        let mut plugin = self.plugin();
        plugin.listen_to(target);
        plugin.host_mut().drain()
    }

    pub fn stop_listening_to(&self, target: String) -> Vec<FfiListenerChange> {
        let mut plugin = self.plugin();
        plugin.stop_listening_to(&target);
        plugin.host_mut().drain()
    }

    /// Current "Bind Characters" value.
    pub fn bind_characters(&self) -> String {
        self.plugin().bind_characters()
    }

    pub fn set_bind_characters(&self, text: String) -> Result<(), FfiError> {
        self.plugin().set_bind_characters(&text)?;
        Ok(())
    }

    /// Handle a key press over `selection`.
    ///
    /// Returns the edit to apply, or None when the key is not a trigger or
    /// the selection is not a recognisable date/time.
    pub fn handle_keydown(
        &self,
        ctrl_key: bool,
        key: String,
        selection: String,
    ) -> Option<FfiEdit> {
        let event = KeyEvent::new(ctrl_key, key);
        let outcome = self.plugin().on_keydown(&event, &selection, &mut HostApplies);
        outcome.edit().cloned().map(Into::into)
    }
}
