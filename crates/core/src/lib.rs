//! Chronostamp Core
//!
//! Recognise human date/time text (`Monday, March 3, 2025 5:00 PM`,
//! `3/4/2025`, `17:30`, ...) and turn it into chat timestamp markup
//! (`<t:1741021200:F>`).
//!
//! # Quick Start
//!
//! ```
//! use chronostamp_core::{Chronostamp, OutputTag};
//! use chrono::{TimeZone, Utc};
//!
//! let stamp = Chronostamp::new();
//! let now = Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap();
//!
//! let result = stamp.recognize_at("Monday, March 3, 2025 5:00 PM", &now).unwrap();
//! assert_eq!(result.output_tag, OutputTag::LongDateTime);
//! assert_eq!(result.markup(), "<t:1741021200:F>");
//! ```
//!
//! # Rule Order
//!
//! Shapes are tried from most to least specific and the first hit wins:
//!
//! | Tag | Shape |
//! |-----|-------|
//! | `F` | `Weekday, Month Day, Year Time` / `Weekday, Day Month Year Time` |
//! | `f` | `Month Day, Year Time` / `Day Month Year Time` |
//! | `D` | `Month Day, Year` / `Day Month Year` |
//! | `d` | `M/D/YYYY` (tried first) / `D/M/YYYY` |
//! | `T` | `H:MM:SS [am/pm]` / `HH:MM:SS` |
//! | `t` | `H:MM [am/pm]` / `HH:MM` |
//!
//! ```
//! use chronostamp_core::{Chronostamp, RecognizeError};
//!
//! let stamp = Chronostamp::new();
//! assert_eq!(stamp.recognize("hello world"), Err(RecognizeError::NoMatch));
//! ```

pub mod catalog;
pub mod grammar;
pub mod markup;
pub mod matcher;
pub mod plugin;
pub mod settings;
pub mod store;

pub use catalog::{Catalog, CatalogError, FormatRule, RuleInfo};
pub use markup::{Edit, OutputTag};
pub use matcher::{MatchResult, Matcher, RecognizeError};
pub use plugin::{
    DatetimePlugin, InjectionError, KeyEvent, KeyOutcome, KeydownHost, SelectionSource,
    TextInjector,
};
pub use settings::Settings;
pub use store::{JsonFileStore, MemoryStore, SettingsStore, StoreError};

use chrono::{DateTime, Local, TimeZone};

/// Main entry point: the built-in catalog plus the system clock.
#[derive(Debug, Clone, Copy)]
pub struct Chronostamp {
    catalog: &'static Catalog,
}

impl Default for Chronostamp {
    fn default() -> Self {
        Self::new()
    }
}

impl Chronostamp {
    /// Create a recogniser over the built-in catalog.
    ///
    /// # Examples
    ///
    /// ```
    /// use chronostamp_core::Chronostamp;
    ///
    /// let stamp = Chronostamp::new();
    /// let result = stamp.recognize("March 3, 2025").unwrap();
    /// assert_eq!(result.output_tag.code(), 'D');
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            catalog: Catalog::builtin(),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    #[must_use]
    pub fn matcher(&self) -> Matcher<'static> {
        Matcher::new(self.catalog)
    }

    /// Recognise `input` against the local clock and time zone.
    pub fn recognize(&self, input: &str) -> Result<MatchResult, RecognizeError> {
        self.recognize_at(input, &Local::now())
    }

    /// Recognise `input` relative to an explicit `now`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chronostamp_core::Chronostamp;
    /// use chrono::{FixedOffset, TimeZone};
    ///
    /// let tz = FixedOffset::west_opt(5 * 3600).unwrap();
    /// let now = tz.with_ymd_and_hms(2026, 10, 14, 8, 0, 0).unwrap();
    ///
    /// let result = Chronostamp::new().recognize_at("5:30 PM", &now).unwrap();
    /// assert_eq!(result.markup(), "<t:1792017000:t>");
    /// ```
    pub fn recognize_at<Tz: TimeZone>(
        &self,
        input: &str,
        now: &DateTime<Tz>,
    ) -> Result<MatchResult, RecognizeError> {
        self.matcher().recognize(input, now)
    }

    /// Recognise and render in one step; `None` when nothing was recognised.
    #[must_use]
    pub fn markup(&self, input: &str) -> Option<String> {
        self.recognize(input).ok().map(|r| r.markup())
    }

    /// Summaries of every rule, in priority order.
    #[must_use]
    pub fn rule_infos(&self) -> Vec<RuleInfo> {
        self.catalog.infos()
    }
}
