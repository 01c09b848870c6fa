//! Timestamp markup rendering.

use std::fmt;
use std::ops::Range;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matcher::MatchResult;

/// Display style requested from the chat client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputTag {
    /// `F`: weekday, date and time.
    #[serde(rename = "F")]
    LongDateTime,
    /// `f`: date and time.
    #[serde(rename = "f")]
    ShortDateTime,
    /// `D`: written date.
    #[serde(rename = "D")]
    LongDate,
    /// `d`: numeric date.
    #[serde(rename = "d")]
    ShortDate,
    /// `T`: time with seconds.
    #[serde(rename = "T")]
    LongTime,
    /// `t`: time without seconds.
    #[serde(rename = "t")]
    ShortTime,
}

impl OutputTag {
    pub const ALL: [OutputTag; 6] = [
        Self::LongDateTime,
        Self::ShortDateTime,
        Self::LongDate,
        Self::ShortDate,
        Self::LongTime,
        Self::ShortTime,
    ];

    #[must_use]
    pub fn code(self) -> char {
        match self {
            Self::LongDateTime => 'F',
            Self::ShortDateTime => 'f',
            Self::LongDate => 'D',
            Self::ShortDate => 'd',
            Self::LongTime => 'T',
            Self::ShortTime => 't',
        }
    }

    /// Exact (case-sensitive) inverse of [`OutputTag::code`].
    #[must_use]
    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::LongDateTime => "Long date/time",
            Self::ShortDateTime => "Short date/time",
            Self::LongDate => "Long date",
            Self::ShortDate => "Short date",
            Self::LongTime => "Long time",
            Self::ShortTime => "Short time",
        }
    }
}

impl fmt::Display for OutputTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Render `<t:EPOCH:TAG>` for whole epoch seconds.
#[must_use]
pub fn render(epoch_seconds: i64, tag: OutputTag) -> String {
    format!("<t:{}:{}>", epoch_seconds, tag.code())
}

/// Render markup for an instant, flooring to whole seconds.
#[must_use]
pub fn render_instant(instant: &DateTime<Utc>, tag: OutputTag) -> String {
    render(instant.timestamp(), tag)
}

/// A replacement to apply to the user's selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    /// The full selection as read from the host.
    pub selection: String,
    /// The part of the selection that was recognised.
    pub matched: String,
    /// Byte range of `matched` in `selection`.
    pub span: Range<usize>,
    /// Markup that replaces `matched`.
    pub markup: String,
}

impl Edit {
    /// Edit at an explicit byte range of `selection`.
    pub fn new(
        selection: impl Into<String>,
        span: Range<usize>,
        markup: impl Into<String>,
    ) -> Self {
        let selection = selection.into();
        let matched = selection.get(span.clone()).unwrap_or_default().to_string();
        Self {
            selection,
            matched,
            span,
            markup: markup.into(),
        }
    }

    /// Edit replacing the recognised part of `selection`.
    pub fn from_match(selection: impl Into<String>, result: &MatchResult) -> Self {
        Self::new(selection, result.span.clone(), result.markup())
    }

    /// The selection with `span` replaced by the markup.
    ///
    /// Text around the match, including surrounding whitespace, is kept. A
    /// span that does not fall on the selection's character boundaries
    /// leaves the selection unchanged.
    #[must_use]
    pub fn spliced(&self) -> String {
        let mut spliced = self.selection.clone();
        if self.matched.is_empty() || self.selection.get(self.span.clone()).is_none() {
            return spliced;
        }
        spliced.replace_range(self.span.clone(), &self.markup);
        spliced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_render() {
        assert_eq!(render(1741021200, OutputTag::LongDateTime), "<t:1741021200:F>");
        assert_eq!(render(0, OutputTag::ShortTime), "<t:0:t>");
    }

    #[test]
    fn test_render_instant_floors() {
        let instant = Utc.timestamp_opt(1741021200, 999_000_000).unwrap();
        assert_eq!(render_instant(&instant, OutputTag::LongTime), "<t:1741021200:T>");

        let before_epoch = Utc.timestamp_opt(-2, 500_000_000).unwrap();
        assert_eq!(render_instant(&before_epoch, OutputTag::ShortDate), "<t:-2:d>");
    }

    #[test]
    fn test_render_is_deterministic() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 3, 17, 0, 0).unwrap();
        let first = render_instant(&instant, OutputTag::ShortDateTime);
        let second = render_instant(&instant, OutputTag::ShortDateTime);
        assert_eq!(first, second);
    }

    #[test]
    fn test_tag_codes_round_trip() {
        for tag in OutputTag::ALL {
            assert_eq!(OutputTag::from_code(tag.code()), Some(tag));
        }
        assert_eq!(OutputTag::from_code('R'), None);
        assert_eq!(OutputTag::ShortDate.to_string(), "d");
    }

    #[test]
    fn test_tag_serializes_as_code() {
        let json = serde_json::to_string(&OutputTag::LongDate).unwrap();
        assert_eq!(json, "\"D\"");
    }

    #[test]
    fn test_spliced_keeps_surrounding_text() {
        let edit = Edit::new("  meet at 5:30 PM sharp ", 10..17, "<t:1:t>");
        assert_eq!(edit.matched, "5:30 PM");
        assert_eq!(edit.spliced(), "  meet at <t:1:t> sharp ");
    }

    #[test]
    fn test_spliced_replaces_only_the_span() {
        let edit = Edit::new("5:30 or 5:30", 8..12, "<t:1:t>");
        assert_eq!(edit.spliced(), "5:30 or <t:1:t>");
    }

    #[test]
    fn test_spliced_ignores_unusable_span() {
        let edit = Edit::new("5:30", 2..9, "<t:1:t>");
        assert_eq!(edit.matched, "");
        assert_eq!(edit.spliced(), "5:30");

        let edit = Edit::new("día 5:30", 1..2, "<t:1:t>");
        assert_eq!(edit.spliced(), "día 5:30");
    }

    #[test]
    fn test_from_match_targets_the_recognised_occurrence() {
        let now = Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap();
        let selection = "room B12:00, meet at 12:00";
        let result = crate::Chronostamp::new().recognize_at(selection, &now).unwrap();
        let edit = Edit::from_match(selection, &result);
        assert_eq!(edit.spliced(), "room B12:00, meet at <t:1791979200:t>");
    }
}
