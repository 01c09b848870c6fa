//! Walks the catalog and converts the first match to an instant.

use std::ops::Range;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::debug;

use crate::catalog::{Catalog, FormatRule, Variant};
use crate::grammar::Fields;
use crate::markup::{self, OutputTag};

/// A recognised date/time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// The substring of the trimmed input the rule matched.
    pub matched_text: String,
    /// Byte range of `matched_text` in the untrimmed input.
    pub span: Range<usize>,
    pub resolved_time: DateTime<Utc>,
    pub output_tag: OutputTag,
    /// Label of the variant that matched, e.g. `day-first 24h`.
    pub variant: String,
}

impl MatchResult {
    /// `<t:EPOCH:TAG>` for this result.
    #[must_use]
    pub fn markup(&self) -> String {
        markup::render_instant(&self.resolved_time, self.output_tag)
    }

    #[must_use]
    pub fn epoch_seconds(&self) -> i64 {
        self.resolved_time.timestamp()
    }
}

/// Why recognition produced nothing. Callers treat every variant as
/// "leave the text alone".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecognizeError {
    #[error("no date or time recognised")]
    NoMatch,

    /// A rule matched but its fields are not a real point in time. Lower
    /// priority rules are not consulted.
    #[error("'{matched}' looks like a {tag} timestamp but is not a valid date/time")]
    InvalidConversion { matched: String, tag: OutputTag },
}

impl RecognizeError {
    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch)
    }
}

/// Matcher over a catalog.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'c> {
    catalog: &'c Catalog,
}

impl<'c> Matcher<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    /// Recognise `input` relative to `now`.
    ///
    /// Local wall-clock values are interpreted in `now`'s time zone and
    /// time-only shapes land on `now`'s local date. A local time that occurs
    /// twice resolves to the earlier instant; one that never occurs is an
    /// invalid conversion.
    pub fn recognize<Tz: TimeZone>(
        &self,
        input: &str,
        now: &DateTime<Tz>,
    ) -> Result<MatchResult, RecognizeError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(RecognizeError::NoMatch);
        }
        let lead = input.len() - input.trim_start().len();

        let Some((rule, variant, caps)) = self.find(trimmed) else {
            debug!(input = trimmed, "no catalog rule matched");
            return Err(RecognizeError::NoMatch);
        };

        let (matched, span) = match caps.get(0) {
            Some(m) => (m.as_str(), lead + m.start()..lead + m.end()),
            None => ("", lead..lead),
        };
        let tag = rule.tag();
        let invalid = || RecognizeError::InvalidConversion {
            matched: matched.to_string(),
            tag,
        };

        let fields = Fields::from_captures(&caps).ok_or_else(invalid)?;
        let naive = (rule.converter())(&fields, now.date_naive()).ok_or_else(invalid)?;
        let local = now
            .timezone()
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(invalid)?;
        let resolved_time = local.with_timezone(&Utc);

        debug!(
            matched,
            tag = %tag,
            variant = variant.label(),
            resolved = %resolved_time,
            "recognised timestamp"
        );

        Ok(MatchResult {
            matched_text: matched.to_string(),
            span,
            resolved_time,
            output_tag: tag,
            variant: variant.label().to_string(),
        })
    }

    /// First rule, first variant, that matches anywhere in `input`.
    fn find<'i>(
        &self,
        input: &'i str,
    ) -> Option<(&'c FormatRule, &'c Variant, regex::Captures<'i>)> {
        self.catalog.rules().iter().find_map(|rule| {
            rule.variants().iter().find_map(|variant| {
                variant
                    .regex()
                    .captures(input)
                    .map(|caps| (rule, variant, caps))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};
    use chrono_tz::America::New_York;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, 9, 15, 0).unwrap()
    }

    fn recognize(input: &str) -> Result<MatchResult, RecognizeError> {
        Matcher::new(Catalog::builtin()).recognize(input, &now())
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_long_date_time_both_orders_agree() {
        let a = recognize("Monday, March 3, 2025 5:00 PM").unwrap();
        let b = recognize("Monday, 3 March 2025 17:00").unwrap();
        assert_eq!(a.output_tag, OutputTag::LongDateTime);
        assert_eq!(b.output_tag, OutputTag::LongDateTime);
        assert_eq!(a.resolved_time, b.resolved_time);
        assert_eq!(a.resolved_time, utc(2025, 3, 3, 17, 0, 0));
        assert_eq!(a.variant, "month-first 12h");
        assert_eq!(b.variant, "day-first 24h");
    }

    #[test]
    fn test_long_date_time_with_seconds() {
        let r = recognize("Monday, March 3, 2025 5:00:30 PM").unwrap();
        assert_eq!(r.output_tag, OutputTag::LongDateTime);
        assert_eq!(r.resolved_time, utc(2025, 3, 3, 17, 0, 30));
        assert_eq!(r.matched_text, "Monday, March 3, 2025 5:00:30 PM");
    }

    #[test]
    fn test_short_date_time() {
        let r = recognize("March 3, 2025 17:45").unwrap();
        assert_eq!(r.output_tag, OutputTag::ShortDateTime);
        assert_eq!(r.resolved_time, utc(2025, 3, 3, 17, 45, 0));

        let r = recognize("3 march 2025, 9:05 am").unwrap();
        assert_eq!(r.output_tag, OutputTag::ShortDateTime);
        assert_eq!(r.resolved_time, utc(2025, 3, 3, 9, 5, 0));
    }

    #[test]
    fn test_date_is_not_a_bare_time() {
        let r = recognize("March 3, 2025").unwrap();
        assert_eq!(r.output_tag, OutputTag::LongDate);
        assert_eq!(r.resolved_time, utc(2025, 3, 3, 0, 0, 0));
    }

    #[test]
    fn test_bare_time_uses_today() {
        let r = recognize("5:30 PM").unwrap();
        assert_eq!(r.output_tag, OutputTag::ShortTime);
        assert_eq!(r.resolved_time, utc(2026, 10, 14, 17, 30, 0));
    }

    #[test]
    fn test_time_with_seconds() {
        let r = recognize("17:30:15").unwrap();
        assert_eq!(r.output_tag, OutputTag::LongTime);
        assert_eq!(r.resolved_time, utc(2026, 10, 14, 17, 30, 15));
        assert_eq!(r.variant, "24h");
    }

    #[test]
    fn test_24h_time_is_not_read_as_12h() {
        let r = recognize("17:30").unwrap();
        assert_eq!(r.matched_text, "17:30");
        assert_eq!(r.resolved_time, utc(2026, 10, 14, 17, 30, 0));
    }

    #[test]
    fn test_numeric_date_month_first() {
        let a = recognize("3/4/2025").unwrap();
        let b = recognize("4/3/2025").unwrap();
        assert_eq!(a.output_tag, OutputTag::ShortDate);
        assert_eq!(b.output_tag, OutputTag::ShortDate);
        assert_eq!(a.resolved_time, utc(2025, 3, 4, 0, 0, 0));
        assert_eq!(b.resolved_time, utc(2025, 4, 3, 0, 0, 0));
        assert_eq!(a.variant, "month-first");
    }

    #[test]
    fn test_numeric_date_day_first_fallback() {
        let r = recognize("25-12-2025").unwrap();
        assert_eq!(r.output_tag, OutputTag::ShortDate);
        assert_eq!(r.variant, "day-first");
        assert_eq!(r.resolved_time, utc(2025, 12, 25, 0, 0, 0));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(recognize("hello world"), Err(RecognizeError::NoMatch));
        assert_eq!(recognize(""), Err(RecognizeError::NoMatch));
        assert_eq!(recognize("   \n\t"), Err(RecognizeError::NoMatch));
        assert!(recognize("2025").unwrap_err().is_no_match());
    }

    #[test]
    fn test_invalid_conversion_is_terminal() {
        let err = recognize("February 30, 2025").unwrap_err();
        assert_eq!(
            err,
            RecognizeError::InvalidConversion {
                matched: "February 30, 2025".to_string(),
                tag: OutputTag::LongDate,
            }
        );
        assert!(!err.is_no_match());
    }

    #[test]
    fn test_meridiem_on_hour_zero_is_invalid() {
        let err = recognize("0:30 pm").unwrap_err();
        assert!(matches!(
            err,
            RecognizeError::InvalidConversion {
                tag: OutputTag::ShortTime,
                ..
            }
        ));
    }

    #[test]
    fn test_match_inside_longer_selection() {
        let input = "  see you at 5:30 pm tomorrow ";
        let r = recognize(input).unwrap();
        assert_eq!(r.matched_text, "5:30 pm");
        assert_eq!(r.output_tag, OutputTag::ShortTime);
        assert_eq!(&input[r.span.clone()], "5:30 pm");
    }

    #[test]
    fn test_span_skips_text_glued_to_a_word() {
        let input = "room B12:00, meet at 12:00";
        let r = recognize(input).unwrap();
        assert_eq!(r.matched_text, "12:00");
        assert_eq!(r.span, 21..26);
    }

    #[test]
    fn test_dst_gap_is_invalid() {
        let now = New_York.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let err = Matcher::new(Catalog::builtin())
            .recognize("March 9, 2025 2:30 AM", &now)
            .unwrap_err();
        assert_eq!(
            err,
            RecognizeError::InvalidConversion {
                matched: "March 9, 2025 2:30 AM".to_string(),
                tag: OutputTag::ShortDateTime,
            }
        );
    }

    #[test]
    fn test_dst_fold_resolves_to_earlier_instant() {
        let now = New_York.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap();
        let r = Matcher::new(Catalog::builtin())
            .recognize("November 2, 2025 1:30 AM", &now)
            .unwrap();
        // 01:30 EDT (UTC-4); the repeat at 01:30 EST would be 06:30 UTC.
        assert_eq!(r.resolved_time, utc(2025, 11, 2, 5, 30, 0));
        assert_eq!(r.epoch_seconds(), 1762061400);
    }

    #[test]
    fn test_local_time_zone() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = offset.with_ymd_and_hms(2026, 10, 14, 0, 30, 0).unwrap();
        let r = Matcher::new(Catalog::builtin())
            .recognize("23:00", &now)
            .unwrap();
        // Local date is the 14th even though UTC is still the 13th.
        assert_eq!(r.resolved_time, utc(2026, 10, 14, 21, 0, 0));

        let r = Matcher::new(Catalog::builtin())
            .recognize("March 3, 2025", &now)
            .unwrap();
        let expected = NaiveDate::from_ymd_opt(2025, 3, 2)
            .unwrap()
            .and_hms_opt(22, 0, 0)
            .unwrap()
            .and_utc();
        assert_eq!(r.resolved_time, expected);
    }

    #[test]
    fn test_markup() {
        let r = recognize("Monday, March 3, 2025 5:00 PM").unwrap();
        assert_eq!(r.epoch_seconds(), 1741021200);
        assert_eq!(r.markup(), "<t:1741021200:F>");
    }
}
