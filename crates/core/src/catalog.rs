//! The ordered catalog of recognisable date/time shapes.
//!
//! Rules are ordered from most to least specific. Recognition stops at the
//! first rule, and the first variant within it, that matches, so a full
//! weekday/date/time string is never read as a bare time.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::Serialize;

use crate::grammar::{
    self, clock, numeric_date, written_date, ClockStyle, DateOrder, Fields, Quantity, Seconds,
    Token,
};
use crate::markup::OutputTag;

/// Builds a naive local date-time from captured fields and today's date.
///
/// Returns `None` when the fields do not describe a real point in time.
pub type Converter = fn(&Fields, NaiveDate) -> Option<NaiveDateTime>;

/// Errors found while assembling a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("pattern for {tag} ({variant}) does not compile: {source}")]
    Pattern {
        tag: OutputTag,
        variant: String,
        #[source]
        source: regex::Error,
    },

    #[error("rule {0} has no variants")]
    Empty(OutputTag),

    #[error("variant {variant} of rule {tag} captures different quantities than its siblings")]
    MixedQuantities { tag: OutputTag, variant: String },

    #[error("rule {later} is more specific than {earlier} but is listed after it")]
    OutOfOrder { earlier: OutputTag, later: OutputTag },
}

/// One textual spelling of a rule.
#[derive(Debug, Clone)]
pub struct Variant {
    label: String,
    tokens: Vec<Token>,
    regex: Regex,
}

impl Variant {
    fn compile(tag: OutputTag, label: String, tokens: Vec<Token>) -> Result<Self, CatalogError> {
        let regex = grammar::compose(&tokens).map_err(|source| CatalogError::Pattern {
            tag,
            variant: label.clone(),
            source,
        })?;
        Ok(Self {
            label,
            tokens,
            regex,
        })
    }

    /// Short description such as `month-first 24h`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// A recognisable date/time shape and its alternative spellings.
#[derive(Debug, Clone)]
pub struct FormatRule {
    tag: OutputTag,
    variants: Vec<Variant>,
    converter: Converter,
    examples: &'static [&'static str],
}

impl FormatRule {
    /// Compile a rule. All variants must capture the same quantities.
    pub fn new(
        tag: OutputTag,
        converter: Converter,
        variants: Vec<(String, Vec<Token>)>,
    ) -> Result<Self, CatalogError> {
        let variants = variants
            .into_iter()
            .map(|(label, tokens)| Variant::compile(tag, label, tokens))
            .collect::<Result<Vec<_>, _>>()?;

        let first = variants.first().ok_or(CatalogError::Empty(tag))?;
        let expected = grammar::quantities(first.tokens());
        if let Some(odd) = variants
            .iter()
            .find(|v| grammar::quantities(v.tokens()) != expected)
        {
            return Err(CatalogError::MixedQuantities {
                tag,
                variant: odd.label.clone(),
            });
        }

        Ok(Self {
            tag,
            variants,
            converter,
            examples: &[],
        })
    }

    #[must_use]
    pub fn with_examples(mut self, examples: &'static [&'static str]) -> Self {
        self.examples = examples;
        self
    }

    pub fn tag(&self) -> OutputTag {
        self.tag
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn converter(&self) -> Converter {
        self.converter
    }

    pub fn examples(&self) -> &'static [&'static str] {
        self.examples
    }

    /// Quantities every variant of this rule captures.
    pub fn quantities(&self) -> BTreeSet<Quantity> {
        self.variants
            .first()
            .map(|v| grammar::quantities(v.tokens()))
            .unwrap_or_default()
    }

    /// Number of required quantities; higher is more specific.
    pub fn specificity(&self) -> usize {
        self.quantities().len()
    }

    pub fn info(&self) -> RuleInfo {
        RuleInfo {
            tag: self.tag,
            name: self.tag.name(),
            variants: self.variants.iter().map(|v| v.label.clone()).collect(),
            examples: self.examples,
        }
    }
}

/// Serializable summary of a rule for help output and bindings.
#[derive(Debug, Clone, Serialize)]
pub struct RuleInfo {
    pub tag: OutputTag,
    pub name: &'static str,
    pub variants: Vec<String>,
    pub examples: &'static [&'static str],
}

/// Ordered, immutable rule list.
#[derive(Debug, Clone)]
pub struct Catalog {
    rules: Vec<FormatRule>,
}

impl Catalog {
    /// Assemble a catalog, checking that specificity never increases.
    pub fn from_rules(rules: Vec<FormatRule>) -> Result<Self, CatalogError> {
        for pair in rules.windows(2) {
            if pair[1].specificity() > pair[0].specificity() {
                return Err(CatalogError::OutOfOrder {
                    earlier: pair[0].tag,
                    later: pair[1].tag,
                });
            }
        }
        Ok(Self { rules })
    }

    /// The built-in catalog, compiled on first use.
    pub fn builtin() -> &'static Catalog {
        static CATALOG: OnceLock<Catalog> = OnceLock::new();
        CATALOG.get_or_init(|| {
            builtin_rules()
                .and_then(Catalog::from_rules)
                .expect("built-in catalog is well formed")
        })
    }

    pub fn rules(&self) -> &[FormatRule] {
        &self.rules
    }

    pub fn infos(&self) -> Vec<RuleInfo> {
        self.rules.iter().map(FormatRule::info).collect()
    }
}

const ORDERS: [DateOrder; 2] = [DateOrder::MonthFirst, DateOrder::DayFirst];
const CLOCKS: [ClockStyle; 2] = [ClockStyle::TwelveHour, ClockStyle::TwentyFourHour];

/// Written date followed by a time, optionally led by a weekday.
///
/// Variant order: month-first 12h, month-first 24h, day-first 12h, day-first 24h.
fn date_time_variants(weekday: bool) -> Vec<(String, Vec<Token>)> {
    let mut variants = Vec::new();
    for order in ORDERS {
        for style in CLOCKS {
            let mut tokens = Vec::new();
            if weekday {
                tokens.extend([Token::Weekday, Token::CommaSpace]);
            }
            tokens.extend(written_date(order));
            tokens.push(Token::TimeSep);
            tokens.extend(clock(style, Seconds::Optional));
            variants.push((format!("{} {}", order, style), tokens));
        }
    }
    variants
}

fn date_variants(spell: fn(DateOrder) -> Vec<Token>) -> Vec<(String, Vec<Token>)> {
    ORDERS
        .into_iter()
        .map(|order| (order.to_string(), spell(order)))
        .collect()
}

fn time_variants(seconds: Seconds) -> Vec<(String, Vec<Token>)> {
    CLOCKS
        .into_iter()
        .map(|style| (style.to_string(), clock(style, seconds)))
        .collect()
}

fn builtin_rules() -> Result<Vec<FormatRule>, CatalogError> {
    Ok(vec![
        FormatRule::new(OutputTag::LongDateTime, calendar, date_time_variants(true))?
            .with_examples(&["Monday, March 3, 2025 5:00 PM", "Monday, 3 March 2025 17:00"]),
        FormatRule::new(OutputTag::ShortDateTime, calendar, date_time_variants(false))?
            .with_examples(&["March 3, 2025 5:00 PM", "3 March 2025 17:00:30"]),
        FormatRule::new(OutputTag::LongDate, calendar, date_variants(written_date))?
            .with_examples(&["March 3, 2025", "3 March 2025"]),
        FormatRule::new(OutputTag::ShortDate, calendar, date_variants(numeric_date))?
            .with_examples(&["3/4/2025", "25-12-2025"]),
        FormatRule::new(OutputTag::LongTime, time_of_day, time_variants(Seconds::Required))?
            .with_examples(&["5:30:15 PM", "17:30:15"]),
        FormatRule::new(OutputTag::ShortTime, time_of_day, time_variants(Seconds::Omitted))?
            .with_examples(&["5:30 PM", "17:30"]),
    ])
}

fn clock_time(fields: &Fields) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(
        fields.hour_of_day()?,
        fields.minute.unwrap_or(0),
        fields.second.unwrap_or(0),
    )
}

/// Date from the match; time from the match or local midnight.
fn calendar(fields: &Fields, _today: NaiveDate) -> Option<NaiveDateTime> {
    let date = NaiveDate::from_ymd_opt(fields.year?, fields.month?, fields.day?)?;
    let time = match fields.hour {
        Some(_) => clock_time(fields)?,
        None => NaiveTime::MIN,
    };
    Some(date.and_time(time))
}

/// Time from the match on today's date.
fn time_of_day(fields: &Fields, today: NaiveDate) -> Option<NaiveDateTime> {
    Some(today.and_time(clock_time(fields)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_order() {
        let tags: Vec<char> = Catalog::builtin()
            .rules()
            .iter()
            .map(|r| r.tag().code())
            .collect();
        assert_eq!(tags, vec!['F', 'f', 'D', 'd', 'T', 't']);
    }

    #[test]
    fn test_builtin_variant_labels() {
        let rules = Catalog::builtin().rules();
        let labels: Vec<&str> = rules[0].variants().iter().map(Variant::label).collect();
        assert_eq!(
            labels,
            vec!["month-first 12h", "month-first 24h", "day-first 12h", "day-first 24h"]
        );
        let numeric: Vec<&str> = rules[3].variants().iter().map(Variant::label).collect();
        assert_eq!(numeric, vec!["month-first", "day-first"]);
    }

    #[test]
    fn test_specificity_never_increases() {
        let specificity: Vec<usize> = Catalog::builtin()
            .rules()
            .iter()
            .map(FormatRule::specificity)
            .collect();
        assert_eq!(specificity, vec![6, 5, 3, 3, 3, 2]);
    }

    #[test]
    fn test_out_of_order_catalog_rejected() {
        let bare = FormatRule::new(
            OutputTag::ShortTime,
            time_of_day,
            time_variants(Seconds::Omitted),
        )
        .unwrap();
        let full = FormatRule::new(OutputTag::LongDateTime, calendar, date_time_variants(true))
            .unwrap();
        let err = Catalog::from_rules(vec![bare, full]).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::OutOfOrder {
                earlier: OutputTag::ShortTime,
                later: OutputTag::LongDateTime
            }
        ));
    }

    #[test]
    fn test_mixed_quantities_rejected() {
        let err = FormatRule::new(
            OutputTag::LongDate,
            calendar,
            vec![
                ("date".to_string(), written_date(DateOrder::MonthFirst)),
                (
                    "time".to_string(),
                    clock(ClockStyle::TwelveHour, Seconds::Omitted),
                ),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::MixedQuantities { variant, .. } if variant == "time"));
    }

    #[test]
    fn test_empty_rule_rejected() {
        let err = FormatRule::new(OutputTag::LongDate, calendar, vec![]).unwrap_err();
        assert!(matches!(err, CatalogError::Empty(OutputTag::LongDate)));
    }

    #[test]
    fn test_calendar_rejects_impossible_dates() {
        let fields = Fields {
            year: Some(2025),
            month: Some(2),
            day: Some(30),
            ..Fields::default()
        };
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(calendar(&fields, today), None);
    }

    #[test]
    fn test_time_of_day_uses_today() {
        let fields = Fields {
            hour: Some(9),
            minute: Some(5),
            ..Fields::default()
        };
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let expected = today.and_hms_opt(9, 5, 0).unwrap();
        assert_eq!(time_of_day(&fields, today), Some(expected));
    }

    #[test]
    fn test_infos_serialize() {
        let json = serde_json::to_value(Catalog::builtin().infos()).unwrap();
        assert_eq!(json[0]["tag"], "F");
        assert_eq!(json[5]["name"], "Short time");
        assert_eq!(json[3]["examples"][0], "3/4/2025");
    }
}
