//! Token grammar the catalog patterns are composed from.
//!
//! Every quantity token compiles to a named capture group, so converters read
//! fields by name instead of by position. Separators compile to plain,
//! non-capturing pattern text.
//!
//! Variant orderings are generated from [`DateOrder`], [`ClockStyle`] and
//! [`Seconds`] instead of being written out by hand.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Month, Weekday};
use regex::{Captures, Regex};

/// A semantic quantity a pattern captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quantity {
    Weekday,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

/// One element of a variant pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// Full English weekday name (`monday` .. `sunday`).
    Weekday,
    /// Full English month name.
    MonthName,
    /// Numeric month 1-12, optional leading zero.
    Month,
    /// Day of month 1-31, optional leading zero.
    Day,
    /// Four or more digits, first digit non-zero.
    Year,
    /// Hour 0-12.
    Hour12,
    /// Hour 0-23.
    Hour24,
    Minute,
    Second,
    /// `:SS`, may be absent.
    OptionalSecond,
    /// Trailing `am`/`pm`, may be absent.
    Meridiem,
    Space,
    CommaSpace,
    /// Between the date and the time: whitespace, optionally after a comma.
    TimeSep,
    /// `-` or `/`.
    DateSep,
    Colon,
}

impl Token {
    /// Regex source for this token.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Weekday => r"(?P<weekday>(?:mon|tues|wednes|thurs|fri|satur|sun)day)",
            Self::MonthName => concat!(
                r"(?P<month_name>january|february|march|april|may|june",
                r"|july|august|september|october|november|december)"
            ),
            Self::Month => r"(?P<month>1[0-2]|0?[1-9])",
            Self::Day => r"(?P<day>3[01]|[12][0-9]|0?[1-9])",
            Self::Year => r"(?P<year>[1-9][0-9]{3,})",
            Self::Hour12 => r"(?P<hour>1[0-2]|0?[0-9])",
            Self::Hour24 => r"(?P<hour>2[0-3]|[01]?[0-9])",
            Self::Minute => r"(?P<minute>[0-5]?[0-9])",
            Self::Second => r"(?P<second>[0-5]?[0-9])",
            Self::OptionalSecond => r"(?::(?P<second>[0-5]?[0-9]))?",
            Self::Meridiem => r"(?:\s*(?P<meridiem>[ap]m))?",
            Self::Space => r"\s+",
            Self::CommaSpace => r",\s+",
            Self::TimeSep => r",?\s+",
            Self::DateSep => r"[-/]",
            Self::Colon => ":",
        }
    }

    /// The quantity this token always captures, if any.
    ///
    /// Optional tokens report `None`: they refine a match but do not make a
    /// variant more specific.
    pub fn quantity(self) -> Option<Quantity> {
        match self {
            Self::Weekday => Some(Quantity::Weekday),
            Self::MonthName | Self::Month => Some(Quantity::Month),
            Self::Day => Some(Quantity::Day),
            Self::Year => Some(Quantity::Year),
            Self::Hour12 | Self::Hour24 => Some(Quantity::Hour),
            Self::Minute => Some(Quantity::Minute),
            Self::Second => Some(Quantity::Second),
            Self::OptionalSecond
            | Self::Meridiem
            | Self::Space
            | Self::CommaSpace
            | Self::TimeSep
            | Self::DateSep
            | Self::Colon => None,
        }
    }
}

/// Required quantities captured by a token sequence.
pub fn quantities(tokens: &[Token]) -> BTreeSet<Quantity> {
    tokens.iter().filter_map(|t| t.quantity()).collect()
}

/// Compile a token sequence into a case-insensitive, word-bounded regex.
pub fn compose(tokens: &[Token]) -> Result<Regex, regex::Error> {
    let body: String = tokens.iter().map(|t| t.pattern()).collect();
    Regex::new(&format!(r"(?i)\b{}\b", body))
}

/// Which of month and day is written first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    MonthFirst,
    DayFirst,
}

impl fmt::Display for DateOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MonthFirst => write!(f, "month-first"),
            Self::DayFirst => write!(f, "day-first"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockStyle {
    TwelveHour,
    TwentyFourHour,
}

impl fmt::Display for ClockStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TwelveHour => write!(f, "12h"),
            Self::TwentyFourHour => write!(f, "24h"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seconds {
    Omitted,
    Optional,
    Required,
}

/// `March 3, 2025` or `3 March 2025`.
pub fn written_date(order: DateOrder) -> Vec<Token> {
    match order {
        DateOrder::MonthFirst => vec![
            Token::MonthName,
            Token::Space,
            Token::Day,
            Token::CommaSpace,
            Token::Year,
        ],
        DateOrder::DayFirst => vec![
            Token::Day,
            Token::Space,
            Token::MonthName,
            Token::Space,
            Token::Year,
        ],
    }
}

/// `3/4/2025` read as month/day/year or day/month/year.
pub fn numeric_date(order: DateOrder) -> Vec<Token> {
    match order {
        DateOrder::MonthFirst => vec![
            Token::Month,
            Token::DateSep,
            Token::Day,
            Token::DateSep,
            Token::Year,
        ],
        DateOrder::DayFirst => vec![
            Token::Day,
            Token::DateSep,
            Token::Month,
            Token::DateSep,
            Token::Year,
        ],
    }
}

/// `5:30`, `5:30:15 pm`, `17:30`, ...
pub fn clock(style: ClockStyle, seconds: Seconds) -> Vec<Token> {
    let hour = match style {
        ClockStyle::TwelveHour => Token::Hour12,
        ClockStyle::TwentyFourHour => Token::Hour24,
    };
    let mut tokens = vec![hour, Token::Colon, Token::Minute];
    match seconds {
        Seconds::Omitted => {}
        Seconds::Optional => tokens.push(Token::OptionalSecond),
        Seconds::Required => tokens.extend([Token::Colon, Token::Second]),
    }
    if style == ClockStyle::TwelveHour {
        tokens.push(Token::Meridiem);
    }
    tokens
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

/// Raw fields read out of a successful match.
///
/// Values are range-checked by the patterns; calendar validity (e.g. day 31
/// in a 30-day month) is left to the converters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    pub weekday: Option<Weekday>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
    pub meridiem: Option<Meridiem>,
}

impl Fields {
    /// Read fields from named captures. `None` when a captured value cannot
    /// be represented (year overflow, unknown name).
    pub fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        let month = match (caps.name("month"), caps.name("month_name")) {
            (Some(m), _) => Some(m.as_str().parse().ok()?),
            (None, Some(name)) => Some(Month::from_str(name.as_str()).ok()?.number_from_month()),
            (None, None) => None,
        };
        let weekday = match caps.name("weekday") {
            Some(w) => Some(Weekday::from_str(w.as_str()).ok()?),
            None => None,
        };
        let meridiem = caps
            .name("meridiem")
            .map(|m| match m.as_str().to_ascii_lowercase().as_str() {
                "pm" => Meridiem::Pm,
                _ => Meridiem::Am,
            });

        Some(Self {
            weekday,
            year: number(caps, "year")?,
            month,
            day: number(caps, "day")?,
            hour: number(caps, "hour")?,
            minute: number(caps, "minute")?,
            second: number(caps, "second")?,
            meridiem,
        })
    }

    /// Hour on the 24-hour clock, applying the am/pm marker if present.
    ///
    /// `12 am` is midnight and `12 pm` is noon. Hour 0 with a marker has no
    /// meaning and yields `None`.
    pub fn hour_of_day(&self) -> Option<u32> {
        let hour = self.hour?;
        match self.meridiem {
            None => Some(hour),
            Some(_) if hour == 0 || hour > 12 => None,
            Some(Meridiem::Am) => Some(hour % 12),
            Some(Meridiem::Pm) => Some(hour % 12 + 12),
        }
    }
}

/// Parse an optional numeric capture. Outer `None` means the capture was
/// present but did not fit `T`.
fn number<T: FromStr>(caps: &Captures<'_>, name: &str) -> Option<Option<T>> {
    match caps.name(name) {
        Some(m) => m.as_str().parse().ok().map(Some),
        None => Some(None),
    }
}
