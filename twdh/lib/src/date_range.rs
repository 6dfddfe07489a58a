//! Date-range recalculation for automatically updated datasets.
//!
//! A dataset's `date_range` display string reads `"<from> - <to>"` with both
//! dates as `MM/DD/YYYY`. For datasets whose data refreshes on a schedule the
//! `<to>` side should track the most recent period the data covers, which is
//! derived from the update frequency and today's date.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};

use crate::record::UpdateFrequency;

/// Display format for both sides of a date range.
pub const RANGE_DATE_FORMAT: &str = "%m/%d/%Y";

/// Storage formats accepted for `from_date`.
const FROM_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d"];

/// Why a record's date range is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SkipReason {
    #[strum(serialize = "no date range")]
    NoDateRange,
    #[strum(serialize = "not due")]
    NotDue,
    #[strum(serialize = "missing or unreadable from_date")]
    MissingFromDate,
    #[strum(serialize = "already correct")]
    AlreadyCorrect,
    #[strum(serialize = "from date after to date")]
    FromAfterTo,
}

/// Outcome of [`recalculate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeDecision {
    /// Leave the stored range untouched.
    Skip(SkipReason),
    /// Replace the stored range with this text.
    NewRange(String),
}

impl RangeDecision {
    /// The replacement text, if any.
    pub fn new_range(&self) -> Option<&str> {
        match self {
            RangeDecision::NewRange(text) => Some(text),
            RangeDecision::Skip(_) => None,
        }
    }
}

/// Parses a stored `from_date` value, ignoring any time of day.
pub fn parse_from_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, FROM_DATE_FORMATS[0])
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(value, FROM_DATE_FORMATS[1]))
        .ok()
}

/// Formats a range the way the catalog displays it.
pub fn format_range(from: NaiveDate, to: NaiveDate) -> String {
    format!(
        "{} - {}",
        from.format(RANGE_DATE_FORMAT),
        to.format(RANGE_DATE_FORMAT)
    )
}

/// Whether a dataset with this frequency is due for a refresh today.
pub fn is_due(frequency: Option<UpdateFrequency>, today: NaiveDate) -> bool {
    use crate::record::UpdateFrequency::*;

    match frequency {
        Some(RealTime | FifteenMinutesOrLess | Hourly | Monthly | Quarterly | EverySixMonths
        | Annually) => true,
        // Daily extracts land a couple of days late.
        Some(Daily) => today.day() > 2,
        Some(Weekly) => today.day() > 7,
        None => false,
    }
}

/// The `<to>` date a due dataset should display.
///
/// Period-based frequencies step back from the first of the current month, so
/// year boundaries wrap naturally (January monthly lands on December 1 of the
/// prior year).
pub fn period_end(frequency: UpdateFrequency, today: NaiveDate) -> NaiveDate {
    let months_back = match frequency {
        UpdateFrequency::Monthly => 1,
        UpdateFrequency::Quarterly => 3,
        UpdateFrequency::EverySixMonths => 6,
        UpdateFrequency::Annually => 12,
        _ => return today,
    };

    // Day 1 exists in every month, so neither step can fail.
    today
        .with_day(1)
        .and_then(|first| first.checked_sub_months(Months::new(months_back)))
        .unwrap_or(today)
}

/// Decides whether a dataset's date range needs rewriting.
///
/// Checks run in order: a missing range, then whether the frequency is due,
/// then the from date, and finally whether the rewritten text differs and
/// stays chronologically valid.
pub fn recalculate(
    frequency: Option<UpdateFrequency>,
    from_date: Option<NaiveDate>,
    today: NaiveDate,
    current_range: Option<&str>,
) -> RangeDecision {
    let current = match current_range {
        Some(text) if !text.is_empty() => text,
        _ => return RangeDecision::Skip(SkipReason::NoDateRange),
    };

    let Some(frequency) = frequency.filter(|_| is_due(frequency, today)) else {
        return RangeDecision::Skip(SkipReason::NotDue);
    };

    let Some(from) = from_date else {
        return RangeDecision::Skip(SkipReason::MissingFromDate);
    };

    let new_to = period_end(frequency, today);
    let new_range = format_range(from, new_to);

    if new_range == current {
        RangeDecision::Skip(SkipReason::AlreadyCorrect)
    } else if from > new_to {
        RangeDecision::Skip(SkipReason::FromAfterTo)
    } else {
        RangeDecision::NewRange(new_range)
    }
}
