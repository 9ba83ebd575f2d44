//! Last-updated text classification.
//!
//! Profiles show text such as `Atualizado pelo proprietário - abr. de 2025`. The date part
//! sits after the first `" - "` (or is the whole text), uses a Portuguese month abbreviation
//! with a trailing period and an optional `de <year>` suffix. A missing year means the
//! current year.

use crate::utils::error::{HarvestError, Result};
use chrono::{Datelike, Months, NaiveDate};

const MONTHS: [(&str, u32); 12] = [
    ("jan.", 1),
    ("fev.", 2),
    ("mar.", 3),
    ("abr.", 4),
    ("mai.", 5),
    ("jun.", 6),
    ("jul.", 7),
    ("ago.", 8),
    ("set.", 9),
    ("out.", 10),
    ("nov.", 11),
    ("dez.", 12),
];

/// Profiles last updated before this many whole months ago are stale.
pub const STALE_AFTER_MONTHS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

fn unparseable(text: &str, reason: impl Into<String>) -> HarvestError {
    HarvestError::UnparseableDate {
        text: text.to_string(),
        reason: reason.into(),
    }
}

/// Parse the month and year out of a last-updated text.
pub fn parse(updated_text: &str, today: NaiveDate) -> Result<YearMonth> {
    let date_part = match updated_text.split_once(" - ") {
        Some((_, right)) => right,
        None => updated_text,
    }
    .to_lowercase();

    let (month_part, year_part) = match date_part.split_once(" de ") {
        Some((month, year)) => (month.trim(), year.trim()),
        None => (date_part.trim(), ""),
    };

    let month = MONTHS
        .iter()
        .find(|(abbrev, _)| *abbrev == month_part)
        .map(|(_, number)| *number)
        .ok_or_else(|| {
            unparseable(
                updated_text,
                format!("unknown month abbreviation '{}'", month_part),
            )
        })?;

    let year = if year_part.is_empty() {
        today.year()
    } else {
        year_part
            .parse::<i32>()
            .map_err(|e| unparseable(updated_text, format!("invalid year '{}': {}", year_part, e)))?
    };

    let parsed = YearMonth { year, month };
    if parsed.first_day().is_none() {
        return Err(unparseable(updated_text, "date out of range"));
    }
    Ok(parsed)
}

/// First day of the current month shifted back `STALE_AFTER_MONTHS` calendar months.
pub fn cutoff(today: NaiveDate) -> NaiveDate {
    let month_start = today.with_day(1).unwrap_or(today);
    month_start
        .checked_sub_months(Months::new(STALE_AFTER_MONTHS))
        .unwrap_or(NaiveDate::MIN)
}

pub fn is_stale(updated_text: &str, today: NaiveDate) -> Result<bool> {
    let parsed = parse(updated_text, today)?;
    let profile_date = parsed
        .first_day()
        .ok_or_else(|| unparseable(updated_text, "date out of range"))?;
    Ok(profile_date < cutoff(today))
}
