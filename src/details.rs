//! Recovers dates and the referring committee from a status document's
//! normalized text. The PDFs carry no machine-readable field labels, so
//! fields are assigned by ordinal position among all pattern matches; the
//! first date-time in every known template is a filing stamp, the second is
//! the introduction. This is a deliberate, documented brittleness: when a
//! template changes, the ordinals change here and nowhere else.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::model::GUAM_TZ;
use crate::parser::patterns::{COMMITTEE_RE, DATE_RE, DATE_TIME_RE};

/// Fields recoverable from a bill-status PDF. Absent fields stay unset.
#[derive(Debug, Default, Clone)]
pub struct BillDetails {
    pub introduced: Option<DateTime<FixedOffset>>,
    pub referred: Option<DateTime<FixedOffset>>,
    pub committee: Option<String>,
}

/// Fields recoverable from a resolution PDF.
#[derive(Debug, Default, Clone)]
pub struct ResolutionDetails {
    pub introduced: Option<DateTime<FixedOffset>>,
    pub presented: Option<DateTime<FixedOffset>>,
    pub adopted: Option<DateTime<FixedOffset>>,
}

impl BillDetails {
    pub fn is_empty(&self) -> bool {
        self.introduced.is_none() && self.referred.is_none() && self.committee.is_none()
    }
}

impl ResolutionDetails {
    pub fn is_empty(&self) -> bool {
        self.introduced.is_none() && self.presented.is_none() && self.adopted.is_none()
    }
}

pub fn bill_details(text: &str) -> BillDetails {
    let stamps: Vec<&str> = DATE_TIME_RE.find_iter(text).map(|m| m.as_str()).collect();
    let days: Vec<&str> = DATE_RE.find_iter(text).map(|m| m.as_str()).collect();
    BillDetails {
        introduced: stamps.get(1).and_then(|s| parse_local_date_time(s)),
        referred: days.get(2).and_then(|s| parse_local_date(s)),
        committee: COMMITTEE_RE
            .captures(text)
            .map(|caps| collapse_whitespace(&caps[1])),
    }
}

pub fn resolution_details(text: &str) -> ResolutionDetails {
    let stamps: Vec<&str> = DATE_TIME_RE.find_iter(text).map(|m| m.as_str()).collect();
    ResolutionDetails {
        introduced: stamps.get(1).and_then(|s| parse_local_date_time(s)),
        presented: stamps.get(2).and_then(|s| parse_local_date_time(s)),
        adopted: stamps.get(3).and_then(|s| parse_local_date_time(s)),
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// "1/19/22" or "01/19/2022", midnight Guam time.
fn parse_local_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    ["%m/%d/%Y", "%m/%d/%y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|dt| dt.and_local_timezone(*GUAM_TZ).single())
}

/// "1/19/22\n9:30 a.m." and friends. The layout engine may break the line
/// between date and time and dot the meridiem.
fn parse_local_date_time(raw: &str) -> Option<DateTime<FixedOffset>> {
    let cleaned = raw.replace('\n', " ").replace('.', "").to_uppercase();
    let cleaned = collapse_whitespace(&cleaned);
    ["%m/%d/%Y %I:%M %p", "%m/%d/%y %I:%M %p"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&cleaned, fmt).ok())
        .and_then(|dt| dt.and_local_timezone(*GUAM_TZ).single())
}
