use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Store-assigned surrogate identifier of a report date.
///
/// Identifiers grow with the date, one per day, so a difference of exactly 1
/// means "the next day".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateId(pub i64);

impl DateId {
    /// `self` is the day right after `prev`.
    pub fn is_day_after(self, prev: DateId) -> bool {
        self.0 - prev.0 == 1
    }
}

impl fmt::Display for DateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `prev` is yesterday relative to `today`.
pub fn is_yesterday(today: DateId, prev: DateId) -> bool {
    today.is_day_after(prev)
}

/// Entity a snapshot belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SnapshotKey {
    Platform(i64),
    Well(i64),
    FieldPlatform { field_id: i64, platform: String },
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotKey::Platform(id) => write!(f, "platform_id={id}"),
            SnapshotKey::Well(id) => write!(f, "well_id={id}"),
            SnapshotKey::FieldPlatform { field_id, platform } => {
                write!(f, "field_id={field_id},platform={platform}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Attribute values
// ---------------------------------------------------------------------------

/// One stored attribute value. `Absent` is SQL NULL.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum AttrValue {
    #[default]
    Absent,
    Int(i64),
    Num(f64),
    Text(String),
    Date(NaiveDate),
}

impl AttrValue {
    pub fn is_present(&self) -> bool {
        !matches!(self, AttrValue::Absent)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Num(v) => Some(*v),
            AttrValue::Text(s) => parse_loose_number(s),
            _ => None,
        }
    }

    /// Equality that tolerates representation drift between the sheet and
    /// the store: numbers compare by value across int/float/numeric text,
    /// dates compare against ISO date text. Absent equals only absent.
    pub fn loose_eq(&self, other: &AttrValue) -> bool {
        use AttrValue::*;
        match (self, other) {
            (Absent, Absent) => true,
            (Absent, _) | (_, Absent) => false,
            (Text(a), Text(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (Date(d), Text(s)) | (Text(s), Date(d)) => {
                NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").is_ok_and(|p| p == *d)
            }
            (Date(_), _) | (_, Date(_)) => false,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

/// Accepts a decimal comma, so "12,5" reads as 12.5 the way the sheet writes it.
fn parse_loose_number(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    t.replace(',', ".").parse::<f64>().ok()
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Absent => write!(f, "NULL"),
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::Num(v) => write!(f, "{v}"),
            AttrValue::Text(s) => write!(f, "'{s}'"),
            AttrValue::Date(d) => write!(f, "{d}"),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<Option<i64>> for AttrValue {
    fn from(v: Option<i64>) -> Self {
        v.map_or(AttrValue::Absent, AttrValue::Int)
    }
}

impl From<Option<f64>> for AttrValue {
    fn from(v: Option<f64>) -> Self {
        v.map_or(AttrValue::Absent, AttrValue::Num)
    }
}

impl From<Option<String>> for AttrValue {
    fn from(v: Option<String>) -> Self {
        v.map_or(AttrValue::Absent, AttrValue::Text)
    }
}

impl From<Option<NaiveDate>> for AttrValue {
    fn from(v: Option<NaiveDate>) -> Self {
        v.map_or(AttrValue::Absent, AttrValue::Date)
    }
}

impl From<DateId> for AttrValue {
    fn from(v: DateId) -> Self {
        AttrValue::Int(v.0)
    }
}

// ---------------------------------------------------------------------------
// Attribute sets
// ---------------------------------------------------------------------------

static ABSENT: AttrValue = AttrValue::Absent;

/// Ordered column -> value list for one snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Attributes(Vec<(String, AttrValue)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: impl Into<AttrValue>) -> Self {
        self.set(column, value);
        self
    }

    /// Set a column, replacing an earlier value for the same column.
    pub fn set(&mut self, column: &str, value: impl Into<AttrValue>) {
        let value = value.into();
        match self.0.iter_mut().find(|(c, _)| c == column) {
            Some(slot) => slot.1 = value,
            None => self.0.push((column.to_string(), value)),
        }
    }

    /// Value of a column; a column never set reads as absent.
    pub fn get(&self, column: &str) -> &AttrValue {
        self.0
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
            .unwrap_or(&ABSENT)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when no column carries a value.
    pub fn all_absent(&self) -> bool {
        self.0.iter().all(|(_, v)| !v.is_present())
    }
}

/// Field-by-field comparison of a candidate against the previous snapshot.
///
/// Only the candidate's columns are compared. With no previous snapshot every
/// column counts as absent, so any present value is a change.
pub fn attribute_set_differs(candidate: &Attributes, prev: Option<&Attributes>) -> bool {
    attribute_set_differs_except(candidate, prev, &[])
}

/// `attribute_set_differs` with `skip` columns left out of the comparison.
/// Skipped columns are still written; they never make a candidate a change.
pub fn attribute_set_differs_except(candidate: &Attributes, prev: Option<&Attributes>, skip: &[&str]) -> bool {
    candidate.iter().any(|(column, value)| {
        if skip.contains(&column) {
            return false;
        }
        let before = prev.map_or(&ABSENT, |p| p.get(column));
        !value.loose_eq(before)
    })
}

/// Columns on which candidate and previous disagree.
pub fn changed_columns(candidate: &Attributes, prev: Option<&Attributes>) -> Vec<String> {
    candidate
        .iter()
        .filter(|(column, value)| {
            let before = prev.map_or(&ABSENT, |p| p.get(column));
            !value.loose_eq(before)
        })
        .map(|(column, _)| column.to_string())
        .collect()
}
