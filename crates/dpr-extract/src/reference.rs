//! Reference data loaded once per run.
//!
//! Lookups are exact on the stored name (trimmed where the sheet habitually
//! carries stray whitespace). A miss returns `None`; the caller decides
//! whether that is fatal for the row, the section, or nothing at all.

use serde::{Deserialize, Serialize};

/// Generic `(id, name)` lookup row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRow {
    pub id: i64,
    pub name: String,
}

impl NamedRow {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformRow {
    pub id: i64,
    pub name: String,
    pub field_id: i64,
    /// Sub-area of a platform; several platforms share a name across squares.
    pub square: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellRow {
    pub id: i64,
    pub name: String,
    pub platform_id: i64,
}

/// Contents of the eight lookup tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub fields: Vec<NamedRow>,
    pub platforms: Vec<PlatformRow>,
    pub wells: Vec<WellRow>,
    pub well_stock_categories: Vec<NamedRow>,
    pub production_sub_categories: Vec<NamedRow>,
    pub production_methods: Vec<NamedRow>,
    pub horizons: Vec<NamedRow>,
    pub sub_skin_activities: Vec<NamedRow>,
}

/// Length of the code prefix that identifies a sub-skin activity.
const SUB_SKIN_PREFIX: usize = 5;

impl ReferenceData {
    pub fn field_id(&self, name: &str) -> Option<i64> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.id)
    }

    pub fn field_name(&self, id: i64) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.name.as_str())
    }

    /// Platform by name within a field, ignoring square.
    pub fn platform_in_field(&self, name: &str, field_id: i64) -> Option<i64> {
        self.platforms
            .iter()
            .find(|p| p.name == name && p.field_id == field_id)
            .map(|p| p.id)
    }

    /// Platform by name, field and square. An empty square on either side
    /// only matches an empty square on the other.
    pub fn platform_in_square(&self, name: &str, field_id: i64, square: Option<&str>) -> Option<i64> {
        let want = square.map(str::trim).filter(|s| !s.is_empty());
        self.platforms
            .iter()
            .find(|p| {
                let have = p.square.as_deref().map(str::trim).filter(|s| !s.is_empty());
                p.name == name && p.field_id == field_id && have == want
            })
            .map(|p| p.id)
    }

    pub fn well_id(&self, number: &str, platform_id: i64) -> Option<i64> {
        let number = number.trim();
        self.wells
            .iter()
            .find(|w| w.name.trim() == number && w.platform_id == platform_id)
            .map(|w| w.id)
    }

    pub fn well_stock_category_id(&self, name: &str) -> Option<i64> {
        find_trimmed(&self.well_stock_categories, name)
    }

    pub fn production_sub_category_id(&self, name: &str) -> Option<i64> {
        find_trimmed(&self.production_sub_categories, name)
    }

    pub fn production_method_id(&self, name: &str) -> Option<i64> {
        find_trimmed(&self.production_methods, name)
    }

    pub fn horizon_id(&self, name: &str) -> Option<i64> {
        find_trimmed(&self.horizons, name)
    }

    /// Sub-skin activities are written as "CODE - description" on the sheet;
    /// only the leading code is compared.
    pub fn sub_skin_activity_id(&self, raw: &str) -> Option<i64> {
        let want = prefix(raw, SUB_SKIN_PREFIX).trim();
        if want.is_empty() {
            return None;
        }
        self.sub_skin_activities
            .iter()
            .find(|a| prefix(&a.name, SUB_SKIN_PREFIX).trim() == want)
            .map(|a| a.id)
    }
}

fn find_trimmed(rows: &[NamedRow], name: &str) -> Option<i64> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    rows.iter().find(|r| r.name.trim() == name).map(|r| r.id)
}

/// First `n` characters (not bytes) of `s`.
fn prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
