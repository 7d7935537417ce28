//! Section context: which field, platform and report date a sheet covers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How field and platform are located on a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SheetKind {
    /// Field from the header; platform per row by name + field + square.
    Standard,
    /// Field and platform both from the header, resolved once.
    SinglePlatform,
    /// Field derived per row from the platform code; platform is that code.
    MultiField,
}

impl SheetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetKind::Standard => "standard",
            SheetKind::SinglePlatform => "single_platform",
            SheetKind::MultiField => "multi_field",
        }
    }
}

/// Everything resolved from the sheet header before any well row is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionContext {
    pub kind: SheetKind,
    /// Header field id; `None` on multi-field sheets.
    pub field_id: Option<i64>,
    pub field_name: Option<String>,
    /// Header platform name; `None` on multi-field sheets.
    pub platform: Option<String>,
    /// Set only for single-platform sheets.
    pub platform_id: Option<i64>,
    pub report_date: NaiveDate,
    pub responsible_person: Option<String>,
    pub phone_number: Option<String>,
    /// Row that ends the well block and anchors the comments area.
    pub sentinel_row: Option<usize>,
}

impl SectionContext {
    /// Short human label, e.g. `Neft Daşları/8`.
    pub fn label(&self) -> String {
        format!(
            "{}/{}",
            self.field_name.as_deref().unwrap_or("*"),
            self.platform.as_deref().unwrap_or("*")
        )
    }
}
