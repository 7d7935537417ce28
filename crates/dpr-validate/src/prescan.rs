use std::fmt;

use chrono::NaiveDate;
use dpr_extract::layout::{QC_MARKER_COL, QC_WINDOW};
use dpr_extract::{ExtractError, Grid};

/// Why a whole section (one field/platform/date) was not processed.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionRejection {
    /// Field, platform or report date could not be resolved from the header.
    Context(ExtractError),
    /// The report date parses but has no identifier in the store.
    ReportDateNotRegistered(NaiveDate),
    /// Upstream QC flagged errors below the well block.
    QcMarkers { marker_rows: Vec<usize> },
}

impl fmt::Display for SectionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionRejection::Context(e) => write!(f, "{e}"),
            SectionRejection::ReportDateNotRegistered(d) => {
                write!(f, "report date {d} is not registered")
            }
            SectionRejection::QcMarkers { marker_rows } => {
                let rows: Vec<String> = marker_rows.iter().map(|r| (r + 1).to_string()).collect();
                write!(f, "QC error markers set on row(s) {}", rows.join(", "))
            }
        }
    }
}

impl std::error::Error for SectionRejection {}

impl From<ExtractError> for SectionRejection {
    fn from(e: ExtractError) -> Self {
        SectionRejection::Context(e)
    }
}

/// Check the QC marker window below the sentinel row before any well row is
/// processed. A sheet without a sentinel has no window and passes.
pub fn pre_scan(grid: &Grid, sentinel_row: Option<usize>) -> Result<(), SectionRejection> {
    let Some(sentinel) = sentinel_row else {
        return Ok(());
    };
    let marker_rows: Vec<usize> = QC_WINDOW
        .map(|offset| sentinel + offset)
        .filter(|&r| grid.get(r, QC_MARKER_COL).is_truthy())
        .collect();

    if marker_rows.is_empty() {
        Ok(())
    } else {
        Err(SectionRejection::QcMarkers { marker_rows })
    }
}
