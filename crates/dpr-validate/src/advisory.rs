use std::fmt;

use dpr_config::{FlowmeterConfig, RuleConfig};
use dpr_extract::{PlatformDailyRecord, WellDailyRecord};

/// A non-blocking finding. Reported as a warning; never alters whether a
/// snapshot is written.
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    /// Flowing well whose last test or lab result is older than allowed.
    StaleTest {
        well_test_age_days: i64,
        lab_age_days: i64,
        limit_days: i64,
    },
    /// Dual-line platform reporting the same reading as yesterday.
    FlowmeterUnchanged { platform: String },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::StaleTest {
                well_test_age_days,
                lab_age_days,
                limit_days,
            } => write!(
                f,
                "well test ({well_test_age_days}d) or lab result ({lab_age_days}d) older than {limit_days} days for producing well"
            ),
            Advisory::FlowmeterUnchanged { platform } => write!(
                f,
                "flowmeter readings on platform {platform} are the same as yesterday's"
            ),
        }
    }
}

/// Stale test/lab results on a flowing well. `None` when the record has no
/// valid test dates; those rows are rejected before this runs.
pub fn stale_test_advisory(rec: &WellDailyRecord, rules: &RuleConfig) -> Option<Advisory> {
    if rec.stock.production_sub_category_id != Some(rules.flowing_sub_category_id) {
        return None;
    }
    let dates = rec.test_dates()?;
    let well_test_age_days = (rec.report_date - dates.well_test).num_days();
    let lab_age_days = (rec.report_date - dates.lab).num_days();

    (well_test_age_days > rules.stale_test_days || lab_age_days > rules.stale_test_days).then_some(
        Advisory::StaleTest {
            well_test_age_days,
            lab_age_days,
            limit_days: rules.stale_test_days,
        },
    )
}

// ---------------------------------------------------------------------------
// Flow meter
// ---------------------------------------------------------------------------

/// Whether the platform flow-meter stream applies to a section, and whether
/// its readings are complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowmeterCheck {
    /// Not the primary field, or the platform has no meter.
    NotApplicable,
    /// Metered platform not found in reference data.
    UnknownPlatform,
    MissingReadings(Vec<&'static str>),
    Ready,
}

pub fn check_flowmeter(
    field_id: Option<i64>,
    rec: &PlatformDailyRecord,
    rules: &RuleConfig,
    meters: &FlowmeterConfig,
) -> FlowmeterCheck {
    if field_id != Some(rules.primary_field_id) || !meters.is_metered(&rec.platform) {
        return FlowmeterCheck::NotApplicable;
    }
    if rec.platform_id.is_none() {
        return FlowmeterCheck::UnknownPlatform;
    }

    let mut missing = Vec::new();
    let four = meters.needs_four_readings(&rec.platform);
    if four && rec.reading1.is_none() {
        missing.push("reading1");
    }
    if rec.reading2.is_none() {
        missing.push("reading2");
    }
    if four && rec.reading3.is_none() {
        missing.push("reading3");
    }
    if rec.reading4.is_none() {
        missing.push("reading4");
    }

    if missing.is_empty() {
        FlowmeterCheck::Ready
    } else {
        FlowmeterCheck::MissingReadings(missing)
    }
}

/// The most recent earlier flow-meter snapshot, reduced to what the
/// unchanged-readings check needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviousReadings {
    pub is_yesterday: bool,
    pub reading2: Option<f64>,
    pub reading4: Option<f64>,
}

/// Either dual-line reading equal to yesterday's raises the advisory.
pub fn unchanged_readings_advisory(
    today: &PlatformDailyRecord,
    prev: Option<&PreviousReadings>,
    meters: &FlowmeterConfig,
) -> Option<Advisory> {
    let prev = prev?;
    let same = prev.reading2 == today.reading2 || prev.reading4 == today.reading4;
    (prev.is_yesterday && meters.is_dual_line(&today.platform) && same).then(|| {
        Advisory::FlowmeterUnchanged {
            platform: today.platform.clone(),
        }
    })
}
