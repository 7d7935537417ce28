use std::fmt;

use chrono::NaiveDate;
use dpr_config::RuleConfig;
use dpr_extract::{DateFormatError, WellDailyRecord};
use serde::Serialize;

/// One failed business rule on one row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Violation {
    /// A last-test/lab date is not a recognised date.
    InvalidTestDate {
        which: &'static str,
        error: DateFormatError,
    },
    /// A valid test date has no report-date identifier.
    DateNotRegistered { which: &'static str, date: NaiveDate },
    /// Flowing well in the primary field without a flowmeter.
    FlowmeterMissing,
    UptimeOutOfRange { hours: f64 },
    /// Uptime below 24h without full downtime explanation.
    DowntimeIncomplete { missing: Vec<&'static str> },
    LiquidAboveLimit { liquid_ton: f64, limit: f64 },
    TotalGasBelowGaslift {
        total_gas: Option<f64>,
        gaslift_gas: f64,
    },
    PercentOutOfRange { which: &'static str, value: f64 },
}

impl Violation {
    /// Stable short code for logs and outcome sinks.
    pub fn code(&self) -> &'static str {
        match self {
            Violation::InvalidTestDate { .. } => "date_sanity",
            Violation::DateNotRegistered { .. } => "date_not_registered",
            Violation::FlowmeterMissing => "flowmeter_required",
            Violation::UptimeOutOfRange { .. } => "uptime_range",
            Violation::DowntimeIncomplete { .. } => "downtime_completeness",
            Violation::LiquidAboveLimit { .. } => "liquid_bound",
            Violation::TotalGasBelowGaslift { .. } => "gas_consistency",
            Violation::PercentOutOfRange { .. } => "percentage_bounds",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::InvalidTestDate { which, error } => {
                write!(f, "{which} is not correct: {error}")
            }
            Violation::DateNotRegistered { which, date } => {
                write!(f, "{which} {date} is not a registered report date")
            }
            Violation::FlowmeterMissing => write!(f, "well is flowing but no flowmeter is specified"),
            Violation::UptimeOutOfRange { hours } => {
                write!(f, "well uptime {hours}h should be between 0 and 24 hours")
            }
            Violation::DowntimeIncomplete { missing } => write!(
                f,
                "well uptime < 24h but {} not specified",
                missing.join(", ")
            ),
            Violation::LiquidAboveLimit { liquid_ton, limit } => {
                write!(f, "liquid {liquid_ton} t exceeds {limit} t")
            }
            Violation::TotalGasBelowGaslift {
                total_gas,
                gaslift_gas,
            } => match total_gas {
                Some(t) => write!(f, "total gas {t} is less than gaslift gas {gaslift_gas}"),
                None => write!(f, "total gas is empty but gaslift gas is {gaslift_gas}"),
            },
            Violation::PercentOutOfRange { which, value } => {
                write!(f, "{which} {value}% should be between 0 and 100")
            }
        }
    }
}

impl std::error::Error for Violation {}

// ---------------------------------------------------------------------------
// Rule set
// ---------------------------------------------------------------------------

/// Evaluate every rule against one record. An empty list means the row may
/// be reconciled.
pub fn validate(rec: &WellDailyRecord, rules: &RuleConfig) -> Vec<Violation> {
    let mut out = Vec::new();

    date_sanity(rec, &mut out);
    flowmeter_required(rec, rules, &mut out);
    uptime_range(rec, &mut out);
    downtime_completeness(rec, &mut out);
    liquid_bound(rec, rules, &mut out);
    gas_consistency(rec, &mut out);
    percentage_bounds(rec, &mut out);

    out
}

fn date_sanity(rec: &WellDailyRecord, out: &mut Vec<Violation>) {
    let dates = [
        ("last_well_test_date", &rec.well_test.test_date),
        ("last_gas_well_test_date", &rec.gas_test.test_date),
        ("last_lab_date", &rec.lab.lab_date),
    ];
    for (which, d) in dates {
        if let Err(error) = d {
            out.push(Violation::InvalidTestDate {
                which,
                error: error.clone(),
            });
        }
    }
}

fn is_producing(rec: &WellDailyRecord, rules: &RuleConfig) -> bool {
    rec.stock
        .well_stock_category_id
        .is_some_and(|c| rules.producing_stock_category_ids.contains(&c))
}

fn flowmeter_required(rec: &WellDailyRecord, rules: &RuleConfig, out: &mut Vec<Violation>) {
    let flowing = rec.stock.production_sub_category_id == Some(rules.flowing_sub_category_id);
    if rec.ctx.field_id == rules.primary_field_id
        && is_producing(rec, rules)
        && flowing
        && rec.parameters.flowmeter.is_none()
    {
        out.push(Violation::FlowmeterMissing);
    }
}

fn uptime_range(rec: &WellDailyRecord, out: &mut Vec<Violation>) {
    if let Some(hours) = rec.parameters.uptime_hours {
        if !(0.0..=24.0).contains(&hours) {
            out.push(Violation::UptimeOutOfRange { hours });
        }
    }
}

// Missing uptime counts as "not a full day".
fn downtime_completeness(rec: &WellDailyRecord, out: &mut Vec<Violation>) {
    let full_day = rec.parameters.uptime_hours.is_some_and(|h| h >= 24.0);
    if full_day {
        return;
    }
    let mut missing = Vec::new();
    if rec.downtime.downtime_category.is_none() {
        missing.push("downtime category");
    }
    if rec.downtime.sub_skin_activity_id.is_none() {
        missing.push("sub-skin activity");
    }
    if rec.downtime.comments.is_none() {
        missing.push("comment");
    }
    if !missing.is_empty() {
        out.push(Violation::DowntimeIncomplete { missing });
    }
}

fn liquid_bound(rec: &WellDailyRecord, rules: &RuleConfig, out: &mut Vec<Violation>) {
    if !is_producing(rec, rules) {
        return;
    }
    if let Some(liquid_ton) = rec.well_test.liquid_ton {
        if liquid_ton > rules.max_liquid_ton {
            out.push(Violation::LiquidAboveLimit {
                liquid_ton,
                limit: rules.max_liquid_ton,
            });
        }
    }
}

// An empty total counts as zero against a reported gaslift volume.
fn gas_consistency(rec: &WellDailyRecord, out: &mut Vec<Violation>) {
    let Some(gaslift_gas) = rec.gas_test.gaslift_gas else {
        return;
    };
    let total_gas = rec.gas_test.total_gas;
    if total_gas.unwrap_or(0.0) < gaslift_gas {
        out.push(Violation::TotalGasBelowGaslift {
            total_gas,
            gaslift_gas,
        });
    }
}

fn percentage_bounds(rec: &WellDailyRecord, out: &mut Vec<Violation>) {
    let values = [
        ("water cut", rec.lab.water_cut),
        ("mechanical impurities", rec.lab.mechanical_impurities),
    ];
    for (which, v) in values {
        if let Some(value) = v {
            if !(0.0..=100.0).contains(&value) {
                out.push(Violation::PercentOutOfRange { which, value });
            }
        }
    }
}
