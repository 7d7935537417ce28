//! Typed records produced by the extractor.
//!
//! A `WellDailyRecord` splits into independent fact groups; each group is
//! reconciled on its own and keyed by its own relevant date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::normalize::DateFormatError;

/// Identity of the well a row describes, plus where it sits on the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowContext {
    /// 0-based row index on the sheet.
    pub row_index: usize,
    pub field_id: i64,
    pub platform: String,
    pub platform_id: i64,
    pub well_id: i64,
    pub well_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockGroup {
    pub well_stock_category_id: Option<i64>,
    pub production_sub_category_id: Option<i64>,
    pub production_method_id: Option<i64>,
}

/// Physical configuration; values are kept as entered on the sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionGroup {
    pub horizon_id: Option<i64>,
    pub casing: Option<String>,
    pub completion_interval: Option<String>,
    pub tubing1_depth: Option<String>,
    pub tubing1_length: Option<String>,
    pub tubing2_depth: Option<String>,
    pub tubing2_length: Option<String>,
    pub tubing3_depth: Option<String>,
    pub tubing3_length: Option<String>,
    pub packer_depth: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DowntimeGroup {
    pub downtime_category: Option<String>,
    pub sub_skin_activity_id: Option<i64>,
    pub comments: Option<String>,
}

/// Daily operating parameters, appended every day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterGroup {
    pub flowmeter: Option<String>,
    pub uptime_hours: Option<f64>,
    pub choke: Option<f64>,
    pub pqa: Option<f64>,
    pub phf: Option<f64>,
    pub pba: Option<f64>,
    pub p6x9: Option<f64>,
    pub p9x13: Option<f64>,
    pub p13x20: Option<f64>,
    /// Daily gaslift volume as entered; see [`ParameterGroup::gaslift_gas`].
    pub gaslift_gas_day: Option<f64>,
    pub gaslift_system_pressure: Option<f64>,
    pub pump_depth: Option<f64>,
    pub pump_frequency: Option<f64>,
    pub pump_hydrostatic_pressure: Option<f64>,
    pub esp_pump_size: Option<f64>,
    pub esp_pump_stages: Option<f64>,
    pub esp_pump_rate: Option<f64>,
    pub esp_pump_head: Option<f64>,
    pub esp_downhole_gas_separator: Option<String>,
    pub srp_pumpjack_type: Option<String>,
    pub srp_pump_plunger_diameter: Option<f64>,
    pub srp_plunger_stroke_length: Option<f64>,
    pub srp_balancer_oscillation_frequency: Option<f64>,
    pub srp_pump_rate_coefficient: Option<f64>,
    pub srp_max_motor_speed: Option<f64>,
    pub srp_shaft_diameter: Option<f64>,
    pub pcp_pump_rate: Option<f64>,
    pub pcp_rpm: Option<f64>,
    pub pcp_screw_diameter: Option<f64>,
    pub static_fluid_level: Option<f64>,
    pub dynamic_fluid_level: Option<f64>,
    pub responsible_person: Option<String>,
    pub phone_number: Option<String>,
}

impl ParameterGroup {
    /// Gaslift gas actually injected during the hours the well was up.
    ///
    /// Absent when either operand is absent.
    pub fn gaslift_gas(&self) -> Option<f64> {
        match (self.gaslift_gas_day, self.uptime_hours) {
            (Some(day), Some(up)) => Some(day / 24.0 * up),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellTestGroup {
    pub test_date: Result<NaiveDate, DateFormatError>,
    pub liquid_ton: Option<f64>,
    pub oil_ton: Option<f64>,
    pub water_ton: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasTestGroup {
    pub test_date: Result<NaiveDate, DateFormatError>,
    pub total_gas: Option<f64>,
    /// Gaslift gas measured during the test.
    pub gaslift_gas: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabGroup {
    pub lab_date: Result<NaiveDate, DateFormatError>,
    pub water_cut: Option<f64>,
    pub mechanical_impurities: Option<f64>,
}

/// One well on one report date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellDailyRecord {
    pub ctx: RowContext,
    pub report_date: NaiveDate,
    pub stock: StockGroup,
    pub completion: CompletionGroup,
    pub downtime: DowntimeGroup,
    pub parameters: ParameterGroup,
    pub well_test: WellTestGroup,
    pub gas_test: GasTestGroup,
    pub lab: LabGroup,
}

impl WellDailyRecord {
    /// The three test dates, when all of them are valid.
    pub fn test_dates(&self) -> Option<TestDates> {
        match (&self.well_test.test_date, &self.gas_test.test_date, &self.lab.lab_date) {
            (Ok(well_test), Ok(gas_test), Ok(lab)) => Some(TestDates {
                well_test: *well_test,
                gas_test: *gas_test,
                lab: *lab,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestDates {
    pub well_test: NaiveDate,
    pub gas_test: NaiveDate,
    pub lab: NaiveDate,
}

/// Platform-level flow meter readings for one report date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformDailyRecord {
    pub platform: String,
    /// `None` when the header platform has no match in reference data.
    pub platform_id: Option<i64>,
    pub reading1: Option<f64>,
    pub reading2: Option<f64>,
    pub reading3: Option<f64>,
    pub reading4: Option<f64>,
    /// Invalid calibration dates are dropped, not rejected.
    pub calibration_date: Option<NaiveDate>,
}

/// Free-text comment for one field+platform on one report date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDailyComment {
    pub field_id: i64,
    pub platform: String,
    pub general_comment: Option<String>,
}
