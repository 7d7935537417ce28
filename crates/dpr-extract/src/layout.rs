//! Fixed cell positions of the daily report sheet (0-based row, column).

/// (row, col) of a header cell.
pub type Pos = (usize, usize);

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

pub const REGION: Pos = (2, 5);
pub const FIELD: Pos = (3, 5);
pub const PLATFORM: Pos = (4, 5);
pub const REPORT_DATE: Pos = (6, 5);
pub const RESPONSIBLE_PERSON: Pos = (3, 18);
pub const PHONE_NUMBER: Pos = (4, 18);

pub const FLOWMETER_READING1: Pos = (3, 61);
pub const FLOWMETER_READING2: Pos = (4, 61);
pub const FLOWMETER_READING3: Pos = (3, 63);
pub const FLOWMETER_READING4: Pos = (4, 63);
pub const FLOWMETER_CALIBRATION_DATE: Pos = (6, 61);

// ---------------------------------------------------------------------------
// Well rows
// ---------------------------------------------------------------------------

/// First well row.
pub const FIRST_WELL_ROW: usize = 14;

/// Rows past the sentinel that hold QC error markers (inclusive).
pub const QC_WINDOW: std::ops::RangeInclusive<usize> = 7..=22;
/// Column of the QC error markers.
pub const QC_MARKER_COL: usize = 6;
/// Offset past the sentinel of the general-comment row, and its column.
pub const GENERAL_COMMENT_OFFSET: usize = 7;
pub const GENERAL_COMMENT_COL: usize = 26;

pub mod col {
    //! Column indices within a well row.

    /// Platform code; an empty cell here marks the sentinel row.
    pub const PLATFORM_CODE: usize = 2;
    pub const SQUARE: usize = 3;
    pub const WELL_NUMBER: usize = 4;

    pub const STOCK_CATEGORY: usize = 5;
    pub const SUB_CATEGORY: usize = 6;
    pub const METHOD: usize = 7;
    pub const HORIZON: usize = 8;

    pub const CASING: usize = 9;
    pub const COMPLETION_INTERVAL: usize = 10;
    pub const TUBING1_DEPTH: usize = 11;
    pub const TUBING1_LENGTH: usize = 12;
    pub const TUBING2_DEPTH: usize = 13;
    pub const TUBING2_LENGTH: usize = 14;
    pub const TUBING3_DEPTH: usize = 15;
    pub const TUBING3_LENGTH: usize = 16;
    pub const PACKER_DEPTH: usize = 17;
    pub const FLOWMETER: usize = 18;

    pub const WELL_TEST_DATE: usize = 19;
    pub const LIQUID_TON: usize = 20;
    pub const OIL_TON: usize = 21;
    pub const WATER_TON: usize = 22;
    pub const GAS_TEST_DATE: usize = 23;
    pub const TOTAL_GAS: usize = 24;
    pub const GASLIFT_GAS_WT: usize = 25;
    pub const LAB_DATE: usize = 26;
    pub const WATER_CUT: usize = 27;
    pub const MECHANICAL_IMPURITIES: usize = 28;

    pub const PQA: usize = 29;
    pub const PHF: usize = 30;
    pub const PBA: usize = 31;
    pub const P6X9: usize = 32;
    pub const P9X13: usize = 33;
    pub const P13X20: usize = 34;
    pub const CHOKE: usize = 35;
    pub const GASLIFT_GAS_DAY: usize = 36;
    pub const GASLIFT_SYSTEM_PRESSURE: usize = 37;
    pub const PUMP_DEPTH: usize = 38;
    pub const PUMP_FREQUENCY: usize = 39;
    pub const PUMP_HYDROSTATIC_PRESSURE: usize = 40;

    pub const ESP_PUMP_SIZE: usize = 41;
    pub const ESP_PUMP_STAGES: usize = 42;
    pub const ESP_PUMP_RATE: usize = 43;
    pub const ESP_PUMP_HEAD: usize = 44;
    pub const ESP_DOWNHOLE_GAS_SEPARATOR: usize = 45;

    pub const SRP_PUMPJACK_TYPE: usize = 46;
    pub const SRP_PUMP_PLUNGER_DIAMETER: usize = 47;
    pub const SRP_PLUNGER_STROKE_LENGTH: usize = 48;
    pub const SRP_BALANCER_OSCILLATION_FREQUENCY: usize = 49;
    pub const SRP_PUMP_RATE_COEFFICIENT: usize = 50;
    pub const SRP_MAX_MOTOR_SPEED: usize = 51;
    pub const SRP_SHAFT_DIAMETER: usize = 52;

    pub const PCP_PUMP_RATE: usize = 53;
    pub const PCP_RPM: usize = 54;
    pub const PCP_SCREW_DIAMETER: usize = 55;

    pub const STATIC_FLUID_LEVEL: usize = 56;
    pub const DYNAMIC_FLUID_LEVEL: usize = 57;
    pub const UPTIME_HOURS: usize = 58;
    pub const DOWNTIME_CATEGORY: usize = 59;
    pub const SUB_SKIN_ACTIVITY: usize = 62;
    pub const COMMENTS: usize = 63;

    /// Width of a fully populated well row.
    pub const WIDTH: usize = 64;
}
