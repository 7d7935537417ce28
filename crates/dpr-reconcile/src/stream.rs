use std::fmt;

use serde::{Deserialize, Serialize};

/// How a stream decides whether to write a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Policy {
    AppendIfAbsent,
    InsertIfChanged,
}

/// The nine independently reconciled fact streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FactStream {
    Flowmeters,
    WellStock,
    Completions,
    WellDowntimeReasons,
    DailyWellParameters,
    WellTests,
    GasWellTests,
    LaboratoryResults,
    DailyGeneralComments,
}

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Int,
    Num,
    Text,
    Date,
}

/// `(column name, storage type)`.
pub type Column = (&'static str, ColumnKind);

const PARAMETER_COLUMNS: &[Column] = &[
    ("flowmeter", ColumnKind::Text),
    ("well_uptime_hours", ColumnKind::Num),
    ("choke", ColumnKind::Num),
    ("pqa", ColumnKind::Num),
    ("phf", ColumnKind::Num),
    ("pba", ColumnKind::Num),
    ("p6x9", ColumnKind::Num),
    ("p9x13", ColumnKind::Num),
    ("p13x20", ColumnKind::Num),
    ("gaslift_gas", ColumnKind::Num),
    ("gaslift_system_pressure", ColumnKind::Num),
    ("pump_depth", ColumnKind::Num),
    ("pump_frequency", ColumnKind::Num),
    ("pump_hydrostatic_pressure", ColumnKind::Num),
    ("esp_pump_size", ColumnKind::Num),
    ("esp_pump_stages", ColumnKind::Num),
    ("esp_pump_rate", ColumnKind::Num),
    ("esp_pump_head", ColumnKind::Num),
    ("esp_downhole_gas_separator", ColumnKind::Text),
    ("srp_pumpjack_type", ColumnKind::Text),
    ("srp_pump_plunger_diameter", ColumnKind::Num),
    ("srp_plunger_stroke_length", ColumnKind::Num),
    ("srp_balancer_oscillation_frequency", ColumnKind::Num),
    ("srp_pump_rate_coefficient", ColumnKind::Num),
    ("srp_max_motor_speed", ColumnKind::Num),
    ("srp_shaft_diameter", ColumnKind::Num),
    ("pcp_pump_rate", ColumnKind::Num),
    ("pcp_rpm", ColumnKind::Num),
    ("pcp_screw_diameter", ColumnKind::Num),
    ("static_fluid_level", ColumnKind::Num),
    ("dynamic_fluid_level", ColumnKind::Num),
    ("responsible_person", ColumnKind::Text),
    ("phone_number", ColumnKind::Text),
];

impl FactStream {
    /// Summary and processing order.
    pub const ALL: [FactStream; 9] = [
        FactStream::Flowmeters,
        FactStream::WellStock,
        FactStream::Completions,
        FactStream::WellDowntimeReasons,
        FactStream::DailyWellParameters,
        FactStream::WellTests,
        FactStream::GasWellTests,
        FactStream::LaboratoryResults,
        FactStream::DailyGeneralComments,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            FactStream::Flowmeters => "flowmeters",
            FactStream::WellStock => "well_stock",
            FactStream::Completions => "completions",
            FactStream::WellDowntimeReasons => "well_downtime_reasons",
            FactStream::DailyWellParameters => "daily_well_parameters",
            FactStream::WellTests => "well_tests",
            FactStream::GasWellTests => "gas_well_tests",
            FactStream::LaboratoryResults => "laboratory_results",
            FactStream::DailyGeneralComments => "daily_general_comments",
        }
    }

    pub fn policy(&self) -> Policy {
        match self {
            FactStream::WellStock
            | FactStream::Completions
            | FactStream::WellDowntimeReasons
            | FactStream::DailyGeneralComments => Policy::InsertIfChanged,
            FactStream::Flowmeters
            | FactStream::DailyWellParameters
            | FactStream::WellTests
            | FactStream::GasWellTests
            | FactStream::LaboratoryResults => Policy::AppendIfAbsent,
        }
    }

    /// Columns identifying the entity.
    pub fn key_columns(&self) -> &'static [Column] {
        match self {
            FactStream::Flowmeters => &[("platform_id", ColumnKind::Int)],
            FactStream::DailyGeneralComments => {
                &[("field_id", ColumnKind::Int), ("platform", ColumnKind::Text)]
            }
            _ => &[("well_id", ColumnKind::Int)],
        }
    }

    /// Column holding the date id a snapshot is keyed by. Test streams key
    /// off their own test/lab date, not the report date.
    pub fn date_column(&self) -> &'static str {
        match self {
            FactStream::WellTests | FactStream::GasWellTests => "well_test_date",
            FactStream::LaboratoryResults => "last_lab_date",
            _ => "report_date_id",
        }
    }

    /// Attribute columns written besides key and date.
    pub fn columns(&self) -> &'static [Column] {
        use ColumnKind::*;
        match self {
            FactStream::Flowmeters => &[
                ("reading1", Num),
                ("reading2", Num),
                ("reading3", Num),
                ("reading4", Num),
                ("calibration_date", Date),
            ],
            FactStream::WellStock => &[
                ("well_stock_category_id", Int),
                ("well_stock_sub_category_id", Int),
                ("production_well_stock_sub_category_id", Int),
                ("production_method_id", Int),
            ],
            FactStream::Completions => &[
                ("horizon_id", Int),
                ("casing", Text),
                ("completion_interval", Text),
                ("tubing1_depth", Text),
                ("tubing1_length", Text),
                ("tubing2_depth", Text),
                ("tubing2_length", Text),
                ("tubing3_depth", Text),
                ("tubing3_length", Text),
                ("packer_depth", Text),
            ],
            FactStream::WellDowntimeReasons => &[
                ("downtime_category", Text),
                ("production_sub_skins_activity_id", Int),
                ("comments", Text),
            ],
            FactStream::DailyWellParameters => PARAMETER_COLUMNS,
            FactStream::WellTests => &[
                ("report_date_id", Int),
                ("liquid_ton", Num),
                ("oil_ton", Num),
                ("water_ton", Num),
            ],
            FactStream::GasWellTests => &[
                ("report_date_id", Int),
                ("total_gas", Num),
                ("gaslift_gas", Num),
            ],
            FactStream::LaboratoryResults => &[
                ("report_date_id", Int),
                ("water_cut", Num),
                ("mechanical_impurities", Num),
            ],
            FactStream::DailyGeneralComments => &[("general_comments", Text)],
        }
    }

    /// Columns written with every snapshot but left out of change detection.
    /// The stock sub-category is a configured constant, not a sheet value.
    pub fn stamped_columns(&self) -> &'static [&'static str] {
        match self {
            FactStream::WellStock => &["well_stock_sub_category_id"],
            _ => &[],
        }
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'static str> {
        self.columns().iter().map(|(name, _)| *name)
    }
}

impl fmt::Display for FactStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}
