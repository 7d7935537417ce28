//! dpr-extract
//!
//! Record Extractor: turns the cell grid of one daily report sheet into typed
//! records.
//!
//! - `cell`: heterogeneous cell values and the grid
//! - `normalize`: numbers (comma decimals, sentinels) and dates (serials, zones)
//! - `reference`: lookup tables and name matching
//! - `layout`: fixed sheet positions
//! - `record`: typed output records and fact groups
//!
//! Pure logic. No IO, no DB. Reference data is handed in by the caller.

pub mod cell;
pub mod context;
pub mod layout;
pub mod normalize;
pub mod record;
pub mod reference;

use std::fmt;
use std::ops::Range;

use chrono_tz::Tz;
use dpr_config::EngineConfig;

pub use cell::{cell_at, Cell, Grid};
pub use context::{SectionContext, SheetKind};
pub use normalize::{normalize_date, parse_numeric, DateFormatError};
pub use record::*;
pub use reference::{NamedRow, PlatformRow, ReferenceData, WellRow};

use layout::col;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Context could not be resolved, or a row cannot be read at all.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    UnknownField {
        name: String,
    },
    UnknownPlatform {
        name: String,
        field_id: i64,
        square: Option<String>,
    },
    UnknownWell {
        number: String,
        platform: String,
    },
    ReportDate(DateFormatError),
    MalformedRow {
        row: usize,
        reason: String,
    },
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::UnknownField { name } => write!(f, "field name '{name}' is not correct"),
            ExtractError::UnknownPlatform {
                name,
                field_id,
                square,
            } => match square {
                Some(sq) => write!(
                    f,
                    "platform '{name}' (square {sq}) not found in field {field_id}"
                ),
                None => write!(f, "platform '{name}' not found in field {field_id}"),
            },
            ExtractError::UnknownWell { number, platform } => {
                write!(f, "well '{number}' not found on platform {platform}")
            }
            ExtractError::ReportDate(e) => write!(f, "report date is not correct: {e}"),
            ExtractError::MalformedRow { row, reason } => {
                write!(f, "row {} is malformed: {reason}", row + 1)
            }
        }
    }
}

impl std::error::Error for ExtractError {}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Reads sections and rows of a sheet against one run's reference data.
#[derive(Debug, Clone)]
pub struct Extractor<'a> {
    reference: &'a ReferenceData,
    cfg: &'a EngineConfig,
    tz: Tz,
}

impl<'a> Extractor<'a> {
    pub fn new(reference: &'a ReferenceData, cfg: &'a EngineConfig, tz: Tz) -> Self {
        Self { reference, cfg, tz }
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn reference(&self) -> &ReferenceData {
        self.reference
    }

    /// Resolve the header: sheet kind, field, platform and report date.
    ///
    /// Any failure here rejects the whole section.
    pub fn locate_section(&self, grid: &Grid) -> Result<SectionContext, ExtractError> {
        let header = |pos: layout::Pos| grid.get(pos.0, pos.1).as_trimmed_text();
        let sheet = &self.cfg.sheet;

        let region = header(layout::REGION);
        let field_cell = header(layout::FIELD);

        let kind = if field_cell.as_deref() == Some(sheet.multi_field_marker.as_str()) {
            SheetKind::MultiField
        } else if region.as_deref() == Some(sheet.single_platform_region.as_str()) {
            SheetKind::SinglePlatform
        } else {
            SheetKind::Standard
        };

        let (field_id, field_name) = match kind {
            SheetKind::MultiField => (None, None),
            _ => {
                let name = field_cell.unwrap_or_default();
                let id = self
                    .reference
                    .field_id(&name)
                    .ok_or_else(|| ExtractError::UnknownField { name: name.clone() })?;
                (Some(id), Some(name))
            }
        };

        let platform = match kind {
            SheetKind::MultiField => None,
            _ => header(layout::PLATFORM),
        };

        let platform_id = match (kind, field_id) {
            (SheetKind::SinglePlatform, Some(fid)) => {
                let name = platform.clone().unwrap_or_default();
                let id = self.reference.platform_in_field(&name, fid).ok_or(
                    ExtractError::UnknownPlatform {
                        name,
                        field_id: fid,
                        square: None,
                    },
                )?;
                Some(id)
            }
            _ => None,
        };

        let report_date = normalize_date(grid.get(layout::REPORT_DATE.0, layout::REPORT_DATE.1), self.tz)
            .map_err(ExtractError::ReportDate)?;

        Ok(SectionContext {
            kind,
            field_id,
            field_name,
            platform,
            platform_id,
            report_date,
            responsible_person: header(layout::RESPONSIBLE_PERSON),
            phone_number: header(layout::PHONE_NUMBER),
            sentinel_row: find_sentinel_row(grid),
        })
    }

    /// Identify the well on one row.
    pub fn resolve_row(
        &self,
        section: &SectionContext,
        row: &[Cell],
        row_index: usize,
    ) -> Result<RowContext, ExtractError> {
        let well_number = cell_at(row, col::WELL_NUMBER).as_trimmed_text().ok_or_else(|| {
            ExtractError::MalformedRow {
                row: row_index,
                reason: "well number is empty".to_string(),
            }
        })?;
        let square = cell_at(row, col::SQUARE).as_trimmed_text();

        let (field_id, platform, platform_id) = match section.kind {
            SheetKind::SinglePlatform => {
                let field_id = section.field_id.unwrap_or_default();
                let platform = section.platform.clone().unwrap_or_default();
                (field_id, platform, section.platform_id)
            }
            SheetKind::Standard => {
                let field_id = section.field_id.unwrap_or_default();
                let platform = section.platform.clone().unwrap_or_default();
                let id = self
                    .reference
                    .platform_in_square(&platform, field_id, square.as_deref());
                (field_id, platform, id)
            }
            SheetKind::MultiField => {
                let code = cell_at(row, col::PLATFORM_CODE)
                    .as_trimmed_text()
                    .unwrap_or_default();
                let field_name = self.cfg.sheet.multi_field.field_for_code(&code);
                let field_id = self.reference.field_id(field_name).ok_or_else(|| {
                    ExtractError::UnknownField {
                        name: field_name.to_string(),
                    }
                })?;
                let id = self
                    .reference
                    .platform_in_square(&code, field_id, square.as_deref());
                (field_id, code, id)
            }
        };

        let platform_id = platform_id.ok_or_else(|| ExtractError::UnknownPlatform {
            name: platform.clone(),
            field_id,
            square: square.clone(),
        })?;

        let well_id = self
            .reference
            .well_id(&well_number, platform_id)
            .ok_or_else(|| ExtractError::UnknownWell {
                number: well_number.clone(),
                platform: platform.clone(),
            })?;

        Ok(RowContext {
            row_index,
            field_id,
            platform,
            platform_id,
            well_id,
            well_number,
        })
    }

    /// Build the typed record for an identified well row.
    ///
    /// Never fails: unreadable values become absent and are left for the
    /// rule set to judge.
    pub fn well_record(&self, section: &SectionContext, ctx: RowContext, row: &[Cell]) -> WellDailyRecord {
        let sentinels = &self.cfg.missing_data_sentinels;
        let num = |c: usize| parse_numeric(cell_at(row, c), sentinels);
        let raw = |c: usize| cell_at(row, c).as_trimmed_text();
        let text = |c: usize| raw(c).filter(|s| !sentinels.iter().any(|m| m == s));
        let date = |c: usize| normalize_date(cell_at(row, c), self.tz);
        let r = self.reference;

        let stock = StockGroup {
            well_stock_category_id: raw(col::STOCK_CATEGORY).and_then(|s| r.well_stock_category_id(&s)),
            production_sub_category_id: raw(col::SUB_CATEGORY)
                .and_then(|s| r.production_sub_category_id(&s)),
            production_method_id: raw(col::METHOD).and_then(|s| r.production_method_id(&s)),
        };

        let completion = CompletionGroup {
            horizon_id: raw(col::HORIZON).and_then(|s| r.horizon_id(&s)),
            casing: raw(col::CASING),
            completion_interval: raw(col::COMPLETION_INTERVAL),
            tubing1_depth: raw(col::TUBING1_DEPTH),
            tubing1_length: raw(col::TUBING1_LENGTH),
            tubing2_depth: raw(col::TUBING2_DEPTH),
            tubing2_length: raw(col::TUBING2_LENGTH),
            tubing3_depth: raw(col::TUBING3_DEPTH),
            tubing3_length: raw(col::TUBING3_LENGTH),
            packer_depth: raw(col::PACKER_DEPTH),
        };

        let downtime = DowntimeGroup {
            downtime_category: raw(col::DOWNTIME_CATEGORY),
            sub_skin_activity_id: cell_at(row, col::SUB_SKIN_ACTIVITY)
                .as_text()
                .and_then(|s| r.sub_skin_activity_id(&s)),
            comments: raw(col::COMMENTS),
        };

        let parameters = ParameterGroup {
            flowmeter: raw(col::FLOWMETER),
            uptime_hours: num(col::UPTIME_HOURS),
            choke: num(col::CHOKE),
            pqa: num(col::PQA),
            phf: num(col::PHF),
            pba: num(col::PBA),
            p6x9: num(col::P6X9),
            p9x13: num(col::P9X13),
            p13x20: num(col::P13X20),
            gaslift_gas_day: num(col::GASLIFT_GAS_DAY),
            gaslift_system_pressure: num(col::GASLIFT_SYSTEM_PRESSURE),
            pump_depth: num(col::PUMP_DEPTH),
            pump_frequency: num(col::PUMP_FREQUENCY),
            pump_hydrostatic_pressure: num(col::PUMP_HYDROSTATIC_PRESSURE),
            esp_pump_size: num(col::ESP_PUMP_SIZE),
            esp_pump_stages: num(col::ESP_PUMP_STAGES),
            esp_pump_rate: num(col::ESP_PUMP_RATE),
            esp_pump_head: num(col::ESP_PUMP_HEAD),
            esp_downhole_gas_separator: text(col::ESP_DOWNHOLE_GAS_SEPARATOR),
            srp_pumpjack_type: text(col::SRP_PUMPJACK_TYPE),
            srp_pump_plunger_diameter: num(col::SRP_PUMP_PLUNGER_DIAMETER),
            srp_plunger_stroke_length: num(col::SRP_PLUNGER_STROKE_LENGTH),
            srp_balancer_oscillation_frequency: num(col::SRP_BALANCER_OSCILLATION_FREQUENCY),
            srp_pump_rate_coefficient: num(col::SRP_PUMP_RATE_COEFFICIENT),
            srp_max_motor_speed: num(col::SRP_MAX_MOTOR_SPEED),
            srp_shaft_diameter: num(col::SRP_SHAFT_DIAMETER),
            pcp_pump_rate: num(col::PCP_PUMP_RATE),
            pcp_rpm: num(col::PCP_RPM),
            pcp_screw_diameter: num(col::PCP_SCREW_DIAMETER),
            static_fluid_level: num(col::STATIC_FLUID_LEVEL),
            dynamic_fluid_level: num(col::DYNAMIC_FLUID_LEVEL),
            responsible_person: section.responsible_person.clone(),
            phone_number: section.phone_number.clone(),
        };

        WellDailyRecord {
            ctx,
            report_date: section.report_date,
            stock,
            completion,
            downtime,
            parameters,
            well_test: WellTestGroup {
                test_date: date(col::WELL_TEST_DATE),
                liquid_ton: num(col::LIQUID_TON),
                oil_ton: num(col::OIL_TON),
                water_ton: num(col::WATER_TON),
            },
            gas_test: GasTestGroup {
                test_date: date(col::GAS_TEST_DATE),
                total_gas: num(col::TOTAL_GAS),
                gaslift_gas: num(col::GASLIFT_GAS_WT),
            },
            lab: LabGroup {
                lab_date: date(col::LAB_DATE),
                water_cut: num(col::WATER_CUT),
                mechanical_impurities: num(col::MECHANICAL_IMPURITIES),
            },
        }
    }

    /// Resolve and extract one row in a single step.
    pub fn extract_row(
        &self,
        section: &SectionContext,
        row: &[Cell],
        row_index: usize,
    ) -> Result<WellDailyRecord, ExtractError> {
        let ctx = self.resolve_row(section, row, row_index)?;
        Ok(self.well_record(section, ctx, row))
    }

    /// Flow meter readings from the header. `None` on multi-field sheets,
    /// which carry no section platform.
    pub fn platform_record(&self, grid: &Grid, section: &SectionContext) -> Option<PlatformDailyRecord> {
        let platform = section.platform.clone()?;
        let sentinels = &self.cfg.missing_data_sentinels;
        let reading = |pos: layout::Pos| parse_numeric(grid.get(pos.0, pos.1), sentinels);

        let platform_id = section.platform_id.or_else(|| {
            section
                .field_id
                .and_then(|fid| self.reference.platform_in_field(&platform, fid))
        });

        let cal = layout::FLOWMETER_CALIBRATION_DATE;
        Some(PlatformDailyRecord {
            platform,
            platform_id,
            reading1: reading(layout::FLOWMETER_READING1),
            reading2: reading(layout::FLOWMETER_READING2),
            reading3: reading(layout::FLOWMETER_READING3),
            reading4: reading(layout::FLOWMETER_READING4),
            calibration_date: normalize::optional_date(grid.get(cal.0, cal.1), self.tz),
        })
    }

    /// General comment below the well block.
    ///
    /// On multi-field sheets field and platform come from the last well row
    /// read; elsewhere from the header.
    pub fn field_comment(
        &self,
        grid: &Grid,
        section: &SectionContext,
        last_row: Option<&RowContext>,
    ) -> Option<FieldDailyComment> {
        let sentinel = section.sentinel_row?;
        let (field_id, platform) = match (section.kind, last_row) {
            (SheetKind::MultiField, Some(ctx)) => (ctx.field_id, ctx.platform.clone()),
            (SheetKind::MultiField, None) => return None,
            _ => (section.field_id?, section.platform.clone()?),
        };
        let general_comment = grid
            .get(sentinel + layout::GENERAL_COMMENT_OFFSET, layout::GENERAL_COMMENT_COL)
            .as_trimmed_text();
        Some(FieldDailyComment {
            field_id,
            platform,
            general_comment,
        })
    }
}

/// First row at or after the well block whose platform-code cell is empty.
pub fn find_sentinel_row(grid: &Grid) -> Option<usize> {
    (layout::FIRST_WELL_ROW..grid.row_count())
        .find(|&i| grid.get(i, col::PLATFORM_CODE).as_trimmed_text().is_none())
}

/// Well rows of a section: from the first well row up to the sentinel, or
/// to the end of the grid when the sheet has no sentinel.
pub fn well_rows(grid: &Grid, section: &SectionContext) -> Range<usize> {
    let end = section.sentinel_row.unwrap_or_else(|| grid.row_count());
    layout::FIRST_WELL_ROW..end.max(layout::FIRST_WELL_ROW)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use chrono_tz::Asia::Baku;

    fn reference() -> ReferenceData {
        ReferenceData {
            fields: vec![
                NamedRow::new(1, "Neft Daşları"),
                NamedRow::new(2, "Palçıq Pilpiləsi"),
                NamedRow::new(3, "Günəşli"),
            ],
            platforms: vec![
                PlatformRow {
                    id: 10,
                    name: "8".into(),
                    field_id: 1,
                    square: None,
                },
                PlatformRow {
                    id: 11,
                    name: "3".into(),
                    field_id: 2,
                    square: None,
                },
                PlatformRow {
                    id: 12,
                    name: "5".into(),
                    field_id: 3,
                    square: Some("1".into()),
                },
            ],
            wells: vec![
                WellRow {
                    id: 100,
                    name: "1201".into(),
                    platform_id: 10,
                },
                WellRow {
                    id: 101,
                    name: "77".into(),
                    platform_id: 11,
                },
                WellRow {
                    id: 102,
                    name: "501".into(),
                    platform_id: 12,
                },
            ],
            well_stock_categories: vec![NamedRow::new(1, "Hasilat")],
            production_sub_categories: vec![NamedRow::new(1, "Fontan")],
            production_methods: vec![NamedRow::new(2, "Qazlift")],
            horizons: vec![NamedRow::new(4, "QÜG")],
            sub_skin_activities: vec![NamedRow::new(9, "PR-01 Parafin")],
        }
    }

    fn blank_grid(rows: usize) -> Vec<Vec<Cell>> {
        vec![vec![Cell::Empty; col::WIDTH]; rows]
    }

    fn sheet(region: &str, field: &str, platform: &str) -> Vec<Vec<Cell>> {
        let mut g = blank_grid(40);
        g[2][5] = Cell::text(region);
        g[3][5] = Cell::text(field);
        g[4][5] = Cell::text(platform);
        g[6][5] = Cell::Number(45356.0);
        g[3][18] = Cell::text("Ə. Məmmədov");
        g[4][18] = Cell::text("+994 50 000 00 00");
        g
    }

    fn well_row(code: &str, square: &str, number: &str) -> Vec<Cell> {
        let mut r = vec![Cell::Empty; col::WIDTH];
        r[col::PLATFORM_CODE] = Cell::text(code);
        r[col::SQUARE] = Cell::text(square);
        r[col::WELL_NUMBER] = Cell::text(number);
        r
    }

    #[test]
    fn single_platform_sheet_resolves_platform_once() {
        let cfg = EngineConfig::default();
        let refd = reference();
        let ex = Extractor::new(&refd, &cfg, Baku);
        let mut g = sheet("28 May", "Neft Daşları", "8");
        g[14] = well_row("8", "", "1201");
        let grid = Grid::new(g);

        let s = ex.locate_section(&grid).unwrap();
        assert_eq!(s.kind, SheetKind::SinglePlatform);
        assert_eq!(s.field_id, Some(1));
        assert_eq!(s.platform_id, Some(10));
        assert_eq!(s.report_date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(s.sentinel_row, Some(15));
        assert_eq!(well_rows(&grid, &s), 14..15);

        let ctx = ex.resolve_row(&s, grid.row(14), 14).unwrap();
        assert_eq!(ctx.well_id, 100);
        assert_eq!(ctx.platform, "8");
    }

    #[test]
    fn unknown_header_platform_rejects_single_platform_section() {
        let cfg = EngineConfig::default();
        let refd = reference();
        let ex = Extractor::new(&refd, &cfg, Baku);
        let grid = Grid::new(sheet("28 May", "Neft Daşları", "99"));
        assert!(matches!(
            ex.locate_section(&grid),
            Err(ExtractError::UnknownPlatform { .. })
        ));
    }

    #[test]
    fn unknown_field_and_bad_date_reject_section() {
        let cfg = EngineConfig::default();
        let refd = reference();
        let ex = Extractor::new(&refd, &cfg, Baku);

        let grid = Grid::new(sheet("Region", "Nowhere", "8"));
        assert!(matches!(
            ex.locate_section(&grid),
            Err(ExtractError::UnknownField { .. })
        ));

        let mut g = sheet("Region", "Neft Daşları", "8");
        g[6][5] = Cell::Number(42.0);
        assert!(matches!(
            ex.locate_section(&Grid::new(g)),
            Err(ExtractError::ReportDate(DateFormatError::ImplausibleSerial(_)))
        ));
    }

    #[test]
    fn standard_sheet_resolves_platform_by_square() {
        let cfg = EngineConfig::default();
        let refd = reference();
        let ex = Extractor::new(&refd, &cfg, Baku);
        let mut g = sheet("Region", "Günəşli", "5");
        g[14] = well_row("5", "1", "501");
        g[15] = well_row("5", "2", "501");
        let grid = Grid::new(g);
        let s = ex.locate_section(&grid).unwrap();
        assert_eq!(s.kind, SheetKind::Standard);
        assert_eq!(s.platform_id, None);

        assert_eq!(ex.resolve_row(&s, grid.row(14), 14).unwrap().platform_id, 12);
        assert!(matches!(
            ex.resolve_row(&s, grid.row(15), 15),
            Err(ExtractError::UnknownPlatform { .. })
        ));
    }

    #[test]
    fn multi_field_sheet_derives_field_per_row() {
        let cfg = EngineConfig::default();
        let refd = reference();
        let ex = Extractor::new(&refd, &cfg, Baku);
        let mut g = sheet("Region", "LTS", "");
        g[14] = well_row("3", "", "77");
        g[15] = well_row("8", "", "1201");
        let grid = Grid::new(g);
        let s = ex.locate_section(&grid).unwrap();
        assert_eq!(s.kind, SheetKind::MultiField);
        assert_eq!(s.field_id, None);

        let a = ex.resolve_row(&s, grid.row(14), 14).unwrap();
        assert_eq!((a.field_id, a.well_id), (2, 101));
        let b = ex.resolve_row(&s, grid.row(15), 15).unwrap();
        assert_eq!((b.field_id, b.well_id), (1, 100));

        assert!(ex.platform_record(&grid, &s).is_none());
        let comment = ex.field_comment(&grid, &s, Some(&b)).unwrap();
        assert_eq!((comment.field_id, comment.platform.as_str()), (1, "8"));
    }

    #[test]
    fn unknown_well_is_row_level() {
        let cfg = EngineConfig::default();
        let refd = reference();
        let ex = Extractor::new(&refd, &cfg, Baku);
        let mut g = sheet("28 May", "Neft Daşları", "8");
        g[14] = well_row("8", "", "9999");
        g[15] = well_row("8", "", "");
        let grid = Grid::new(g);
        let s = ex.locate_section(&grid).unwrap();
        assert!(matches!(
            ex.resolve_row(&s, grid.row(14), 14),
            Err(ExtractError::UnknownWell { .. })
        ));
        assert!(matches!(
            ex.resolve_row(&s, grid.row(15), 15),
            Err(ExtractError::MalformedRow { row: 15, .. })
        ));
    }

    #[test]
    fn well_record_maps_columns_and_absent_values() {
        let cfg = EngineConfig::default();
        let refd = reference();
        let ex = Extractor::new(&refd, &cfg, Baku);
        let mut g = sheet("28 May", "Neft Daşları", "8");
        let mut r = well_row("8", "", "1201");
        r[col::STOCK_CATEGORY] = Cell::text("Hasilat ");
        r[col::SUB_CATEGORY] = Cell::text("Fontan");
        r[col::METHOD] = Cell::text("unknown method");
        r[col::HORIZON] = Cell::text("QÜG");
        r[col::CASING] = Cell::Number(168.0);
        r[col::FLOWMETER] = Cell::text("FM-2");
        r[col::WELL_TEST_DATE] = Cell::Number(45350.0);
        r[col::LIQUID_TON] = Cell::text("12,5");
        r[col::GAS_TEST_DATE] = Cell::text("nope");
        r[col::LAB_DATE] = Cell::Number(45340.0);
        r[col::PQA] = Cell::text("y");
        r[col::GASLIFT_GAS_DAY] = Cell::Number(2400.0);
        r[col::SRP_PUMPJACK_TYPE] = Cell::text("SK-6");
        r[col::UPTIME_HOURS] = Cell::text("18");
        r[col::DOWNTIME_CATEGORY] = Cell::text("Təmir");
        r[col::SUB_SKIN_ACTIVITY] = Cell::text("PR-01 anything");
        r[col::COMMENTS] = Cell::text("  ");
        g[14] = r;
        let grid = Grid::new(g);
        let s = ex.locate_section(&grid).unwrap();
        let rec = ex.extract_row(&s, grid.row(14), 14).unwrap();

        assert_eq!(rec.stock.well_stock_category_id, Some(1));
        assert_eq!(rec.stock.production_sub_category_id, Some(1));
        assert_eq!(rec.stock.production_method_id, None);
        assert_eq!(rec.completion.horizon_id, Some(4));
        assert_eq!(rec.completion.casing.as_deref(), Some("168"));
        assert_eq!(rec.parameters.flowmeter.as_deref(), Some("FM-2"));
        assert_eq!(rec.well_test.liquid_ton, Some(12.5));
        assert_eq!(rec.well_test.oil_ton, None);
        assert!(rec.gas_test.test_date.is_err());
        assert!(rec.test_dates().is_none());
        assert_eq!(rec.parameters.pqa, None);
        assert_eq!(rec.parameters.srp_pumpjack_type.as_deref(), Some("SK-6"));
        assert_eq!(rec.parameters.gaslift_gas(), Some(1800.0));
        assert_eq!(rec.parameters.responsible_person.as_deref(), Some("Ə. Məmmədov"));
        assert_eq!(rec.downtime.sub_skin_activity_id, Some(9));
        assert_eq!(rec.downtime.comments, None);
    }

    #[test]
    fn platform_record_reads_header_readings() {
        let cfg = EngineConfig::default();
        let refd = reference();
        let ex = Extractor::new(&refd, &cfg, Baku);
        let mut g = sheet("28 May", "Neft Daşları", "8");
        g[3][61] = Cell::Number(1.0);
        g[4][61] = Cell::text("2,5");
        g[4][63] = Cell::Number(4.0);
        g[6][61] = Cell::text("garbage");
        let grid = Grid::new(g);
        let s = ex.locate_section(&grid).unwrap();
        let p = ex.platform_record(&grid, &s).unwrap();
        assert_eq!(p.platform_id, Some(10));
        assert_eq!(
            (p.reading1, p.reading2, p.reading3, p.reading4),
            (Some(1.0), Some(2.5), None, Some(4.0))
        );
        assert_eq!(p.calibration_date, None);
    }

    #[test]
    fn well_block_ends_at_first_row_without_platform_code() {
        let cfg = EngineConfig::default();
        let refd = reference();
        let ex = Extractor::new(&refd, &cfg, Baku);
        let mut g = sheet("28 May", "Neft Daşları", "8");
        g[14] = well_row("8", "", "1201");
        g[15] = well_row("  ", "", "1202");
        g[16] = well_row("8", "", "1203");
        let grid = Grid::new(g);

        assert_eq!(find_sentinel_row(&grid), Some(15));
        let s = ex.locate_section(&grid).unwrap();
        let rows: Vec<_> = well_rows(&grid, &s).collect();
        assert_eq!(rows, vec![14]);
        assert!(rows
            .iter()
            .all(|&i| grid.get(i, col::PLATFORM_CODE).as_trimmed_text().is_some()));
    }

    #[test]
    fn general_comment_sits_below_sentinel() {
        let cfg = EngineConfig::default();
        let refd = reference();
        let ex = Extractor::new(&refd, &cfg, Baku);
        let mut g = sheet("28 May", "Neft Daşları", "8");
        g[14] = well_row("8", "", "1201");
        g[15 + 7][26] = Cell::text("Kompressor təmirdədir");
        let grid = Grid::new(g);
        let s = ex.locate_section(&grid).unwrap();
        let c = ex.field_comment(&grid, &s, None).unwrap();
        assert_eq!(c.field_id, 1);
        assert_eq!(c.platform, "8");
        assert_eq!(c.general_comment.as_deref(), Some("Kompressor təmirdədir"));
    }
}
