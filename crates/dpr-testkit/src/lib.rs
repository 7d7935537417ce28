//! Scenario fixtures for the report engine.
//!
//! Builds report sheets cell by cell at the real sheet positions, a small
//! reference data set that those sheets resolve against, and a harness that
//! drives them through `ReportDriver` on the in-memory store.
//!
//! Architectural decisions:
//! - Fixtures write raw cells only. Everything a scenario asserts on goes
//!   through the same extraction, validation and reconciliation path a
//!   production run takes.
//! - Report dates are registered as one consecutive block, so adjacent
//!   calendar days always have adjacent date ids.

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;

use dpr_config::EngineConfig;
use dpr_extract::layout::{self, col};
use dpr_extract::{Cell, Grid, NamedRow, PlatformRow, ReferenceData, WellRow};
use dpr_reconcile::{DateId, InMemoryDateIds, InMemorySnapshotStore, StoreFault};
use dpr_runtime::{ReportDriver, RunSummary, SectionState, VecSink};

pub const PRIMARY_FIELD: &str = "Neft Daşları";
pub const SECONDARY_FIELD: &str = "Palçıq Pilpiləsi";

/// Four-reading metered platform of the primary field.
pub const PLATFORM_8: &str = "8";
/// Dual-line metered platform of the primary field.
pub const PLATFORM_2: &str = "2";
/// Platform of the secondary field, reached through multi-field sheets.
pub const PLATFORM_3: &str = "3";

pub const PLATFORM_8_ID: i64 = 8;
pub const PLATFORM_2_ID: i64 = 2;
pub const PLATFORM_3_ID: i64 = 30;

/// First registered report date and its id.
pub const FIRST_REGISTERED: (i32, u32, u32) = (2024, 1, 1);
pub const FIRST_DATE_ID: i64 = 1000;
const REGISTERED_DAYS: u64 = 366;

/// A day of March 2024.
pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap_or_default()
}

/// Spreadsheet serial of a date (days since 1899-12-30).
pub fn serial(d: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default();
    (d - epoch).num_days() as f64
}

/// Date id a date gets in the fixture registry.
pub fn date_id(d: NaiveDate) -> DateId {
    let (y, m, dd) = FIRST_REGISTERED;
    let first = NaiveDate::from_ymd_opt(y, m, dd).unwrap_or_default();
    DateId(FIRST_DATE_ID + (d - first).num_days())
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

pub fn reference_fixture() -> ReferenceData {
    let platform = |id: i64, name: &str, field_id: i64| PlatformRow {
        id,
        name: name.to_string(),
        field_id,
        square: None,
    };
    let well = |id: i64, name: &str, platform_id: i64| WellRow {
        id,
        name: name.to_string(),
        platform_id,
    };

    ReferenceData {
        fields: vec![NamedRow::new(1, PRIMARY_FIELD), NamedRow::new(2, SECONDARY_FIELD)],
        platforms: vec![
            platform(PLATFORM_8_ID, PLATFORM_8, 1),
            platform(PLATFORM_2_ID, PLATFORM_2, 1),
            platform(PLATFORM_3_ID, PLATFORM_3, 2),
        ],
        wells: vec![
            well(801, "101", PLATFORM_8_ID),
            well(802, "102", PLATFORM_8_ID),
            well(803, "103", PLATFORM_8_ID),
            well(201, "201", PLATFORM_2_ID),
            well(301, "301", PLATFORM_3_ID),
        ],
        well_stock_categories: vec![
            NamedRow::new(1, "Producing"),
            NamedRow::new(2, "Injection"),
            NamedRow::new(3, "Idle"),
        ],
        production_sub_categories: vec![NamedRow::new(1, "Flowing"), NamedRow::new(2, "Gaslift")],
        production_methods: vec![
            NamedRow::new(1, "Fountain"),
            NamedRow::new(2, "Gaslift"),
            NamedRow::new(3, "ESP"),
        ],
        horizons: vec![NamedRow::new(1, "QaLD"), NamedRow::new(2, "FLD")],
        sub_skin_activities: vec![
            NamedRow::new(1, "PS-01 Waiting on workover"),
            NamedRow::new(2, "PS-02 Pump failure"),
        ],
    }
}

pub fn engine_config() -> EngineConfig {
    EngineConfig::default()
}

// ---------------------------------------------------------------------------
// Sheet building
// ---------------------------------------------------------------------------

/// One well row, pre-filled with values that pass every rule.
#[derive(Debug, Clone, PartialEq)]
pub struct WellLine {
    cells: Vec<Cell>,
}

impl WellLine {
    /// Healthy producing, flowing well on a full day, tested the day before
    /// `report`.
    pub fn healthy(platform_code: &str, well_number: &str, report: NaiveDate) -> Self {
        let tested = report.pred_opt().unwrap_or(report);
        Self {
            cells: vec![Cell::Empty; col::WIDTH],
        }
        .text(col::PLATFORM_CODE, platform_code)
        .text(col::WELL_NUMBER, well_number)
        .text(col::STOCK_CATEGORY, "Producing")
        .text(col::SUB_CATEGORY, "Flowing")
        .text(col::METHOD, "Fountain")
        .text(col::HORIZON, "QaLD")
        .num(col::CASING, 168.0)
        .text(col::COMPLETION_INTERVAL, "1510-1525")
        .num(col::TUBING1_DEPTH, 1500.0)
        .num(col::PACKER_DEPTH, 1490.0)
        .text(col::FLOWMETER, "FM-1")
        .tested_on(tested)
        .num(col::LIQUID_TON, 40.0)
        .num(col::OIL_TON, 32.0)
        .num(col::WATER_TON, 8.0)
        .num(col::TOTAL_GAS, 1200.0)
        .num(col::WATER_CUT, 20.0)
        .num(col::MECHANICAL_IMPURITIES, 0.1)
        .num(col::PQA, 12.5)
        .num(col::PHF, 9.0)
        .num(col::CHOKE, 8.0)
        .num(col::UPTIME_HOURS, 24.0)
    }

    pub fn set(mut self, c: usize, cell: Cell) -> Self {
        if c >= self.cells.len() {
            self.cells.resize(c + 1, Cell::Empty);
        }
        self.cells[c] = cell;
        self
    }

    pub fn num(self, c: usize, v: f64) -> Self {
        self.set(c, Cell::Number(v))
    }

    pub fn text(self, c: usize, s: &str) -> Self {
        self.set(c, Cell::text(s))
    }

    pub fn clear(self, c: usize) -> Self {
        self.set(c, Cell::Empty)
    }

    /// Date written as a spreadsheet serial.
    pub fn date(self, c: usize, d: NaiveDate) -> Self {
        self.num(c, serial(d))
    }

    /// Well test, gas test and lab all on `d`.
    pub fn tested_on(self, d: NaiveDate) -> Self {
        self.date(col::WELL_TEST_DATE, d)
            .date(col::GAS_TEST_DATE, d)
            .date(col::LAB_DATE, d)
    }

    /// Partial day with a complete downtime explanation.
    pub fn down(self, uptime: f64, reason: &str) -> Self {
        self.num(col::UPTIME_HOURS, uptime)
            .text(col::DOWNTIME_CATEGORY, "Planned")
            .text(col::SUB_SKIN_ACTIVITY, "PS-01 Waiting on workover")
            .text(col::COMMENTS, reason)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

/// Report sheet under construction.
#[derive(Debug, Clone)]
pub struct SheetBuilder {
    header: Vec<(layout::Pos, Cell)>,
    wells: Vec<WellLine>,
    comment: Option<String>,
    qc_markers: Vec<usize>,
    sentinel: bool,
}

impl SheetBuilder {
    /// Standard sheet for `field`/`platform`, with a complete set of
    /// flow-meter readings.
    pub fn new(field: &str, platform: &str, report: NaiveDate) -> Self {
        Self {
            header: Vec::new(),
            wells: Vec::new(),
            comment: None,
            qc_markers: Vec::new(),
            sentinel: true,
        }
        .header(layout::REGION, Cell::text("Dəniz"))
        .header(layout::FIELD, Cell::text(field))
        .header(layout::PLATFORM, Cell::text(platform))
        .header(layout::REPORT_DATE, Cell::Number(serial(report)))
        .header(layout::RESPONSIBLE_PERSON, Cell::text("R. Aliyev"))
        .header(layout::PHONE_NUMBER, Cell::text("+994 50 000 00 00"))
        .readings([Some(100.0), Some(200.0), Some(300.0), Some(400.0)])
    }

    /// Multi-field sheet: platform and field come from each row.
    pub fn multi_field(report: NaiveDate) -> Self {
        Self::new("LTS", "", report)
            .header(layout::PLATFORM, Cell::Empty)
            .readings([None; 4])
    }

    pub fn header(mut self, pos: layout::Pos, cell: Cell) -> Self {
        self.header.retain(|(p, _)| *p != pos);
        self.header.push((pos, cell));
        self
    }

    pub fn readings(self, r: [Option<f64>; 4]) -> Self {
        let cell = |v: Option<f64>| v.map_or(Cell::Empty, Cell::Number);
        self.header(layout::FLOWMETER_READING1, cell(r[0]))
            .header(layout::FLOWMETER_READING2, cell(r[1]))
            .header(layout::FLOWMETER_READING3, cell(r[2]))
            .header(layout::FLOWMETER_READING4, cell(r[3]))
    }

    pub fn well(mut self, line: WellLine) -> Self {
        self.wells.push(line);
        self
    }

    pub fn comment(mut self, text: &str) -> Self {
        self.comment = Some(text.to_string());
        self
    }

    /// QC error marker `offset` rows past the sentinel.
    pub fn qc_marker(mut self, offset: usize) -> Self {
        self.qc_markers.push(offset);
        self
    }

    /// Let the well block run to the end of the sheet.
    pub fn without_sentinel(mut self) -> Self {
        self.sentinel = false;
        self
    }

    pub fn build(self) -> Grid {
        let sentinel = layout::FIRST_WELL_ROW + self.wells.len();
        let tail = if self.sentinel {
            *layout::QC_WINDOW.end() + 1
        } else {
            0
        };
        let mut rows = vec![vec![Cell::Empty; col::WIDTH]; sentinel + tail];

        for ((r, c), cell) in self.header {
            put(&mut rows, r, c, cell);
        }
        for (i, line) in self.wells.into_iter().enumerate() {
            rows[layout::FIRST_WELL_ROW + i] = line.cells;
        }
        if self.sentinel {
            if let Some(text) = self.comment {
                put(
                    &mut rows,
                    sentinel + layout::GENERAL_COMMENT_OFFSET,
                    layout::GENERAL_COMMENT_COL,
                    Cell::Text(text),
                );
            }
            for offset in self.qc_markers {
                put(&mut rows, sentinel + offset, layout::QC_MARKER_COL, Cell::Number(1.0));
            }
        }
        Grid::new(rows)
    }
}

fn put(rows: &mut Vec<Vec<Cell>>, r: usize, c: usize, cell: Cell) {
    if r >= rows.len() {
        rows.resize(r + 1, Vec::new());
    }
    let row = &mut rows[r];
    if c >= row.len() {
        row.resize(c + 1, Cell::Empty);
    }
    row[c] = cell;
}

/// Render a grid as the CSV export a workbook converter would produce.
pub fn to_csv(grid: &Grid) -> Result<String, csv::Error> {
    let mut w = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
    for r in 0..grid.row_count() {
        let fields: Vec<String> = grid
            .row(r)
            .iter()
            .map(|c| match c {
                Cell::DateTime(dt) => dt.date_naive().to_string(),
                other => other.as_text().unwrap_or_default(),
            })
            .collect();
        w.write_record(&fields)?;
    }
    let bytes = w.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// What one run produced.
#[derive(Debug)]
pub struct RunOutput {
    pub summary: RunSummary,
    pub sink: VecSink,
    pub states: Vec<SectionState>,
}

/// Engine wired to the in-memory store, kept across runs so reruns and
/// day-over-day scenarios see earlier snapshots.
pub struct Harness {
    pub cfg: EngineConfig,
    pub reference: ReferenceData,
    pub store: InMemorySnapshotStore,
    pub dates: InMemoryDateIds,
}

impl Harness {
    pub fn new() -> Self {
        let (y, m, d) = FIRST_REGISTERED;
        let first = NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        Self {
            cfg: engine_config(),
            reference: reference_fixture(),
            store: InMemorySnapshotStore::new(),
            dates: InMemoryDateIds::consecutive(first, REGISTERED_DAYS, FIRST_DATE_ID),
        }
    }

    pub fn tz(&self) -> Tz {
        self.cfg.tz().unwrap_or(chrono_tz::UTC)
    }

    /// Run sheets in the given order as one run.
    pub async fn run(&self, sheets: &[Grid]) -> Result<RunOutput, StoreFault> {
        let mut driver = ReportDriver::new(&self.cfg, &self.reference, self.tz(), &self.store, &self.dates);
        let mut sink = VecSink::new();
        let mut states = Vec::with_capacity(sheets.len());
        for (i, grid) in sheets.iter().enumerate() {
            let name = format!("sheet-{i}.csv");
            states.push(driver.process_sheet(&name, grid, &mut sink).await?);
        }
        Ok(RunOutput {
            summary: driver.finish(),
            sink,
            states,
        })
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Midnight of a date, for fixtures that need a native date-time cell.
pub fn midnight(d: NaiveDate) -> Cell {
    Cell::DateTime(d.and_time(NaiveTime::MIN).and_utc())
}
