//! Scenario: CSV Export End To End
//!
//! # Invariant under test
//! Sheets exported to CSV go through the same path as in-memory grids:
//! only exports of the report sheet are picked up, files are processed in
//! path order, and a file that cannot be read is reported without stopping
//! the run.

use std::fs;

use dpr_reconcile::{Decision, FactStream};
use dpr_runtime::{CsvDirSource, OutcomeKind, ReportDriver, VecSink};
use dpr_testkit::{day, to_csv, Harness, SheetBuilder, WellLine, PLATFORM_8, PRIMARY_FIELD};

fn export(d: u32) -> String {
    let grid = SheetBuilder::new(PRIMARY_FIELD, PLATFORM_8, day(d))
        .well(WellLine::healthy(PLATFORM_8, "101", day(d)))
        .well(WellLine::healthy(PLATFORM_8, "102", day(d)).down(12.0, "waiting on crane"))
        .comment("Sea state 4")
        .build();
    to_csv(&grid).unwrap()
}

#[tokio::test]
async fn exported_sheets_are_reconciled_in_path_order() {
    let h = Harness::new();
    let dir = tempfile::tempdir().unwrap();
    let sheet = &h.cfg.sheet_name;

    fs::create_dir(dir.path().join("march")).unwrap();
    fs::write(dir.path().join(format!("march/a_0304__{sheet}.csv")), export(4)).unwrap();
    fs::write(dir.path().join(format!("march/b_0304__{sheet}.csv")), [0xff, 0xfe, 0x00]).unwrap();
    fs::write(dir.path().join(format!("march/c_0305__{sheet}.csv")), export(5)).unwrap();
    fs::write(dir.path().join("march/c_0305__Lookup.csv"), "x,y\n").unwrap();
    fs::write(dir.path().join("march/notes.txt"), "not a sheet").unwrap();

    let source = CsvDirSource::open(dir.path(), sheet).unwrap();
    let mut driver = ReportDriver::new(&h.cfg, &h.reference, h.tz(), &h.store, &h.dates);
    let mut sink = VecSink::new();
    driver.process_files(source, &mut sink).await.unwrap();
    let summary = driver.finish();

    assert_eq!(summary.files, 3);
    assert_eq!(summary.sections_processed, 2);
    assert_eq!(summary.rows_accepted, 4);
    assert_eq!(summary.error, 1);

    let unreadable: Vec<_> = sink
        .outcomes
        .iter()
        .filter(|o| matches!(o.kind, OutcomeKind::FileUnreadable(_)))
        .map(|o| o.at.file.clone())
        .collect();
    assert_eq!(unreadable.len(), 1);
    assert!(unreadable[0].contains("b_0304"));

    assert_eq!(
        sink.decisions(FactStream::DailyGeneralComments),
        vec![Decision::Inserted, Decision::Unchanged]
    );
    assert_eq!(h.store.insert_count(FactStream::DailyWellParameters), 4);
    assert_eq!(h.store.insert_count(FactStream::WellDowntimeReasons), 1);
}
