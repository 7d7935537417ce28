//! Scenario: Section Rejections
//!
//! # Invariant under test
//! A section whose header does not resolve, whose report date is not
//! registered, or which carries upstream QC markers is rejected before any
//! row is read. Nothing from a rejected section reaches the store, and the
//! next section of the same run is processed normally.

use chrono::NaiveDate;
use dpr_extract::{layout, Cell, ExtractError};
use dpr_runtime::{OutcomeKind, SectionState};
use dpr_testkit::{day, midnight, Harness, SheetBuilder, WellLine, PLATFORM_8, PRIMARY_FIELD};
use dpr_validate::SectionRejection;

fn healthy(d: NaiveDate) -> SheetBuilder {
    SheetBuilder::new(PRIMARY_FIELD, PLATFORM_8, d)
        .well(WellLine::healthy(PLATFORM_8, "101", d))
        .comment("ok")
}

fn rejections(kinds: Vec<OutcomeKind>) -> Vec<SectionRejection> {
    kinds
        .into_iter()
        .filter_map(|k| match k {
            OutcomeKind::SectionRejected(r) => Some(r),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn unknown_field_rejects_the_section() {
    let h = Harness::new();
    let grid = SheetBuilder::new("Günəşli", PLATFORM_8, day(5))
        .well(WellLine::healthy(PLATFORM_8, "101", day(5)))
        .build();

    let out = h.run(&[grid]).await.unwrap();
    assert_eq!(out.states, vec![SectionState::Rejected]);
    let kinds = out.sink.outcomes.into_iter().map(|o| o.kind).collect();
    assert_eq!(
        rejections(kinds),
        vec![SectionRejection::Context(ExtractError::UnknownField {
            name: "Günəşli".to_string()
        })]
    );
    assert_eq!(h.store.total_inserts(), 0);
    assert_eq!(out.summary.sections_rejected, 1);
}

#[tokio::test]
async fn unregistered_report_date_rejects_the_section() {
    let h = Harness::new();
    let late = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let out = h.run(&[healthy(late).build()]).await.unwrap();

    let kinds = out.sink.outcomes.into_iter().map(|o| o.kind).collect();
    assert_eq!(rejections(kinds), vec![SectionRejection::ReportDateNotRegistered(late)]);
    assert_eq!(h.store.total_inserts(), 0);
}

#[tokio::test]
async fn unreadable_report_date_rejects_the_section() {
    let h = Harness::new();
    let grid = healthy(day(5))
        .header(layout::REPORT_DATE, Cell::text("yesterday"))
        .build();
    let out = h.run(&[grid]).await.unwrap();

    let kinds: Vec<_> = out.sink.outcomes.into_iter().map(|o| o.kind).collect();
    assert!(matches!(
        rejections(kinds).as_slice(),
        [SectionRejection::Context(ExtractError::ReportDate(_))]
    ));
    assert_eq!(h.store.total_inserts(), 0);
}

#[tokio::test]
async fn qc_marker_rejects_the_section_before_any_row() {
    let h = Harness::new();
    let grid = healthy(day(5)).qc_marker(9).build();
    let out = h.run(&[grid]).await.unwrap();

    assert_eq!(out.states, vec![SectionState::Rejected]);
    let kinds = out.sink.outcomes.into_iter().map(|o| o.kind).collect();
    assert_eq!(
        rejections(kinds),
        vec![SectionRejection::QcMarkers {
            marker_rows: vec![layout::FIRST_WELL_ROW + 1 + 9]
        }]
    );
    assert_eq!(h.store.total_inserts(), 0);
}

#[tokio::test]
async fn marker_outside_the_window_is_ignored() {
    let h = Harness::new();
    let grid = healthy(day(5)).qc_marker(6).build();
    let out = h.run(&[grid]).await.unwrap();
    assert_eq!(out.states, vec![SectionState::Complete]);
}

#[tokio::test]
async fn rejected_section_does_not_stop_the_run() {
    let h = Harness::new();
    let bad = healthy(day(4)).qc_marker(7).build();
    let good = healthy(day(5)).build();
    let out = h.run(&[bad, good]).await.unwrap();

    assert_eq!(out.states, vec![SectionState::Rejected, SectionState::Complete]);
    assert_eq!(out.summary.sections_processed, 1);
    assert_eq!(out.summary.sections_rejected, 1);
    assert!(h.store.total_inserts() > 0);
}

#[tokio::test]
async fn native_date_cell_is_read_as_report_date() {
    let h = Harness::new();
    let grid = healthy(day(5)).header(layout::REPORT_DATE, midnight(day(5))).build();
    let out = h.run(&[grid]).await.unwrap();
    assert_eq!(out.states, vec![SectionState::Complete]);
    assert_eq!(out.summary.rows_accepted, 1);
}
