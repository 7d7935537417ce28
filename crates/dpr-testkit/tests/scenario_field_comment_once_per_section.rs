//! Scenario: General Comment Once Per Section
//!
//! # Invariant under test
//! The general comment under the well block is reconciled once per section,
//! keyed by field and platform, and only written when its text changes.

use dpr_reconcile::{Decision, FactStream};
use dpr_testkit::{day, Harness, SheetBuilder, WellLine, PLATFORM_8, PRIMARY_FIELD};

fn sheet(d: u32, comment: Option<&str>) -> dpr_extract::Grid {
    let mut b = SheetBuilder::new(PRIMARY_FIELD, PLATFORM_8, day(d))
        .well(WellLine::healthy(PLATFORM_8, "101", day(d)))
        .well(WellLine::healthy(PLATFORM_8, "102", day(d)));
    if let Some(text) = comment {
        b = b.comment(text);
    }
    b.build()
}

#[tokio::test]
async fn comment_is_written_when_it_changes() {
    let h = Harness::new();
    let out = h
        .run(&[
            sheet(4, Some("Compressor down")),
            sheet(5, Some("Compressor down")),
            sheet(6, Some("Compressor restarted")),
        ])
        .await
        .unwrap();

    assert_eq!(
        out.sink.decisions(FactStream::DailyGeneralComments),
        vec![Decision::Inserted, Decision::Unchanged, Decision::Inserted]
    );
}

#[tokio::test]
async fn comment_cleared_after_a_value_is_a_change() {
    let h = Harness::new();
    let out = h
        .run(&[sheet(4, Some("Compressor down")), sheet(5, None)])
        .await
        .unwrap();
    assert_eq!(
        out.sink.decisions(FactStream::DailyGeneralComments),
        vec![Decision::Inserted, Decision::Inserted]
    );
}

#[tokio::test]
async fn sheet_without_sentinel_has_no_comment_area() {
    let h = Harness::new();
    let grid = SheetBuilder::new(PRIMARY_FIELD, PLATFORM_8, day(5))
        .well(WellLine::healthy(PLATFORM_8, "101", day(5)))
        .comment("ignored")
        .without_sentinel()
        .build();

    let out = h.run(&[grid]).await.unwrap();
    assert_eq!(out.summary.rows_accepted, 1);
    assert!(out.sink.decisions(FactStream::DailyGeneralComments).is_empty());
}
