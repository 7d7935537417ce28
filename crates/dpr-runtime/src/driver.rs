//! Report Driver: one sheet section from header to field comment.
//!
//! LOCATE_CONTEXT -> VALIDATE_SECTION -> PROCESS_ROWS -> COMPLETE, with an
//! early exit to REJECTED from the first two states. Row failures stay local
//! to the row. A `StoreFault` aborts the run and is returned to the caller.

use std::fmt;

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, error, info, warn};

use dpr_config::EngineConfig;
use dpr_extract::{well_rows, Cell, Extractor, Grid, ReferenceData, RowContext, SectionContext};
use dpr_reconcile::{
    append_if_absent, is_yesterday, reconcile, Attributes, Candidate, DateId, DateIdResolver, Decision,
    FactStream, SnapshotStore, StoreFault,
};
use dpr_validate::{
    check_flowmeter, pre_scan, stale_test_advisory, unchanged_readings_advisory, validate, FlowmeterCheck,
    PreviousReadings, SectionRejection, Violation,
};

use crate::candidates::{self, TestDateIds};
use crate::outcome::{Location, Outcome, OutcomeKind, OutcomeSink};
use crate::source::{SheetFile, SourceError};
use crate::summary::RunSummary;

/// Section states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionState {
    LocateContext,
    ValidateSection,
    ProcessRows,
    Complete,
    Rejected,
}

impl fmt::Display for SectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SectionState::LocateContext => "LOCATE_CONTEXT",
            SectionState::ValidateSection => "VALIDATE_SECTION",
            SectionState::ProcessRows => "PROCESS_ROWS",
            SectionState::Complete => "COMPLETE",
            SectionState::Rejected => "REJECTED",
        })
    }
}

/// A section whose context resolved.
struct Located {
    section: SectionContext,
    report: DateId,
}

/// Drives sheets through extraction, validation and reconciliation.
///
/// Sheets must be fed in report-date order: reconciliation only ever reads
/// the latest earlier snapshot, so backfilled dates are not reconciled
/// correctly.
pub struct ReportDriver<'a, S: ?Sized, D: ?Sized> {
    cfg: &'a EngineConfig,
    extractor: Extractor<'a>,
    store: &'a S,
    dates: &'a D,
    summary: RunSummary,
}

impl<'a, S, D> ReportDriver<'a, S, D>
where
    S: SnapshotStore + ?Sized,
    D: DateIdResolver + ?Sized,
{
    pub fn new(cfg: &'a EngineConfig, reference: &'a ReferenceData, tz: Tz, store: &'a S, dates: &'a D) -> Self {
        Self {
            cfg,
            extractor: Extractor::new(reference, cfg, tz),
            store,
            dates,
            summary: RunSummary::new(),
        }
    }

    pub fn with_summary(mut self, summary: RunSummary) -> Self {
        self.summary = summary;
        self
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn finish(self) -> RunSummary {
        self.summary
    }

    /// Process every sheet a source yields. Unreadable files are reported
    /// and skipped.
    pub async fn process_files<I>(&mut self, files: I, sink: &mut dyn OutcomeSink) -> Result<(), StoreFault>
    where
        I: IntoIterator<Item = Result<SheetFile, SourceError>>,
    {
        for file in files {
            match file {
                Ok(sheet) => {
                    self.process_sheet(&sheet.name(), &sheet.grid, sink).await?;
                }
                Err(e) => {
                    let at = Location {
                        file: source_path(&e),
                        ..Location::default()
                    };
                    self.summary.files += 1;
                    self.emit(sink, Outcome::new(at, OutcomeKind::FileUnreadable(e.to_string())));
                }
            }
        }
        Ok(())
    }

    /// Process one sheet section. Returns the terminal state.
    pub async fn process_sheet(
        &mut self,
        file: &str,
        grid: &Grid,
        sink: &mut dyn OutcomeSink,
    ) -> Result<SectionState, StoreFault> {
        self.summary.files += 1;
        let mut at = Location {
            file: file.to_string(),
            ..Location::default()
        };
        info!(file, "parsing");

        // LOCATE_CONTEXT
        let located = match self.locate(grid).await? {
            Ok(l) => l,
            Err(rejection) => return Ok(self.reject(sink, at, SectionState::LocateContext, rejection)),
        };
        at.section = Some(located.section.label());
        self.transition(&at, SectionState::ValidateSection);

        // VALIDATE_SECTION
        if let Err(rejection) = pre_scan(grid, located.section.sentinel_row) {
            return Ok(self.reject(sink, at, SectionState::ValidateSection, rejection));
        }
        self.transition(&at, SectionState::ProcessRows);

        // PROCESS_ROWS
        self.reconcile_flowmeter(grid, &located, &at, sink).await?;
        let mut last_row: Option<RowContext> = None;
        for idx in well_rows(grid, &located.section) {
            let row = grid.row(idx);
            let row_at = Location {
                row: Some(idx),
                ..at.clone()
            };
            if let Some(ctx) = self.process_row(&located, row, idx, row_at, sink).await? {
                last_row = Some(ctx);
            }
        }
        self.transition(&at, SectionState::Complete);

        // COMPLETE
        if let Some(comment) = self.extractor.field_comment(grid, &located.section, last_row.as_ref()) {
            let c = candidates::field_comment(&comment, located.report);
            self.reconcile_one(&c, &at, sink).await?;
        }
        self.emit(sink, Outcome::new(at, OutcomeKind::SectionCompleted));
        Ok(SectionState::Complete)
    }

    // -----------------------------------------------------------------------
    // States
    // -----------------------------------------------------------------------

    async fn locate(&self, grid: &Grid) -> Result<Result<Located, SectionRejection>, StoreFault> {
        let section = match self.extractor.locate_section(grid) {
            Ok(s) => s,
            Err(e) => return Ok(Err(e.into())),
        };
        match self.dates.date_id(section.report_date).await? {
            Some(report) => Ok(Ok(Located { section, report })),
            None => Ok(Err(SectionRejection::ReportDateNotRegistered(section.report_date))),
        }
    }

    fn transition(&self, at: &Location, to: SectionState) {
        debug!(file = %at.file, section = at.section.as_deref().unwrap_or(""), state = %to, "section state");
    }

    fn reject(
        &mut self,
        sink: &mut dyn OutcomeSink,
        at: Location,
        from: SectionState,
        rejection: SectionRejection,
    ) -> SectionState {
        debug!(file = %at.file, from = %from, "section rejected");
        self.emit(sink, Outcome::new(at, OutcomeKind::SectionRejected(rejection)));
        SectionState::Rejected
    }

    async fn reconcile_flowmeter(
        &mut self,
        grid: &Grid,
        located: &Located,
        at: &Location,
        sink: &mut dyn OutcomeSink,
    ) -> Result<(), StoreFault> {
        let Some(rec) = self.extractor.platform_record(grid, &located.section) else {
            return Ok(());
        };
        let check = check_flowmeter(located.section.field_id, &rec, &self.cfg.rules, &self.cfg.flowmeter);
        let platform_id = match (check, rec.platform_id) {
            (FlowmeterCheck::NotApplicable, _) => return Ok(()),
            (FlowmeterCheck::Ready, Some(id)) => id,
            (FlowmeterCheck::UnknownPlatform, _) | (FlowmeterCheck::Ready, None) => {
                let kind = OutcomeKind::FlowmeterUnknownPlatform {
                    platform: rec.platform.clone(),
                };
                self.emit(sink, Outcome::new(at.clone(), kind));
                return Ok(());
            }
            (FlowmeterCheck::MissingReadings(missing), _) => {
                let kind = OutcomeKind::FlowmeterIncomplete {
                    platform: rec.platform.clone(),
                    missing,
                };
                self.emit(sink, Outcome::new(at.clone(), kind));
                return Ok(());
            }
        };

        let candidate = candidates::flowmeter(&rec, platform_id, located.report);
        let prev = self
            .store
            .latest_before(FactStream::Flowmeters, &candidate.key, located.report)
            .await?;
        let decision = append_if_absent(self.store, &candidate).await?;
        self.emit(sink, reconciled(at.clone(), &candidate, decision));
        if !decision.inserted() {
            return Ok(());
        }

        let prev = prev.map(|snap| previous_readings(located.report, &snap.date, &snap.attrs));
        if let Some(a) = unchanged_readings_advisory(&rec, prev.as_ref(), &self.cfg.flowmeter) {
            self.emit(sink, Outcome::new(at.clone(), OutcomeKind::Advisory(a)));
        }
        Ok(())
    }

    /// Extract, validate and reconcile one well row. Returns the row context
    /// when the row was attributed to a well.
    async fn process_row(
        &mut self,
        located: &Located,
        row: &[Cell],
        idx: usize,
        mut at: Location,
        sink: &mut dyn OutcomeSink,
    ) -> Result<Option<RowContext>, StoreFault> {
        let ctx = match self.extractor.resolve_row(&located.section, row, idx) {
            Ok(ctx) => ctx,
            Err(e) => {
                self.emit(sink, Outcome::new(at, OutcomeKind::RowFailed(e)));
                return Ok(None);
            }
        };
        at.well = Some(ctx.well_number.clone());
        let rec = self.extractor.well_record(&located.section, ctx.clone(), row);

        let mut violations = validate(&rec, &self.cfg.rules);
        let ids = match rec.test_dates() {
            Some(dates) => {
                let well_test = self.date_id("well test date", dates.well_test, &mut violations).await?;
                let gas_test = self.date_id("gas test date", dates.gas_test, &mut violations).await?;
                let lab = self.date_id("lab date", dates.lab, &mut violations).await?;
                match (well_test, gas_test, lab) {
                    (Some(well_test), Some(gas_test), Some(lab)) => Some(TestDateIds {
                        well_test,
                        gas_test,
                        lab,
                    }),
                    _ => None,
                }
            }
            None => None,
        };

        let ids = match ids {
            Some(ids) if violations.is_empty() => ids,
            _ => {
                self.emit(sink, Outcome::new(at, OutcomeKind::RowRejected(violations)));
                return Ok(Some(ctx));
            }
        };

        let report = located.report;
        let ordered = [
            candidates::stock(&rec, report, self.cfg),
            candidates::completion(&rec, report),
            candidates::downtime(&rec, report),
            candidates::parameters(&rec, report),
            candidates::well_test(&rec, report, ids.well_test),
            candidates::gas_test(&rec, report, ids.gas_key(ctx.field_id, &self.cfg.rules)),
            candidates::lab(&rec, report, ids.lab),
        ];
        for c in &ordered {
            self.reconcile_one(c, &at, sink).await?;
        }

        if let Some(a) = stale_test_advisory(&rec, &self.cfg.rules) {
            self.emit(sink, Outcome::new(at.clone(), OutcomeKind::Advisory(a)));
        }
        self.emit(sink, Outcome::new(at, OutcomeKind::RowAccepted));
        Ok(Some(ctx))
    }

    async fn date_id(
        &self,
        which: &'static str,
        date: NaiveDate,
        violations: &mut Vec<Violation>,
    ) -> Result<Option<DateId>, StoreFault> {
        let id = self.dates.date_id(date).await?;
        if id.is_none() {
            violations.push(Violation::DateNotRegistered { which, date });
        }
        Ok(id)
    }

    async fn reconcile_one(
        &mut self,
        c: &Candidate,
        at: &Location,
        sink: &mut dyn OutcomeSink,
    ) -> Result<(), StoreFault> {
        let decision = reconcile(self.store, c).await?;
        self.emit(sink, reconciled(at.clone(), c, decision));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reporting
    // -----------------------------------------------------------------------

    fn emit(&mut self, sink: &mut dyn OutcomeSink, outcome: Outcome) {
        log_outcome(&outcome);
        self.summary.absorb(&outcome);
        sink.record(outcome);
    }
}

fn reconciled(at: Location, c: &Candidate, decision: Decision) -> Outcome {
    Outcome::new(
        at,
        OutcomeKind::Reconciled {
            stream: c.stream,
            key: c.key.clone(),
            date: c.date,
            decision,
        },
    )
}

fn previous_readings(today: DateId, prev_date: &DateId, attrs: &Attributes) -> PreviousReadings {
    PreviousReadings {
        is_yesterday: is_yesterday(today, *prev_date),
        reading2: attrs.get("reading2").as_f64(),
        reading4: attrs.get("reading4").as_f64(),
    }
}

fn source_path(e: &SourceError) -> String {
    match e {
        SourceError::Io { path, .. } | SourceError::Csv { path, .. } => path.display().to_string(),
    }
}

fn log_outcome(o: &Outcome) {
    let at = &o.at;
    let file = at.file.as_str();
    let section = at.section.as_deref().unwrap_or("");
    let row = at.row.map(|r| r + 1);
    let well = at.well.as_deref().unwrap_or("");

    match &o.kind {
        OutcomeKind::FileUnreadable(msg) => error!(file, "{msg}"),
        OutcomeKind::SectionRejected(r) => {
            error!(file, section, "{r}");
            error!(file, section, "data is not persisted into DB");
        }
        OutcomeKind::SectionCompleted => info!(file, section, "section complete"),
        OutcomeKind::RowFailed(e) => error!(file, section, row, "{e}"),
        OutcomeKind::RowRejected(violations) => {
            for v in violations {
                error!(file, section, row, well, rule = v.code(), "{v}");
            }
            error!(file, section, row, well, "row not persisted");
        }
        OutcomeKind::RowAccepted => debug!(file, section, row, well, "row reconciled"),
        OutcomeKind::Reconciled {
            stream,
            key,
            date,
            decision,
        } => {
            if decision.inserted() {
                info!(file, section, row, well, table = stream.table(), %key, date = date.0, "inserted");
            } else {
                debug!(file, section, row, well, table = stream.table(), %key, date = date.0, ?decision, "skipped");
            }
        }
        OutcomeKind::FlowmeterIncomplete { platform, missing } => {
            error!(file, section, platform = %platform, missing = %missing.join(","), "flowmeter readings missing")
        }
        OutcomeKind::FlowmeterUnknownPlatform { platform } => {
            error!(file, section, platform = %platform, "flowmeter platform not found")
        }
        OutcomeKind::Advisory(a) => warn!(file, section, row, well, "{a}"),
    }
}
