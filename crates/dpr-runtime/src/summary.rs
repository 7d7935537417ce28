use std::collections::BTreeMap;
use std::fmt;

use dpr_reconcile::FactStream;
use uuid::Uuid;

use crate::outcome::{Outcome, OutcomeKind};

/// Run-scoped tallies, accumulated from outcomes and returned at run end.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub files: u64,
    pub sections_processed: u64,
    pub sections_rejected: u64,
    pub rows_accepted: u64,
    pub rows_rejected: u64,
    /// Snapshots inserted.
    pub success: u64,
    /// Violations, failed rows, rejected sections and unreadable files.
    pub error: u64,
    pub warning: u64,
    /// Candidates that needed no insert.
    pub info: u64,
    pub inserted: BTreeMap<FactStream, u64>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::with_run_id(Uuid::new_v4())
    }

    pub fn with_run_id(run_id: Uuid) -> Self {
        Self {
            run_id,
            files: 0,
            sections_processed: 0,
            sections_rejected: 0,
            rows_accepted: 0,
            rows_rejected: 0,
            success: 0,
            error: 0,
            warning: 0,
            info: 0,
            inserted: FactStream::ALL.iter().map(|s| (*s, 0)).collect(),
        }
    }

    pub fn absorb(&mut self, outcome: &Outcome) {
        match &outcome.kind {
            OutcomeKind::FileUnreadable(_) => self.error += 1,
            OutcomeKind::SectionRejected(_) => {
                self.sections_rejected += 1;
                self.error += 1;
            }
            OutcomeKind::SectionCompleted => self.sections_processed += 1,
            OutcomeKind::RowFailed(_) => {
                self.rows_rejected += 1;
                self.error += 1;
            }
            OutcomeKind::RowRejected(violations) => {
                self.rows_rejected += 1;
                self.error += violations.len().max(1) as u64;
            }
            OutcomeKind::RowAccepted => self.rows_accepted += 1,
            OutcomeKind::Reconciled { stream, decision, .. } => {
                if decision.inserted() {
                    self.success += 1;
                    *self.inserted.entry(*stream).or_default() += 1;
                } else {
                    self.info += 1;
                }
            }
            OutcomeKind::FlowmeterIncomplete { .. } | OutcomeKind::FlowmeterUnknownPlatform { .. } => {
                self.error += 1
            }
            OutcomeKind::Advisory(_) => self.warning += 1,
        }
    }

    pub fn inserted_into(&self, stream: FactStream) -> u64 {
        self.inserted.get(&stream).copied().unwrap_or(0)
    }

    pub fn total_inserted(&self) -> u64 {
        self.inserted.values().sum()
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "run {}", self.run_id)?;
        writeln!(
            f,
            "files={} sections={} rejected_sections={} rows={} rejected_rows={}",
            self.files, self.sections_processed, self.sections_rejected, self.rows_accepted, self.rows_rejected
        )?;
        writeln!(
            f,
            "success={} error={} warning={} info={}",
            self.success, self.error, self.warning, self.info
        )?;
        for (stream, n) in &self.inserted {
            writeln!(f, "  {:<24} {n}", stream.table())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Location;
    use dpr_reconcile::{DateId, Decision, SnapshotKey};

    fn reconciled(stream: FactStream, decision: Decision) -> Outcome {
        Outcome::new(
            Location::default(),
            OutcomeKind::Reconciled {
                stream,
                key: SnapshotKey::Well(1),
                date: DateId(1),
                decision,
            },
        )
    }

    #[test]
    fn inserts_count_per_stream_and_skips_count_as_info() {
        let mut s = RunSummary::new();
        s.absorb(&reconciled(FactStream::WellStock, Decision::Inserted));
        s.absorb(&reconciled(FactStream::WellStock, Decision::Unchanged));
        s.absorb(&reconciled(FactStream::WellTests, Decision::AlreadyPresent));
        s.absorb(&reconciled(FactStream::Flowmeters, Decision::Inserted));

        assert_eq!(s.success, 2);
        assert_eq!(s.info, 2);
        assert_eq!(s.inserted_into(FactStream::WellStock), 1);
        assert_eq!(s.inserted_into(FactStream::WellTests), 0);
        assert_eq!(s.total_inserted(), 2);
    }

    #[test]
    fn display_lists_every_stream() {
        let s = RunSummary::new();
        let text = s.to_string();
        for stream in FactStream::ALL {
            assert!(text.contains(stream.table()), "{stream}");
        }
    }
}
