//! Structured per-row and per-section outcomes.
//!
//! The driver reports what happened; sinks decide what to do with it.

use dpr_extract::ExtractError;
use dpr_reconcile::{DateId, Decision, FactStream, SnapshotKey};
use dpr_validate::{Advisory, SectionRejection, Violation};

/// Where an outcome happened.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub file: String,
    /// `field/platform` label of the section, once known.
    pub section: Option<String>,
    /// 0-based sheet row.
    pub row: Option<usize>,
    pub well: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeKind {
    /// The source file could not be read.
    FileUnreadable(String),
    SectionRejected(SectionRejection),
    SectionCompleted,
    /// The row could not be attributed to a well.
    RowFailed(ExtractError),
    /// The row broke at least one business rule; nothing was reconciled.
    RowRejected(Vec<Violation>),
    RowAccepted,
    Reconciled {
        stream: FactStream,
        key: SnapshotKey,
        date: DateId,
        decision: Decision,
    },
    /// Flow meter readings required but missing; no flowmeter snapshot.
    FlowmeterIncomplete {
        platform: String,
        missing: Vec<&'static str>,
    },
    /// Metered platform with no reference-data match.
    FlowmeterUnknownPlatform { platform: String },
    Advisory(Advisory),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub at: Location,
    pub kind: OutcomeKind,
}

impl Outcome {
    pub fn new(at: Location, kind: OutcomeKind) -> Self {
        Self { at, kind }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self.kind,
            OutcomeKind::FileUnreadable(_)
                | OutcomeKind::SectionRejected(_)
                | OutcomeKind::RowFailed(_)
                | OutcomeKind::RowRejected(_)
                | OutcomeKind::FlowmeterIncomplete { .. }
                | OutcomeKind::FlowmeterUnknownPlatform { .. }
        )
    }

    /// Insert decisions only.
    pub fn inserted(&self) -> Option<FactStream> {
        match &self.kind {
            OutcomeKind::Reconciled {
                stream,
                decision: Decision::Inserted,
                ..
            } => Some(*stream),
            _ => None,
        }
    }
}

/// Receives every outcome of a run, in order.
pub trait OutcomeSink {
    fn record(&mut self, outcome: Outcome);
}

/// Keeps outcomes in memory.
#[derive(Debug, Default)]
pub struct VecSink {
    pub outcomes: Vec<Outcome>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.is_error())
    }

    pub fn advisories(&self) -> impl Iterator<Item = &Advisory> {
        self.outcomes.iter().filter_map(|o| match &o.kind {
            OutcomeKind::Advisory(a) => Some(a),
            _ => None,
        })
    }

    /// Decisions taken for one stream, in order.
    pub fn decisions(&self, stream: FactStream) -> Vec<Decision> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.kind {
                OutcomeKind::Reconciled {
                    stream: s, decision, ..
                } if *s == stream => Some(*decision),
                _ => None,
            })
            .collect()
    }
}

impl OutcomeSink for VecSink {
    fn record(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }
}

/// Discards outcomes; the run summary and logs still see them.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OutcomeSink for NullSink {
    fn record(&mut self, _outcome: Outcome) {}
}
