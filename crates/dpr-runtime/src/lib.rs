//! dpr-runtime
//!
//! Report Driver and its run plumbing: candidate building, outcomes, the run
//! summary, and the CSV sheet source.
//!
//! Architectural decisions:
//! - The driver owns the run summary; counters are never module state
//! - Every outcome goes through one emit point that logs, counts and forwards
//! - Store and date resolver are injected; the driver never names Postgres
//! - One sheet, one row, one stream at a time, in a fixed order

pub mod candidates;
mod driver;
mod outcome;
mod source;
mod summary;

pub use driver::{ReportDriver, SectionState};
pub use outcome::{Location, NullSink, Outcome, OutcomeKind, OutcomeSink, VecSink};
pub use source::{discover_csv, load_csv_grid, parse_csv_grid, CsvDirSource, SheetFile, SourceError};
pub use summary::RunSummary;
