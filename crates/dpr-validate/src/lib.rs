//! dpr-validate
//!
//! Validation Rule Set for well rows, the section-level QC pre-scan, and the
//! non-blocking advisory checks.
//!
//! Architectural decisions:
//! - Every rule is evaluated; all violations are surfaced together
//! - Any violation rejects the whole row (no partial reconciliation)
//! - QC markers below the sentinel reject the whole section
//! - Advisories never change an insert decision
//!
//! Deterministic, pure logic. No IO.

mod advisory;
mod prescan;
mod rules;

pub use advisory::{
    check_flowmeter, stale_test_advisory, unchanged_readings_advisory, Advisory, FlowmeterCheck,
    PreviousReadings,
};
pub use prescan::{pre_scan, SectionRejection};
pub use rules::{validate, Violation};
