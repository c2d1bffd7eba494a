// Pipeline: corpus snapshot, seed import, and the full report run.

pub mod import;
pub mod report;
pub mod snapshot;

pub use report::{build_report, AnalysisReport, ReportOptions};
pub use snapshot::Snapshot;
