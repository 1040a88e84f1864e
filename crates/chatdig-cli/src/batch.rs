//! Sequential export of several databases.

use chatdig_export::{ExportSettings, ExportSummary, export_database};
use chatdig_store::RecordSource;
use chatdig_types::ChatdigError;

/// What happened to each database of a run.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub exported: Vec<ExportSummary>,
    pub failed: Vec<(String, ChatdigError)>,
}

impl BatchOutcome {
    pub fn failed_names(&self) -> Vec<&str> {
        self.failed.iter().map(|(name, _)| name.as_str()).collect()
    }
}

/// Export `targets` one after another.
///
/// Each database gets its own reconciliation state. A failure is logged and
/// the run moves on, unless `fail_fast` is set, in which case nothing after
/// the failing database is attempted.
pub fn run(
    source: &dyn RecordSource,
    targets: &[String],
    settings: &ExportSettings,
    fail_fast: bool,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for db in targets {
        match export_database(source, db, settings) {
            Ok(summary) => {
                tracing::info!(
                    db = %summary.db_name,
                    records = summary.record_count,
                    "export complete"
                );
                outcome.exported.push(summary);
            }
            Err(e) => {
                tracing::error!(db = %db, "export failed: {e}");
                outcome.failed.push((db.clone(), e.into()));
                if fail_fast {
                    break;
                }
            }
        }
    }
    outcome
}
