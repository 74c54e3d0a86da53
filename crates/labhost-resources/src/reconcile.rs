//! The existence-guarded action executor

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::report::{CheckReport, Outcome, RunReport};
use crate::traits::Resource;

/// Walk the resources in order, applying the ones whose predicate does
/// not hold.
///
/// A failed check or apply is recorded and the run continues: later
/// resources are typically independent of earlier ones, and side effects
/// already performed are not rolled back. `on_check` is invoked after
/// each resource so callers can print progress as it happens.
#[instrument(skip_all, fields(resources = resources.len()))]
pub async fn reconcile(
    resources: &[Arc<dyn Resource>],
    mut on_check: impl FnMut(&CheckReport),
) -> RunReport {
    let mut report = RunReport::new();

    for resource in resources {
        let id = resource.id();

        let outcome = match resource.is_satisfied().await {
            Ok(true) => {
                info!(resource = %id, "already satisfied");
                Outcome::AlreadySatisfied
            }
            Ok(false) => match resource.apply().await {
                Ok(()) => {
                    info!(resource = %id, "applied");
                    Outcome::Applied
                }
                Err(e) => {
                    warn!(resource = %id, error = %e, "apply failed, continuing");
                    Outcome::Failed(e.to_string())
                }
            },
            Err(e) => {
                warn!(resource = %id, error = %e, "state check failed, continuing");
                Outcome::Failed(format!("state check failed: {e}"))
            }
        };

        let check = CheckReport {
            id,
            outcome,
        };
        on_check(&check);
        report.checks.push(check);
    }

    report
}
