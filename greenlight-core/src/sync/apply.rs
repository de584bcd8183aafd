use std::fmt;

use tracing::{error, info};

use super::diff_kind::DiffKind;
use super::plan::SyncPlan;
use crate::client::CalendarClient;
use crate::error::GreenlightError;
use crate::event::CalendarEvent;

/// A calendar call that failed while applying a plan.
#[derive(Debug, Clone)]
pub struct FailedOperation {
    pub kind: DiffKind,
    /// The showing or event the call concerned.
    pub label: String,
    pub error: String,
}

impl fmt::Display for FailedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not {} {}: {}", self.kind.verb(), self.label, self.error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Success,
    PartialFailure,
    Failure,
}

#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub created: Vec<CalendarEvent>,
    pub updated: usize,
    pub deleted: usize,
    pub failures: Vec<FailedOperation>,
}

impl SyncReport {
    pub fn succeeded(&self) -> usize {
        self.created.len() + self.updated + self.deleted
    }

    pub fn status(&self) -> SyncStatus {
        if self.failures.is_empty() {
            SyncStatus::Success
        } else if self.succeeded() == 0 {
            SyncStatus::Failure
        } else {
            SyncStatus::PartialFailure
        }
    }

    fn fail(&mut self, kind: DiffKind, label: String, err: GreenlightError) {
        error!(operation = kind.verb(), item = %label, error = %err, "Calendar call failed");
        self.failures.push(FailedOperation {
            kind,
            label,
            error: err.to_string(),
        });
    }
}

/// Apply a plan: creates, then updates, then deletes.
///
/// A failed call is recorded and the remaining calls still run.
pub async fn apply(client: &dyn CalendarClient, calendar_id: &str, plan: &SyncPlan) -> SyncReport {
    let mut report = SyncReport::default();

    for showing in &plan.to_create {
        let event = showing.to_event();
        match client.create_event(calendar_id, &event).await {
            Ok(created) => {
                info!(showing = %showing, "Created event");
                report.created.push(created);
            }
            Err(e) => report.fail(DiffKind::Create, showing.to_string(), e),
        }
    }

    for update in &plan.to_update {
        let event = update.event();
        match client.update_event(calendar_id, &event).await {
            Ok(_) => {
                info!(showing = %update.showing, "Updated event");
                report.updated += 1;
            }
            Err(e) => report.fail(DiffKind::Update, update.showing.to_string(), e),
        }
    }

    for event in &plan.to_delete {
        let Some(event_id) = event.id.as_deref() else {
            report.fail(
                DiffKind::Delete,
                event.to_string(),
                GreenlightError::api("delete event", "event has no id"),
            );
            continue;
        };
        match client.delete_event(calendar_id, event_id).await {
            Ok(()) => {
                info!(event = %event, "Deleted event");
                report.deleted += 1;
            }
            Err(e) => report.fail(DiffKind::Delete, event.to_string(), e),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientCall, MemoryCalendar};
    use crate::sync::fixtures::{showing, stored};
    use crate::sync::plan::DiffOptions;

    #[tokio::test]
    async fn failed_update_does_not_stop_the_rest() {
        let a = showing("Alien", "2026-03-01T19:00:00-05:00", "2026-03-01T21:00:00-05:00");
        let b = showing("Brazil", "2026-03-02T19:00:00-05:00", "2026-03-02T21:00:00-05:00");
        let c = showing("Cure", "2026-03-03T19:00:00-05:00", "2026-03-03T21:00:00-05:00");
        let calendar =
            MemoryCalendar::with_events(vec![stored("ev-b", &b), stored("ev-c", &c)])
                .with_failing_event("ev-b");

        let b2 = showing("Brazil", "2026-03-02T19:00:00-05:00", "2026-03-02T21:30:00-05:00");
        let existing = calendar.events();
        let plan = SyncPlan::compute(&[a, b2], &existing, &DiffOptions::default());
        let report = apply(&calendar, "cal", &plan).await;

        assert_eq!(report.status(), SyncStatus::PartialFailure);
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.deleted, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, DiffKind::Update);
        assert!(report.failures[0].label.contains("Brazil"));

        assert_eq!(
            calendar.calls(),
            vec![
                ClientCall::CreateEvent("Alien @ Green Light Cinema".into()),
                ClientCall::UpdateEvent("ev-b".into()),
                ClientCall::DeleteEvent("ev-c".into()),
            ]
        );
    }

    #[tokio::test]
    async fn every_call_failing_is_a_failure() {
        let a = showing("Alien", "2026-03-01T19:00:00-05:00", "2026-03-01T21:00:00-05:00");
        let calendar = MemoryCalendar::new().with_failing_event(a.source_identity.clone());
        let plan = SyncPlan::compute(std::slice::from_ref(&a), &[], &DiffOptions::default());
        let report = apply(&calendar, "cal", &plan).await;
        assert_eq!(report.status(), SyncStatus::Failure);
        assert!(calendar.events().is_empty());
    }

    #[tokio::test]
    async fn empty_plan_is_a_success() {
        let calendar = MemoryCalendar::new();
        let report = apply(&calendar, "cal", &SyncPlan::default()).await;
        assert_eq!(report.status(), SyncStatus::Success);
        assert!(calendar.calls().is_empty());
    }
}
