//! Diff computation between scraped showings and calendar events.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::event::CalendarEvent;
use crate::showing::ShowingRecord;

#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    /// Events starting before this instant are never updated or deleted,
    /// and showings starting before it are never created.
    pub not_before: Option<DateTime<Utc>>,
}

impl DiffOptions {
    fn is_protected(&self, event: &CalendarEvent) -> bool {
        self.not_before
            .is_some_and(|limit| event.start.with_timezone(&Utc) < limit)
    }

    fn has_started(&self, showing: &ShowingRecord) -> bool {
        self.not_before
            .is_some_and(|limit| showing.start_time.with_timezone(&Utc) < limit)
    }
}

/// A managed event whose visible fields no longer match its showing.
#[derive(Debug, Clone)]
pub struct EventUpdate {
    pub existing: CalendarEvent,
    pub showing: ShowingRecord,
}

impl EventUpdate {
    /// The replacement event, keeping the existing event's id.
    pub fn event(&self) -> CalendarEvent {
        let mut event = self.showing.to_event();
        event.id = self.existing.id.clone();
        event.html_link = self.existing.html_link.clone();
        event
    }

    pub fn changed_fields(&self) -> Vec<&'static str> {
        self.existing.changed_fields(&self.showing.to_event())
    }
}

/// What has to change on the calendar to match the scraped showings.
#[derive(Debug, Clone, Default)]
pub struct SyncPlan {
    pub to_create: Vec<ShowingRecord>,
    pub to_update: Vec<EventUpdate>,
    pub to_delete: Vec<CalendarEvent>,
    /// Showings already matching their event, or left alone because of
    /// [`DiffOptions::not_before`].
    pub unchanged: usize,
}

impl SyncPlan {
    pub fn compute(
        showings: &[ShowingRecord],
        existing: &[CalendarEvent],
        options: &DiffOptions,
    ) -> Self {
        let mut plan = SyncPlan::default();

        // Events without the managed marker never take part.
        let mut managed: HashMap<&str, &CalendarEvent> = HashMap::new();
        for event in existing {
            let Some(identity) = event.managed_identity() else {
                continue;
            };
            if managed.contains_key(identity) {
                // Left behind by an interrupted run
                if !options.is_protected(event) {
                    debug!(event = %event, "Duplicate managed event");
                    plan.to_delete.push(event.clone());
                }
                continue;
            }
            managed.insert(identity, event);
        }

        let mut wanted: HashSet<&str> = HashSet::new();
        for showing in showings {
            let identity = showing.source_identity.as_str();
            if !wanted.insert(identity) {
                warn!(showing = %showing, "Ignoring duplicate showing");
                continue;
            }

            match managed.get(identity) {
                // Ended events fall outside the listing window.
                None if options.has_started(showing) => plan.unchanged += 1,
                None => plan.to_create.push(showing.clone()),
                Some(event) if options.is_protected(event) => plan.unchanged += 1,
                Some(event) if event.same_content(&showing.to_event()) => plan.unchanged += 1,
                Some(event) => plan.to_update.push(EventUpdate {
                    existing: (*event).clone(),
                    showing: showing.clone(),
                }),
            }
        }

        // Walk `existing` rather than the map to keep the calendar's order.
        for event in existing {
            let Some(identity) = event.managed_identity() else {
                continue;
            };
            let is_first = managed
                .get(identity)
                .is_some_and(|first| std::ptr::eq(*first, event));
            if is_first && !wanted.contains(identity) && !options.is_protected(event) {
                plan.to_delete.push(event.clone());
            }
        }

        plan.to_create.sort_by_key(|s| s.start_time);
        plan.to_update.sort_by_key(|u| u.showing.start_time);
        plan.to_delete.sort_by_key(|e| e.start);

        plan
    }

    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    /// Number of calendar calls applying this plan takes.
    pub fn len(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.to_delete.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::fixtures::{at, personal, showing, stored};

    #[test]
    fn creates_updates_and_deletes() {
        let a = showing("Alien", "2026-03-01T19:00:00-05:00", "2026-03-01T21:00:00-05:00");
        let b = showing("Brazil", "2026-03-02T19:00:00-05:00", "2026-03-02T21:00:00-05:00");
        let c = showing("Cure", "2026-03-03T19:00:00-05:00", "2026-03-03T21:00:00-05:00");
        let existing = vec![stored("ev-a", &a), stored("ev-b", &b), stored("ev-c", &c)];

        // Brazil now runs longer, Cure is gone, Dune is new
        let b2 = showing("Brazil", "2026-03-02T19:00:00-05:00", "2026-03-02T21:22:00-05:00");
        let d = showing("Dune", "2026-03-04T19:00:00-05:00", "2026-03-04T21:35:00-05:00");

        let plan = SyncPlan::compute(&[a, b2.clone(), d.clone()], &existing, &DiffOptions::default());

        assert_eq!(plan.to_create, vec![d]);
        assert_eq!(plan.to_update.len(), 1);
        assert_eq!(plan.to_update[0].existing.id.as_deref(), Some("ev-b"));
        assert_eq!(plan.to_update[0].event().end, b2.end_time);
        assert_eq!(plan.to_update[0].changed_fields(), vec!["end"]);
        assert_eq!(plan.to_delete.len(), 1);
        assert_eq!(plan.to_delete[0].id.as_deref(), Some("ev-c"));
        assert_eq!(plan.unchanged, 1);
    }

    #[test]
    fn identical_state_is_empty() {
        let a = showing("Alien", "2026-03-01T19:00:00-05:00", "2026-03-01T21:00:00-05:00");
        let plan = SyncPlan::compute(
            std::slice::from_ref(&a),
            &[stored("ev-a", &a)],
            &DiffOptions::default(),
        );
        assert!(plan.is_empty());
        assert_eq!(plan.unchanged, 1);
    }

    #[test]
    fn unmanaged_events_are_never_deleted() {
        let birthday = personal("p1", "Birthday", "2026-03-01T18:00:00-05:00", "2026-03-01T23:00:00-05:00");
        let mut imposter = personal("p2", "Alien", "2026-03-01T19:00:00-05:00", "2026-03-01T21:00:00-05:00");
        // Carries an identity tag but not the managed marker
        imposter.identity = Some("whatever".into());

        let plan = SyncPlan::compute(&[], &[birthday, imposter], &DiffOptions::default());
        assert!(plan.is_empty());
    }

    #[test]
    fn duplicate_managed_events_keep_the_first() {
        let a = showing("Alien", "2026-03-01T19:00:00-05:00", "2026-03-01T21:00:00-05:00");
        let existing = vec![stored("ev-1", &a), stored("ev-2", &a)];
        let plan = SyncPlan::compute(std::slice::from_ref(&a), &existing, &DiffOptions::default());
        assert!(plan.to_create.is_empty());
        assert_eq!(plan.to_delete.len(), 1);
        assert_eq!(plan.to_delete[0].id.as_deref(), Some("ev-2"));
    }

    #[test]
    fn duplicate_showings_keep_the_first() {
        let a = showing("Alien", "2026-03-01T19:00:00-05:00", "2026-03-01T21:00:00-05:00");
        let plan = SyncPlan::compute(&[a.clone(), a], &[], &DiffOptions::default());
        assert_eq!(plan.to_create.len(), 1);
    }

    #[test]
    fn started_events_are_protected() {
        let past = showing("Alien", "2026-03-01T19:00:00-05:00", "2026-03-01T21:00:00-05:00");
        let gone = showing("Brazil", "2026-03-01T12:00:00-05:00", "2026-03-01T14:00:00-05:00");
        let mut moved = past.clone();
        moved.end_time = at("2026-03-01T22:00:00-05:00");

        let options = DiffOptions {
            not_before: Some(at("2026-03-01T20:00:00-05:00").with_timezone(&Utc)),
        };
        let existing = vec![stored("ev-a", &past), stored("ev-b", &gone)];
        let plan = SyncPlan::compute(&[moved], &existing, &options);

        assert!(plan.is_empty());
        assert_eq!(plan.unchanged, 1);
    }

    #[test]
    fn started_showings_are_not_recreated() {
        let ended = showing("Alien", "2026-03-01T19:00:00-05:00", "2026-03-01T21:00:00-05:00");
        let upcoming = showing("Brazil", "2026-03-02T19:00:00-05:00", "2026-03-02T21:00:00-05:00");

        let options = DiffOptions {
            not_before: Some(at("2026-03-01T22:00:00-05:00").with_timezone(&Utc)),
        };
        let plan = SyncPlan::compute(&[ended, upcoming.clone()], &[], &options);

        assert_eq!(plan.to_create, vec![upcoming]);
        assert_eq!(plan.unchanged, 1);
    }
}
