//! Colored terminal rendering for sync plans and reports.

use greenlight_core::extract::ParseIssue;
use greenlight_core::sync::{DiffKind, SyncPlan, SyncReport, SyncStatus};
use owo_colors::OwoColorize;

/// Above this many changes of one kind, show a count instead of each event.
const COMPACT_THRESHOLD: usize = 12;

const TIME_FORMAT: &str = "%a %b %d %H:%M";

pub trait Render {
    fn render(&self) -> String;
}

impl Render for DiffKind {
    fn render(&self) -> String {
        let symbol = self.to_string();
        match self {
            DiffKind::Create => symbol.green().to_string(),
            DiffKind::Update => symbol.yellow().to_string(),
            DiffKind::Delete => symbol.red().to_string(),
        }
    }
}

fn colorize(kind: DiffKind, text: &str) -> String {
    match kind {
        DiffKind::Create => text.green().to_string(),
        DiffKind::Update => text.yellow().to_string(),
        DiffKind::Delete => text.red().to_string(),
    }
}

fn pluralize(count: usize) -> &'static str {
    if count == 1 { "event" } else { "events" }
}

struct Line {
    kind: DiffKind,
    title: String,
    time: String,
    detail: Option<String>,
}

fn render_lines(kind: DiffKind, lines: &[Line], verbose: bool, out: &mut Vec<String>) {
    if lines.is_empty() {
        return;
    }
    if !verbose && lines.len() > COMPACT_THRESHOLD {
        let label = match kind {
            DiffKind::Create => format!("({} new {})", lines.len(), pluralize(lines.len())),
            DiffKind::Update => format!("({} changed {})", lines.len(), pluralize(lines.len())),
            DiffKind::Delete => format!("({} removed {})", lines.len(), pluralize(lines.len())),
        };
        out.push(format!("   {} {}", kind.render(), colorize(kind, &label)));
        return;
    }
    for line in lines {
        out.push(format!(
            "   {} {} {}",
            line.kind.render(),
            colorize(line.kind, &line.title),
            line.time.dimmed()
        ));
        if let Some(detail) = &line.detail {
            out.push(format!("      {}", detail.dimmed()));
        }
    }
}

pub fn render_plan(plan: &SyncPlan, verbose: bool) -> String {
    if plan.is_empty() {
        return format!("   No changes ({} up to date)", plan.unchanged)
            .dimmed()
            .to_string();
    }

    let creates: Vec<Line> = plan
        .to_create
        .iter()
        .map(|s| Line {
            kind: DiffKind::Create,
            title: s.film_title.clone(),
            time: s.start_time.format(TIME_FORMAT).to_string(),
            detail: None,
        })
        .collect();
    let updates: Vec<Line> = plan
        .to_update
        .iter()
        .map(|u| Line {
            kind: DiffKind::Update,
            title: u.showing.film_title.clone(),
            time: u.showing.start_time.format(TIME_FORMAT).to_string(),
            detail: Some(format!("changed: {}", u.changed_fields().join(", "))),
        })
        .collect();
    let deletes: Vec<Line> = plan
        .to_delete
        .iter()
        .map(|e| Line {
            kind: DiffKind::Delete,
            title: e.summary.clone(),
            time: e.start.format(TIME_FORMAT).to_string(),
            detail: None,
        })
        .collect();

    let mut out = Vec::new();
    render_lines(DiffKind::Create, &creates, verbose, &mut out);
    render_lines(DiffKind::Update, &updates, verbose, &mut out);
    render_lines(DiffKind::Delete, &deletes, verbose, &mut out);
    if plan.unchanged > 0 {
        out.push(format!("   {} up to date", plan.unchanged).dimmed().to_string());
    }
    out.join("\n")
}

pub fn render_report(report: &SyncReport) -> String {
    let mut out = vec![format!(
        "Synced: {} created, {} updated, {} deleted",
        report.created.len(),
        report.updated,
        report.deleted
    )];

    for failure in &report.failures {
        out.push(format!("   {} {}", "!".red(), failure.to_string().red()));
    }

    match report.status() {
        SyncStatus::Success => {}
        SyncStatus::PartialFailure => {
            let total = report.failures.len() + report.succeeded();
            out.push(
                format!("{} of {} calendar calls failed", report.failures.len(), total)
                    .yellow()
                    .to_string(),
            );
        }
        SyncStatus::Failure => out.push("Every calendar call failed".red().to_string()),
    }

    out.join("\n")
}

pub fn render_issues(issues: &[ParseIssue]) -> String {
    let mut out = vec![
        format!("{} showing(s) could not be read:", issues.len())
            .yellow()
            .to_string(),
    ];
    out.extend(issues.iter().map(|issue| format!("   {}", issue.to_string().dimmed())));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use greenlight_core::ShowingRecord;
    use greenlight_core::sync::{FailedOperation, SyncReport};

    fn showing(title: &str, day: u32) -> ShowingRecord {
        let start =
            DateTime::parse_from_rfc3339(&format!("2026-03-{:02}T19:00:00-05:00", day)).unwrap();
        ShowingRecord::new(title, start, start + chrono::Duration::hours(2))
    }

    #[test]
    fn lists_each_change_when_few() {
        let plan = SyncPlan {
            to_create: vec![showing("Alien", 1)],
            ..SyncPlan::default()
        };
        let out = render_plan(&plan, false);
        assert!(out.contains("Alien"));
        assert!(out.contains("Sun Mar 01 19:00"));
    }

    #[test]
    fn compacts_long_lists() {
        let plan = SyncPlan {
            to_create: (1..=20).map(|day| showing("Alien", day)).collect(),
            ..SyncPlan::default()
        };
        let out = render_plan(&plan, false);
        assert!(out.contains("(20 new events)"));
        assert!(!out.contains("Alien"));

        let verbose = render_plan(&plan, true);
        assert_eq!(verbose.matches("Alien").count(), 20);
    }

    #[test]
    fn report_names_failed_showings() {
        let report = SyncReport {
            deleted: 1,
            failures: vec![FailedOperation {
                kind: DiffKind::Update,
                label: "Brazil @ Mar 02 19:00".into(),
                error: "HTTP 500".into(),
            }],
            ..SyncReport::default()
        };
        let out = render_report(&report);
        assert!(out.contains("could not update Brazil @ Mar 02 19:00: HTTP 500"));
        assert!(out.contains("1 of 2 calendar calls failed"));
    }
}
