//! One end-to-end sync run.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::apply::{SyncReport, apply};
use super::plan::{DiffOptions, SyncPlan};
use crate::client::CalendarClient;
use crate::config::SyncConfig;
use crate::error::{GreenlightError, GreenlightResult};
use crate::extract::{Extraction, parse_showtimes};
use crate::source::PageSource;

#[derive(Debug, Clone, Default)]
pub struct SyncRequest {
    /// Compute the plan but change nothing.
    pub dry_run: bool,
    /// Apply deletions even when the page produced no showings.
    pub force: bool,
    /// See [`DiffOptions::not_before`].
    pub not_before: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct SyncRun {
    pub extraction: Extraction,
    pub plan: SyncPlan,
    /// `None` for dry runs.
    pub report: Option<SyncReport>,
}

/// Fetch the showtimes page and bring the calendar in line with it.
///
/// A page that cannot be fetched fails the run before the calendar is
/// contacted.
pub async fn sync_showtimes(
    source: &dyn PageSource,
    client: &dyn CalendarClient,
    config: &SyncConfig,
    request: &SyncRequest,
) -> GreenlightResult<SyncRun> {
    info!(source = %source.describe(), "Fetching showtimes");
    let html = source.fetch().await?;
    let extraction = parse_showtimes(&html, &config.extract);
    info!(
        showings = extraction.showings.len(),
        issues = extraction.issues.len(),
        "Extracted showings"
    );
    sync_showings(extraction, client, &config.calendar_id, request).await
}

/// Bring the calendar in line with showings that were already extracted.
pub async fn sync_showings(
    extraction: Extraction,
    client: &dyn CalendarClient,
    calendar_id: &str,
    request: &SyncRequest,
) -> GreenlightResult<SyncRun> {
    let existing = client.list_events(calendar_id, request.not_before).await?;
    let options = DiffOptions {
        not_before: request.not_before,
    };
    let plan = SyncPlan::compute(&extraction.showings, &existing, &options);
    info!(
        create = plan.to_create.len(),
        update = plan.to_update.len(),
        delete = plan.to_delete.len(),
        unchanged = plan.unchanged,
        "Computed sync plan"
    );

    if request.dry_run {
        return Ok(SyncRun {
            extraction,
            plan,
            report: None,
        });
    }

    // An empty page is more likely a broken scrape than an empty program.
    if extraction.showings.is_empty() && !plan.to_delete.is_empty() {
        if !request.force {
            return Err(GreenlightError::Refused(format!(
                "no showings were found but {} event(s) would be deleted; use --force to delete them",
                plan.to_delete.len()
            )));
        }
        warn!(delete = plan.to_delete.len(), "No showings found, deleting anyway");
    }

    let report = apply(client, calendar_id, &plan).await;
    Ok(SyncRun {
        extraction,
        plan,
        report: Some(report),
    })
}
