use std::path::PathBuf;

use anyhow::{Result, bail};
use chrono::Utc;
use greenlight_core::CalendarClient;
use greenlight_core::dump;
use greenlight_core::extract::{Extraction, parse_showtimes};
use greenlight_core::source::{HtmlFile, HttpPage, PageSource, ShowingsFile};
use greenlight_core::sync::{
    DiffOptions, SyncPlan, SyncRequest, SyncRun, SyncStatus, apply, sync_showings, sync_showtimes,
};
use owo_colors::OwoColorize;

use super::Context;
use crate::render::{render_issues, render_plan, render_report};

pub struct UpdateOptions {
    pub dry_run: bool,
    pub force: bool,
    pub html_file: Option<PathBuf>,
    pub showings_file: Option<PathBuf>,
    pub calendar_file: Option<PathBuf>,
}

fn page_source(ctx: &Context, html_file: Option<PathBuf>) -> Result<Box<dyn PageSource>> {
    Ok(match html_file {
        Some(path) => Box::new(HtmlFile(path)),
        None => Box::new(HttpPage::new(
            ctx.file.source_url.clone(),
            ctx.file.request_timeout(),
        )?),
    })
}

pub async fn update(ctx: &Context, options: UpdateOptions) -> Result<()> {
    let backend = ctx.backend(options.calendar_file.as_deref())?;
    let calendar_id = ctx.calendar_id_for(&backend)?;
    let config = ctx.sync_config(calendar_id)?;

    let request = SyncRequest {
        dry_run: options.dry_run,
        force: options.force,
        not_before: Some(Utc::now()),
    };

    let run: SyncRun = match options.showings_file {
        Some(path) => {
            let extraction = Extraction {
                showings: ShowingsFile(path).read()?,
                issues: Vec::new(),
            };
            sync_showings(extraction, backend.client(), &config.calendar_id, &request).await?
        }
        None => {
            let source = page_source(ctx, options.html_file)?;
            sync_showtimes(source.as_ref(), backend.client(), &config, &request).await?
        }
    };

    if !run.extraction.issues.is_empty() {
        eprintln!("{}", render_issues(&run.extraction.issues));
    }
    println!(
        "Found {} showings for {}",
        run.extraction.showings.len(),
        config.calendar_id.bold()
    );
    println!("{}", render_plan(&run.plan, ctx.verbose));

    let Some(report) = run.report else {
        println!("{}", "Dry run, nothing was changed".dimmed());
        return Ok(());
    };

    backend.finish()?;
    println!("\n{}", render_report(&report));

    match report.status() {
        SyncStatus::Success => Ok(()),
        SyncStatus::PartialFailure | SyncStatus::Failure => bail!(
            "{} calendar call(s) failed",
            report.failures.len()
        ),
    }
}

pub async fn dump(ctx: &Context, output: Option<PathBuf>, html_file: Option<PathBuf>) -> Result<()> {
    let options = ctx.file.extract_options()?;
    let source = page_source(ctx, html_file)?;
    let html = source.fetch().await?;
    let extraction = parse_showtimes(&html, &options);

    if !extraction.issues.is_empty() {
        eprintln!("{}", render_issues(&extraction.issues));
    }
    dump::write_showings(output.as_deref(), &extraction.showings)?;
    if let Some(path) = output {
        eprintln!(
            "Wrote {} showings to {}",
            extraction.showings.len(),
            path.display()
        );
    }
    Ok(())
}

pub async fn list(ctx: &Context, calendar_file: Option<PathBuf>) -> Result<()> {
    let backend = ctx.backend(calendar_file.as_deref())?;
    let calendar_id = ctx.calendar_id_for(&backend)?;
    let events = backend.client().list_events(&calendar_id, None).await?;
    println!("{}", serde_json::to_string_pretty(&events)?);
    Ok(())
}

/// Delete every event this tool created. Other events stay.
pub async fn clear(ctx: &Context, dry_run: bool, calendar_file: Option<PathBuf>) -> Result<()> {
    let backend = ctx.backend(calendar_file.as_deref())?;
    let calendar_id = ctx.calendar_id_for(&backend)?;

    let existing = backend.client().list_events(&calendar_id, None).await?;
    let plan = SyncPlan::compute(&[], &existing, &DiffOptions::default());
    println!("{}", render_plan(&plan, ctx.verbose));

    if dry_run {
        println!("{}", "Dry run, nothing was changed".dimmed());
        return Ok(());
    }

    let report = apply(backend.client(), &calendar_id, &plan).await;
    backend.finish()?;
    println!("\n{}", render_report(&report));

    if report.status() != SyncStatus::Success {
        bail!("{} calendar call(s) failed", report.failures.len());
    }
    Ok(())
}

pub async fn delete(ctx: &Context, ids: &[String]) -> Result<()> {
    let calendar_id = ctx.calendar_id()?;
    let client = ctx.google()?;

    let mut failed = 0;
    for id in ids {
        match client.delete_event(&calendar_id, id).await {
            Ok(()) => println!("{} {}", "-".red(), id),
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {}", "!".red(), id, e);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} deletions failed", failed, ids.len());
    }
    Ok(())
}
