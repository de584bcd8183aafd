use anyhow::Result;
use greenlight_core::access;
use greenlight_core::{AclRole, CalendarClient};
use owo_colors::OwoColorize;

use super::Context;

pub async fn list(ctx: &Context) -> Result<()> {
    let client = ctx.google()?;
    let calendars = client.list_calendars().await?;
    println!("{}", serde_json::to_string_pretty(&calendars)?);
    Ok(())
}

pub async fn create(ctx: &Context, name: Option<String>, private: bool) -> Result<()> {
    let client = ctx.google()?;
    let name = name.unwrap_or_else(|| ctx.file.calendar_name.clone());

    let calendar = client.create_calendar(&name, &ctx.file.timezone).await?;
    eprintln!("Created calendar {}", calendar.name.bold());

    if !private {
        access::make_public(&client, &calendar.id).await?;
        eprintln!("{}", "Anyone can now read this calendar".dimmed());
    }

    println!("{}", calendar.id);
    eprintln!(
        "{}",
        format!("Set CALENDAR_ID={} to sync into it", calendar.id).dimmed()
    );
    Ok(())
}

pub async fn delete(ctx: &Context) -> Result<()> {
    let calendar_id = ctx.calendar_id()?;
    let client = ctx.google()?;
    client.delete_calendar(&calendar_id).await?;
    eprintln!("Deleted calendar {}", calendar_id);
    Ok(())
}

pub async fn acl(ctx: &Context) -> Result<()> {
    let calendar_id = ctx.calendar_id()?;
    let client = ctx.google()?;
    let rules = client.list_acl(&calendar_id).await?;
    println!("{}", serde_json::to_string_pretty(&rules)?);
    Ok(())
}

pub async fn add_member(ctx: &Context, email: &str, role: AclRole) -> Result<()> {
    let calendar_id = ctx.calendar_id()?;
    let client = ctx.google()?;
    let rule = access::add_member(&client, &calendar_id, email, role).await?;
    eprintln!("{} {}", "+".green(), rule);
    Ok(())
}

pub async fn remove_member(ctx: &Context, email: &str, role: AclRole) -> Result<()> {
    let calendar_id = ctx.calendar_id()?;
    let client = ctx.google()?;
    let rule = access::remove_member(&client, &calendar_id, email, role).await?;
    eprintln!("{} {}", "-".red(), rule);
    Ok(())
}
