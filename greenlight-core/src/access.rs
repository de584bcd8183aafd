//! Sharing a calendar with people.

use tracing::info;

use crate::calendar::{AclRole, AclRule, AclScope};
use crate::client::CalendarClient;
use crate::error::{GreenlightError, GreenlightResult};

pub async fn add_member(
    client: &dyn CalendarClient,
    calendar_id: &str,
    email: &str,
    role: AclRole,
) -> GreenlightResult<AclRule> {
    let rule = client
        .grant_access(calendar_id, role, &AclScope::User(email.to_string()))
        .await?;
    info!(%email, %role, "Granted calendar access");
    Ok(rule)
}

/// Revoke the `role` rule for `email`. Fails if there is no such rule.
pub async fn remove_member(
    client: &dyn CalendarClient,
    calendar_id: &str,
    email: &str,
    role: AclRole,
) -> GreenlightResult<AclRule> {
    let rules = client.list_acl(calendar_id).await?;
    let rule = rules
        .into_iter()
        .find(|rule| {
            rule.role == role
                && matches!(&rule.scope, AclScope::User(user) if user.eq_ignore_ascii_case(email))
        })
        .ok_or_else(|| {
            GreenlightError::api(
                "remove member",
                format!("{} is not a {} of this calendar", email, role),
            )
        })?;

    client.revoke_access(calendar_id, &rule.id).await?;
    info!(%email, %role, "Revoked calendar access");
    Ok(rule)
}

/// Let anyone read the calendar.
pub async fn make_public(client: &dyn CalendarClient, calendar_id: &str) -> GreenlightResult<AclRule> {
    client
        .grant_access(calendar_id, AclRole::Reader, &AclScope::Default)
        .await
}
