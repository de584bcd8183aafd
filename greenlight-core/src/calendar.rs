//! Calendars and their access control lists.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_role: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AclRole {
    FreeBusyReader,
    Reader,
    Writer,
    Owner,
}

impl AclRole {
    /// The role's name in the Calendar API.
    pub fn as_str(&self) -> &'static str {
        match self {
            AclRole::FreeBusyReader => "freeBusyReader",
            AclRole::Reader => "reader",
            AclRole::Writer => "writer",
            AclRole::Owner => "owner",
        }
    }

    pub fn from_api(role: &str) -> Option<Self> {
        match role {
            "freeBusyReader" => Some(AclRole::FreeBusyReader),
            "reader" => Some(AclRole::Reader),
            "writer" => Some(AclRole::Writer),
            "owner" => Some(AclRole::Owner),
            _ => None,
        }
    }
}

impl fmt::Display for AclRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who an ACL rule applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum AclScope {
    /// Everyone, i.e. a public calendar.
    Default,
    User(String),
    Group(String),
    Domain(String),
}

impl AclScope {
    pub fn scope_type(&self) -> &'static str {
        match self {
            AclScope::Default => "default",
            AclScope::User(_) => "user",
            AclScope::Group(_) => "group",
            AclScope::Domain(_) => "domain",
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            AclScope::Default => None,
            AclScope::User(v) | AclScope::Group(v) | AclScope::Domain(v) => Some(v),
        }
    }

    pub fn from_api(scope_type: &str, value: Option<String>) -> Option<Self> {
        match (scope_type, value) {
            ("default", _) => Some(AclScope::Default),
            ("user", Some(v)) => Some(AclScope::User(v)),
            ("group", Some(v)) => Some(AclScope::Group(v)),
            ("domain", Some(v)) => Some(AclScope::Domain(v)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRule {
    pub id: String,
    pub role: AclRole,
    pub scope: AclScope,
}

impl fmt::Display for AclRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope.value() {
            Some(value) => write!(f, "{}/{}: {}", self.scope.scope_type(), self.role, value),
            None => write!(f, "{}/{}", self.scope.scope_type(), self.role),
        }
    }
}
