use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ChannelId, EventId, LocationId, Slug, UserId};

/// An authenticated account, with the permissions granted to it
/// directly and through its groups.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub is_superuser: bool,
    /// Non-employee account; affects which feeds it may read.
    pub contributor: bool,
    pub permissions: HashSet<String>,
}

impl User {
    /// Inactive accounts hold no permission; superusers hold all of them.
    pub fn has_perm(&self, codename: &str) -> bool {
        self.is_active && (self.is_superuser || self.permissions.contains(codename))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub id: ChannelId,
    pub slug: Slug,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    /// IANA zone name, e.g. "America/Los_Angeles"
    pub timezone: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    Public,
    Company,
    Contributors,
}

impl Privacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::Public => "public",
            Privacy::Company => "company",
            Privacy::Contributors => "contributors",
        }
    }
}

impl Default for Privacy {
    fn default() -> Self {
        Privacy::Public
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValue(pub String);

impl fmt::Display for UnknownValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value '{}'", self.0)
    }
}

impl std::error::Error for UnknownValue {}

impl FromStr for Privacy {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "public" => Ok(Privacy::Public),
            "company" => Ok(Privacy::Company),
            "contributors" => Ok(Privacy::Contributors),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Initiated,
    Scheduled,
    Pending,
    Removed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Initiated => "initiated",
            EventStatus::Scheduled => "scheduled",
            EventStatus::Pending => "pending",
            EventStatus::Removed => "removed",
        }
    }
}

impl FromStr for EventStatus {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "initiated" => Ok(EventStatus::Initiated),
            "scheduled" => Ok(EventStatus::Scheduled),
            "pending" => Ok(EventStatus::Pending),
            "removed" => Ok(EventStatus::Removed),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

/// A published event, as listed in the sidebar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    /// Published slugs predate slug validation, so they stay plain text here.
    pub slug: String,
    pub description: String,
    pub status: EventStatus,
    pub privacy: Privacy,
    pub featured: bool,
    pub start_time: DateTime<Utc>,
    pub archive_time: Option<DateTime<Utc>>,
    pub placeholder_img: Option<String>,
}

impl Event {
    /// Scheduled, archived and already started.
    pub fn is_archived(&self, now: DateTime<Utc>) -> bool {
        self.status == EventStatus::Scheduled
            && self.start_time <= now
            && self.archive_time.is_some_and(|archived| archived <= now)
    }

    /// Scheduled, not archived and not started yet.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.status == EventStatus::Scheduled
            && self.archive_time.is_none()
            && self.start_time > now
    }
}

/// Static content snippet addressed by url key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatPage {
    pub url: String,
    pub title: String,
    pub content: String,
}
