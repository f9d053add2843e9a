use std::collections::BTreeSet;
use std::fmt;

use airmozilla_common::{ADD_EVENT_PERMISSION, ChannelId, Location, Privacy, Slug, User, UserId};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::domain::notification::NotificationError;
use crate::domain::repository::RepositoryError;
use crate::domain::slug::SlugAllocationError;
use crate::domain::storage::StorageError;
use crate::domain::timezone::{self, TimezoneError};

pub mod forms;
pub mod step;
pub mod wizard;

pub use step::Step;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SuggestionId(pub i64);

impl fmt::Display for SuggestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SuggestionId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// An event proposed by a user, built step by step until it is submitted
/// for review.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestedEvent {
    pub id: SuggestionId,
    pub owner: UserId,
    pub title: String,
    pub slug: Slug,
    pub description: String,
    pub short_description: String,
    pub channels: BTreeSet<ChannelId>,
    pub location: Option<Location>,
    /// Stored in UTC, edited in the location's zone
    pub start_time: Option<DateTime<Utc>>,
    pub privacy: Privacy,
    pub placeholder_img: Option<String>,
    /// `None` while the event is a draft
    pub submitted: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// What the start step knows about a new draft
#[derive(Debug, Clone, PartialEq)]
pub struct NewSuggestion {
    pub owner: UserId,
    pub title: String,
    pub slug: Slug,
    pub channels: BTreeSet<ChannelId>,
    pub created: DateTime<Utc>,
}

/// Fields a step may require or edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Slug,
    Description,
    ShortDescription,
    Location,
    StartTime,
    Privacy,
    Channels,
    Placeholder,
    Submitted,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Slug => "slug",
            Field::Description => "description",
            Field::ShortDescription => "short_description",
            Field::Location => "location",
            Field::StartTime => "start_time",
            Field::Privacy => "privacy",
            Field::Channels => "channels",
            Field::Placeholder => "placeholder_img",
            Field::Submitted => "submitted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    View,
    Change,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Owner,
    /// Holder of the approval permission looking at a submitted event
    Reviewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Submitted,
    Retracted,
}

impl SuggestedEvent {
    pub fn has(&self, field: Field) -> bool {
        match field {
            Field::Title => !self.title.trim().is_empty(),
            Field::Slug | Field::Privacy => true,
            Field::Description => !self.description.trim().is_empty(),
            Field::ShortDescription => !self.short_description.trim().is_empty(),
            Field::Location => self.location.is_some(),
            Field::StartTime => self.start_time.is_some(),
            Field::Channels => !self.channels.is_empty(),
            Field::Placeholder => self.placeholder_img.is_some(),
            Field::Submitted => self.submitted.is_some(),
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted.is_some()
    }

    /// Owners may do anything. Approval holders may only look at the summary
    /// of a submitted event.
    pub fn authorize(&self, user: &User, step: Step, intent: Intent) -> Result<Access, WizardError> {
        if self.owner == user.id {
            return Ok(Access::Owner);
        }
        if step == Step::Summary && intent == Intent::View && user.has_perm(ADD_EVENT_PERMISSION) {
            return if self.is_submitted() {
                Ok(Access::Reviewer)
            } else {
                Err(WizardError::NotSubmitted)
            };
        }
        Err(WizardError::NotYourEvent)
    }

    pub fn toggle_submission(&mut self, now: DateTime<Utc>) -> Submission {
        match self.submitted {
            Some(_) => {
                self.submitted = None;
                Submission::Retracted
            }
            None => {
                self.submitted = Some(now);
                Submission::Submitted
            }
        }
    }

    /// Zone of the event's location, if it has one
    pub fn zone(&self) -> Result<Option<Tz>, TimezoneError> {
        self.location
            .as_ref()
            .map(|location| timezone::zone(&location.timezone))
            .transpose()
    }

    /// Start time in the location's zone, with the zone abbreviation
    pub fn local_start_time(&self) -> Result<Option<String>, TimezoneError> {
        let zone = self.zone()?;
        Ok(self
            .start_time
            .zip(zone)
            .map(|(start_time, zone)| timezone::display_local(start_time, zone)))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("suggested event {0} not found")]
    NotFound(SuggestionId),
    #[error("Not your event")]
    NotYourEvent,
    #[error("Not submitted")]
    NotSubmitted,
    #[error("default channel '{0}' does not exist")]
    MissingDefaultChannel(Slug),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Timezone(#[from] TimezoneError),
    #[error(transparent)]
    Slug(#[from] SlugAllocationError),
}
