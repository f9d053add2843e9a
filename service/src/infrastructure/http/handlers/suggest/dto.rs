use airmozilla_common::{Channel, Location, Privacy, Slug};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::suggestion::forms::{FormErrors, FormValues};
use crate::domain::suggestion::wizard::{Choices, StepPage};
use crate::domain::suggestion::{Access, Step, SuggestedEvent};
use crate::domain::timezone::TimezoneError;

/// Response for every page of the suggestion flow
#[derive(Debug, Clone, Serialize)]
pub struct StepPageResponse {
    step: Step,
    access: &'static str,
    event: Option<SuggestionResponse>,
    form: FormValues,
    errors: FormErrors,
    suggestions: Vec<SuggestionResponse>,
    choices: Option<ChoicesResponse>,
}

impl TryFrom<StepPage> for StepPageResponse {
    type Error = TimezoneError;

    fn try_from(page: StepPage) -> Result<Self, Self::Error> {
        let access = match page.access {
            Access::Owner => "owner",
            Access::Reviewer => "reviewer",
        };
        let event = page
            .event
            .as_ref()
            .map(SuggestionResponse::try_from)
            .transpose()?;
        let suggestions = page
            .suggestions
            .iter()
            .map(SuggestionResponse::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            step: page.step,
            access,
            event,
            form: page.form,
            errors: page.errors,
            suggestions,
            choices: page.choices.map(ChoicesResponse::from),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestionResponse {
    id: i64,
    title: String,
    slug: Slug,
    description: String,
    short_description: String,
    channels: Vec<i64>,
    location: Option<Location>,
    start_time: Option<DateTime<Utc>>,
    /// Start time in the location's zone, for display
    local_start_time: Option<String>,
    privacy: Privacy,
    placeholder_img: Option<String>,
    submitted: Option<DateTime<Utc>>,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
    url: String,
}

impl TryFrom<&SuggestedEvent> for SuggestionResponse {
    type Error = TimezoneError;

    fn try_from(event: &SuggestedEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            id: event.id.0,
            title: event.title.clone(),
            slug: event.slug.clone(),
            description: event.description.clone(),
            short_description: event.short_description.clone(),
            channels: event.channels.iter().map(|channel| channel.0).collect(),
            location: event.location.clone(),
            start_time: event.start_time,
            local_start_time: event.local_start_time()?,
            privacy: event.privacy,
            placeholder_img: event.placeholder_img.clone(),
            submitted: event.submitted,
            created: event.created,
            modified: event.modified,
            url: Step::Summary.url(event.id),
        })
    }
}

/// Options of the details form
#[derive(Debug, Clone, Serialize)]
pub struct ChoicesResponse {
    locations: Vec<Location>,
    channels: Vec<Channel>,
    privacy: [Privacy; 3],
}

impl From<Choices> for ChoicesResponse {
    fn from(choices: Choices) -> Self {
        Self {
            locations: choices.locations,
            channels: choices.channels,
            privacy: [Privacy::Public, Privacy::Company, Privacy::Contributors],
        }
    }
}
