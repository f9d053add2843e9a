use std::collections::BTreeMap;

use airmozilla_common::{ChannelId, LocationId, Privacy, Slug, slugify};
use serde::{Deserialize, Serialize};

use crate::domain::storage::Upload;
use crate::domain::suggestion::{Field, Step, SuggestedEvent};
use crate::domain::timezone::{self, TimezoneError};

pub const TITLE_MAX_LENGTH: usize = 200;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Select a valid choice.";
pub const DUPLICATE_TITLE: &str = "You already have a suggested event with this title.";
pub const SLUG_IN_USE: &str = "Slug already in use.";
pub const INVALID_SLUG: &str =
    "Enter a valid slug consisting of letters, numbers, underscores or hyphens.";
pub const NO_SLUGGABLE_CHARACTERS: &str = "Title must contain at least one letter or digit.";
pub const EMPTY_FILE: &str = "The submitted file is empty.";
pub const NOT_AN_IMAGE: &str = "Upload a valid image.";

/// Messages per form field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field.name()).or_default().push(message.into());
    }

    pub fn get(&self, field: Field) -> Option<&[String]> {
        self.0.get(field.name()).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Value of one form field as rendered back to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

pub type FormValues = BTreeMap<&'static str, FieldValue>;

fn text(value: impl Into<String>) -> FieldValue {
    FieldValue::Text(value.into())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartForm {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DescriptionForm {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailsForm {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub privacy: String,
    #[serde(default)]
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PlaceholderForm {
    pub placeholder_img: Option<Upload>,
}

/// A posted form of one of the editing steps
#[derive(Debug, Clone)]
pub enum StepForm {
    Title(TitleForm),
    Description(DescriptionForm),
    Details(DetailsForm),
    Placeholder(PlaceholderForm),
}

impl StepForm {
    pub fn step(&self) -> Step {
        match self {
            StepForm::Title(_) => Step::Title,
            StepForm::Description(_) => Step::Description,
            StepForm::Details(_) => Step::Details,
            StepForm::Placeholder(_) => Step::Placeholder,
        }
    }

    /// The submitted values, echoed back next to the errors
    pub fn values(&self) -> FormValues {
        let mut values = FormValues::new();
        match self {
            StepForm::Title(form) => {
                values.insert(Field::Title.name(), text(&form.title));
                values.insert(Field::Slug.name(), text(&form.slug));
            }
            StepForm::Description(form) => {
                values.insert(Field::Description.name(), text(&form.description));
                values.insert(
                    Field::ShortDescription.name(),
                    text(&form.short_description),
                );
            }
            StepForm::Details(form) => {
                values.insert(Field::Location.name(), text(&form.location));
                values.insert(Field::StartTime.name(), text(&form.start_time));
                values.insert(Field::Privacy.name(), text(&form.privacy));
                values.insert(
                    Field::Channels.name(),
                    FieldValue::List(form.channels.clone()),
                );
            }
            StepForm::Placeholder(form) => {
                if let Some(upload) = &form.placeholder_img {
                    values.insert(Field::Placeholder.name(), text(&upload.file_name));
                }
            }
        }
        values
    }
}

/// Persisted values of the fields `step` edits, start time in the
/// location's zone.
pub fn initial_values(step: Step, event: &SuggestedEvent) -> Result<FormValues, TimezoneError> {
    let mut values = FormValues::new();
    for field in step.edits() {
        let value = match field {
            Field::Title => text(&event.title),
            Field::Slug => text(event.slug.as_ref()),
            Field::Description => text(&event.description),
            Field::ShortDescription => text(&event.short_description),
            Field::Location => text(
                event
                    .location
                    .as_ref()
                    .map(|location| location.id.0.to_string())
                    .unwrap_or_default(),
            ),
            Field::StartTime => {
                let local = match (event.start_time, event.zone()?) {
                    (Some(start_time), Some(zone)) => timezone::format_local(start_time, zone),
                    _ => String::new(),
                };
                text(local)
            }
            Field::Privacy => text(event.privacy.as_str()),
            Field::Channels => FieldValue::List(
                event
                    .channels
                    .iter()
                    .map(|channel| channel.0.to_string())
                    .collect(),
            ),
            Field::Placeholder => text(event.placeholder_img.clone().unwrap_or_default()),
            Field::Submitted => continue,
        };
        values.insert(field.name(), value);
    }
    Ok(values)
}

/// Trimmed title, or `None` with the reason in `errors`
pub fn clean_title(title: &str, errors: &mut FormErrors) -> Option<String> {
    let title = title.trim();
    if title.is_empty() {
        errors.add(Field::Title, REQUIRED);
        return None;
    }
    let length = title.chars().count();
    if length > TITLE_MAX_LENGTH {
        errors.add(
            Field::Title,
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                TITLE_MAX_LENGTH, length
            ),
        );
        return None;
    }
    if slugify(title).is_empty() {
        errors.add(Field::Title, NO_SLUGGABLE_CHARACTERS);
        return None;
    }
    Some(title.to_string())
}

/// An empty value keeps the current slug
pub fn clean_slug(slug: &str, errors: &mut FormErrors) -> Option<Slug> {
    if slug.trim().is_empty() {
        return None;
    }
    match Slug::try_new(slug) {
        Ok(slug) => Some(slug),
        Err(_) => {
            errors.add(Field::Slug, INVALID_SLUG);
            None
        }
    }
}

pub fn clean_description(description: &str, errors: &mut FormErrors) -> Option<String> {
    let description = description.trim();
    if description.is_empty() {
        errors.add(Field::Description, REQUIRED);
        return None;
    }
    Some(description.to_string())
}

pub fn clean_location_id(location: &str, errors: &mut FormErrors) -> Option<LocationId> {
    let location = location.trim();
    if location.is_empty() {
        errors.add(Field::Location, REQUIRED);
        return None;
    }
    match location.parse::<i64>() {
        Ok(id) => Some(LocationId(id)),
        Err(_) => {
            errors.add(Field::Location, INVALID_CHOICE);
            None
        }
    }
}

pub fn clean_privacy(privacy: &str, errors: &mut FormErrors) -> Option<Privacy> {
    if privacy.trim().is_empty() {
        errors.add(Field::Privacy, REQUIRED);
        return None;
    }
    match privacy.parse::<Privacy>() {
        Ok(privacy) => Some(privacy),
        Err(_) => {
            errors.add(Field::Privacy, INVALID_CHOICE);
            None
        }
    }
}

/// Channel ids as posted; whether they exist is checked against the catalog
pub fn clean_channel_ids(channels: &[String], errors: &mut FormErrors) -> Option<Vec<ChannelId>> {
    let ids: Result<Vec<ChannelId>, _> = channels
        .iter()
        .filter(|channel| !channel.trim().is_empty())
        .map(|channel| channel.trim().parse::<i64>().map(ChannelId))
        .collect();
    match ids {
        Ok(ids) if ids.is_empty() => {
            errors.add(Field::Channels, REQUIRED);
            None
        }
        Ok(ids) => Some(ids),
        Err(_) => {
            errors.add(Field::Channels, INVALID_CHOICE);
            None
        }
    }
}

pub fn clean_upload(upload: Option<Upload>, errors: &mut FormErrors) -> Option<Upload> {
    let upload = upload?;
    if upload.bytes.is_empty() {
        errors.add(Field::Placeholder, EMPTY_FILE);
        return None;
    }
    if !upload.is_image() {
        errors.add(Field::Placeholder, NOT_AN_IMAGE);
        return None;
    }
    Some(upload)
}
