use serde::Serialize;

use crate::domain::suggestion::{Field, SuggestedEvent, SuggestionId};

pub const START_URL: &str = "/suggest/";

/// Pages of the suggestion flow, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Start,
    Title,
    Description,
    Details,
    Placeholder,
    Summary,
}

/// One row of the step table
#[derive(Debug)]
pub struct Transition {
    pub step: Step,
    pub next: Option<Step>,
    /// Fields that must be present before the step can be shown
    pub requires: &'static [Field],
    pub edits: &'static [Field],
}

const BASICS: &[Field] = &[Field::Title, Field::Description, Field::Location, Field::StartTime];

/// Indexed by the `Step` discriminant
pub const TRANSITIONS: [Transition; 6] = [
    Transition {
        step: Step::Start,
        next: Some(Step::Description),
        requires: &[],
        edits: &[Field::Title],
    },
    Transition {
        step: Step::Title,
        next: Some(Step::Description),
        requires: &[],
        edits: &[Field::Title, Field::Slug],
    },
    Transition {
        step: Step::Description,
        next: Some(Step::Details),
        requires: &[Field::Title],
        edits: &[Field::Description, Field::ShortDescription],
    },
    Transition {
        step: Step::Details,
        next: Some(Step::Placeholder),
        requires: &[Field::Title, Field::Description],
        edits: &[Field::Location, Field::StartTime, Field::Privacy, Field::Channels],
    },
    Transition {
        step: Step::Placeholder,
        next: Some(Step::Summary),
        requires: BASICS,
        edits: &[Field::Placeholder],
    },
    Transition {
        step: Step::Summary,
        next: None,
        requires: BASICS,
        edits: &[Field::Submitted],
    },
];

/// Steps reachable by url, earliest first
const EDIT_STEPS: [Step; 5] = [
    Step::Title,
    Step::Description,
    Step::Details,
    Step::Placeholder,
    Step::Summary,
];

impl Step {
    pub fn transition(&self) -> &'static Transition {
        &TRANSITIONS[*self as usize]
    }

    pub fn next(&self) -> Option<Step> {
        self.transition().next
    }

    pub fn requires(&self) -> &'static [Field] {
        self.transition().requires
    }

    pub fn edits(&self) -> &'static [Field] {
        self.transition().edits
    }

    /// Url path segment, empty for the start page
    pub fn segment(&self) -> &'static str {
        match self {
            Step::Start => "",
            Step::Title => "title",
            Step::Description => "description",
            Step::Details => "details",
            Step::Placeholder => "placeholder",
            Step::Summary => "summary",
        }
    }

    pub fn from_segment(segment: &str) -> Option<Step> {
        EDIT_STEPS.into_iter().find(|step| step.segment() == segment)
    }

    pub fn url(&self, id: SuggestionId) -> String {
        match self {
            Step::Start => START_URL.to_string(),
            step => format!("{}{}/{}/", START_URL, id, step.segment()),
        }
    }

    /// Earliest step that edits `field`
    pub fn providing(field: Field) -> Option<Step> {
        EDIT_STEPS
            .into_iter()
            .find(|step| step.edits().contains(&field))
    }

    /// Where to send the user instead when the event lacks something this
    /// step needs: the earliest step providing a missing field.
    pub fn gate(&self, event: &SuggestedEvent) -> Option<Step> {
        self.requires()
            .iter()
            .filter(|field| !event.has(**field))
            .filter_map(|field| Step::providing(*field))
            .min_by_key(|step| *step as usize)
    }
}
