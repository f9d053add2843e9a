use std::collections::BTreeSet;

use airmozilla_common::{Channel, ChannelId, Location, User};

use crate::domain::notification::{self, BaseUrl, Mailer, NotificationError};
use crate::domain::repository::{EventCatalog, SuggestionRepository};
use crate::domain::slug;
use crate::domain::storage::PlaceholderStorage;
use crate::domain::suggestion::forms::{
    self, DUPLICATE_TITLE, DescriptionForm, DetailsForm, FieldValue, FormErrors, FormValues,
    INVALID_CHOICE, PlaceholderForm, REQUIRED, SLUG_IN_USE, StartForm, StepForm, TitleForm,
};
use crate::domain::suggestion::step::START_URL;
use crate::domain::suggestion::{
    Access, Field, Intent, NewSuggestion, Step, Submission, SuggestedEvent, SuggestionId,
    WizardError,
};
use crate::domain::timezone;
use crate::domain::{AppState, Clock};

/// Outcome of a wizard request
#[derive(Debug, Clone, PartialEq)]
pub enum StepResponse {
    Page(StepPage),
    Redirect(String),
}

/// Everything needed to render one step
#[derive(Debug, Clone, PartialEq)]
pub struct StepPage {
    pub step: Step,
    pub event: Option<SuggestedEvent>,
    pub access: Access,
    pub form: FormValues,
    pub errors: FormErrors,
    /// The user's own suggestions, listed on the start page
    pub suggestions: Vec<SuggestedEvent>,
    /// Options of the details form
    pub choices: Option<Choices>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Choices {
    pub locations: Vec<Location>,
    pub channels: Vec<Channel>,
}

enum Entry {
    Granted(SuggestedEvent, Access),
    Redirect(String),
}

pub async fn start_page<S: AppState>(state: &S, user: &User) -> Result<StepPage, WizardError> {
    let suggestions = state.suggestions().list_for_user(user.id).await?;
    Ok(StepPage {
        step: Step::Start,
        event: None,
        access: Access::Owner,
        form: start_values(""),
        errors: FormErrors::default(),
        suggestions,
        choices: None,
    })
}

/// Creates a draft from the start form and moves on to its description
pub async fn start<S: AppState>(
    state: &S,
    user: &User,
    form: StartForm,
) -> Result<StepResponse, WizardError> {
    let mut errors = FormErrors::default();
    let mut title = forms::clean_title(&form.title, &mut errors);
    if let Some(candidate) = &title {
        if state
            .suggestions()
            .title_taken(user.id, candidate, None)
            .await?
        {
            errors.add(Field::Title, DUPLICATE_TITLE);
            title = None;
        }
    }

    let Some(title) = title else {
        let mut page = start_page(state, user).await?;
        page.form = start_values(&form.title);
        page.errors = errors;
        return Ok(StepResponse::Page(page));
    };

    let default_slug = &state.config().default_channel_slug;
    let channel = state
        .catalog()
        .channel_by_slug(default_slug)
        .await?
        .ok_or_else(|| WizardError::MissingDefaultChannel(default_slug.clone()))?;

    let now = state.clock().now();
    let slug = slug::allocate(state.suggestions(), &title, now.date_naive()).await?;
    let event = state
        .suggestions()
        .create(NewSuggestion {
            owner: user.id,
            title,
            slug,
            channels: BTreeSet::from([channel.id]),
            created: now,
        })
        .await?;

    tracing::info!(id = %event.id, slug = %event.slug, "suggested event created");
    Ok(StepResponse::Redirect(after(Step::Start, event.id)))
}

pub async fn show_step<S: AppState>(
    state: &S,
    user: &User,
    id: SuggestionId,
    step: Step,
) -> Result<StepResponse, WizardError> {
    let (event, access) = match enter(state, user, id, step, Intent::View).await? {
        Entry::Granted(event, access) => (event, access),
        Entry::Redirect(url) => return Ok(StepResponse::Redirect(url)),
    };
    let values = forms::initial_values(step, &event)?;
    page(state, step, event, access, values, FormErrors::default()).await
}

/// Validates and saves the fields of one step, then moves on to the next.
/// An invalid form is shown again with its errors and nothing is saved.
pub async fn submit_step<S: AppState>(
    state: &S,
    user: &User,
    id: SuggestionId,
    form: StepForm,
) -> Result<StepResponse, WizardError> {
    let step = form.step();
    let (event, access) = match enter(state, user, id, step, Intent::Change).await? {
        Entry::Granted(event, access) => (event, access),
        Entry::Redirect(url) => return Ok(StepResponse::Redirect(url)),
    };

    let values = form.values();
    let mut errors = FormErrors::default();
    let mut updated = event.clone();
    match form {
        StepForm::Title(form) => apply_title(state, &mut updated, form, &mut errors).await?,
        StepForm::Description(form) => apply_description(&mut updated, form, &mut errors),
        StepForm::Details(form) => apply_details(state, &mut updated, form, &mut errors).await?,
        StepForm::Placeholder(form) => {
            apply_placeholder(state, &mut updated, form, &mut errors).await?
        }
    }

    if !errors.is_empty() {
        tracing::debug!(id = %id, ?step, "form rejected");
        return page(state, step, event, access, values, errors).await;
    }

    updated.modified = state.clock().now();
    let saved = state.suggestions().update(&updated).await?;
    tracing::info!(id = %saved.id, ?step, "suggested event updated");
    Ok(StepResponse::Redirect(after(step, saved.id)))
}

/// Submits a draft, or takes a submitted event back.
///
/// Only the submission notifies the reviewers. The recipients are resolved
/// before anything is saved; if the mail cannot be delivered the previous
/// state is restored.
pub async fn toggle_submission<S: AppState>(
    state: &S,
    user: &User,
    id: SuggestionId,
    base_url: &BaseUrl,
) -> Result<StepResponse, WizardError> {
    let mut event = match enter(state, user, id, Step::Summary, Intent::Change).await? {
        Entry::Granted(event, _) => event,
        Entry::Redirect(url) => return Ok(StepResponse::Redirect(url)),
    };
    let previous = event.clone();

    let now = state.clock().now();
    let email = match event.toggle_submission(now) {
        Submission::Submitted => {
            let recipients = notification::reviewers(state).await?;
            let from = &state.config().email_from_address;
            Some(notification::compose(&event, user, base_url, from, recipients)?)
        }
        Submission::Retracted => None,
    };

    event.modified = now;
    let saved = state.suggestions().update(&event).await?;

    match email {
        Some(email) => {
            let recipients = email.to.len();
            if let Err(cause) = state.mailer().send(email).await {
                tracing::error!(id = %saved.id, %cause, "notification failed, restoring draft");
                state.suggestions().update(&previous).await?;
                return Err(NotificationError::from(cause).into());
            }
            tracing::info!(id = %saved.id, recipients, "suggested event submitted");
        }
        None => tracing::info!(id = %saved.id, "suggested event retracted"),
    }

    Ok(StepResponse::Redirect(Step::Summary.url(saved.id)))
}

/// Removes the event right away, whatever its state
pub async fn delete<S: AppState>(
    state: &S,
    user: &User,
    id: SuggestionId,
) -> Result<StepResponse, WizardError> {
    let event = load(state, id).await?;
    if event.owner != user.id {
        return Err(WizardError::NotYourEvent);
    }
    state.suggestions().delete(id).await?;
    tracing::info!(id = %id, "suggested event deleted");
    Ok(StepResponse::Redirect(START_URL.to_string()))
}

async fn load<S: AppState>(state: &S, id: SuggestionId) -> Result<SuggestedEvent, WizardError> {
    state
        .suggestions()
        .find_by_id(id)
        .await?
        .ok_or(WizardError::NotFound(id))
}

async fn enter<S: AppState>(
    state: &S,
    user: &User,
    id: SuggestionId,
    step: Step,
    intent: Intent,
) -> Result<Entry, WizardError> {
    if step == Step::Start {
        return Err(WizardError::NotFound(id));
    }
    let event = load(state, id).await?;
    let access = event.authorize(user, step, intent)?;
    // reviewers can't edit, so they see whatever is there
    let missing = match access {
        Access::Owner => step.gate(&event),
        Access::Reviewer => None,
    };
    if let Some(missing) = missing {
        tracing::debug!(id = %id, ?step, ?missing, "step not reachable yet");
        return Ok(Entry::Redirect(missing.url(id)));
    }
    Ok(Entry::Granted(event, access))
}

async fn page<S: AppState>(
    state: &S,
    step: Step,
    event: SuggestedEvent,
    access: Access,
    form: FormValues,
    errors: FormErrors,
) -> Result<StepResponse, WizardError> {
    let choices = if step == Step::Details {
        let catalog = state.catalog();
        let (locations, channels) = futures::try_join!(catalog.locations(), catalog.channels())?;
        Some(Choices {
            locations,
            channels,
        })
    } else {
        None
    };

    Ok(StepResponse::Page(StepPage {
        step,
        event: Some(event),
        access,
        form,
        errors,
        suggestions: Vec::new(),
        choices,
    }))
}

fn after(step: Step, id: SuggestionId) -> String {
    step.next().unwrap_or(step).url(id)
}

fn start_values(title: &str) -> FormValues {
    FormValues::from([(Field::Title.name(), FieldValue::Text(title.to_string()))])
}

async fn apply_title<S: AppState>(
    state: &S,
    event: &mut SuggestedEvent,
    form: TitleForm,
    errors: &mut FormErrors,
) -> Result<(), WizardError> {
    let repository = state.suggestions();
    if let Some(title) = forms::clean_title(&form.title, errors) {
        if repository
            .title_taken(event.owner, &title, Some(event.id))
            .await?
        {
            errors.add(Field::Title, DUPLICATE_TITLE);
        } else {
            event.title = title;
        }
    }
    if let Some(slug) = forms::clean_slug(&form.slug, errors) {
        if repository.slug_taken(&slug, Some(event.id)).await? {
            errors.add(Field::Slug, SLUG_IN_USE);
        } else {
            event.slug = slug;
        }
    }
    Ok(())
}

fn apply_description(event: &mut SuggestedEvent, form: DescriptionForm, errors: &mut FormErrors) {
    if let Some(description) = forms::clean_description(&form.description, errors) {
        event.description = description;
        event.short_description = form.short_description.trim().to_string();
    }
}

async fn apply_details<S: AppState>(
    state: &S,
    event: &mut SuggestedEvent,
    form: DetailsForm,
    errors: &mut FormErrors,
) -> Result<(), WizardError> {
    let catalog = state.catalog();

    let location = match forms::clean_location_id(&form.location, errors) {
        Some(id) => {
            let location = catalog.location(id).await?;
            if location.is_none() {
                errors.add(Field::Location, INVALID_CHOICE);
            }
            location
        }
        None => None,
    };

    let start_time = match (&location, form.start_time.trim()) {
        (_, "") => {
            errors.add(Field::StartTime, REQUIRED);
            None
        }
        (Some(location), value) => {
            let zone = timezone::zone(&location.timezone)?;
            match timezone::parse_local(value, zone) {
                Ok(start_time) => Some(start_time),
                Err(cause) => {
                    errors.add(Field::StartTime, cause.to_string());
                    None
                }
            }
        }
        // no zone to read it in; the location error says why
        (None, _) => None,
    };

    let privacy = forms::clean_privacy(&form.privacy, errors);

    let channels = match forms::clean_channel_ids(&form.channels, errors) {
        Some(ids) => {
            let existing: BTreeSet<ChannelId> = catalog
                .channels_by_ids(&ids)
                .await?
                .into_iter()
                .map(|channel| channel.id)
                .collect();
            if ids.iter().all(|id| existing.contains(id)) {
                Some(existing)
            } else {
                errors.add(Field::Channels, INVALID_CHOICE);
                None
            }
        }
        None => None,
    };

    if let (Some(location), Some(start_time), Some(privacy), Some(channels)) =
        (location, start_time, privacy, channels)
    {
        event.location = Some(location);
        event.start_time = Some(start_time);
        event.privacy = privacy;
        event.channels = channels;
    }
    Ok(())
}

async fn apply_placeholder<S: AppState>(
    state: &S,
    event: &mut SuggestedEvent,
    form: PlaceholderForm,
    errors: &mut FormErrors,
) -> Result<(), WizardError> {
    if let Some(upload) = forms::clean_upload(form.placeholder_img, errors) {
        let reference = state
            .storage()
            .store(event.id, &upload, state.clock().now())
            .await?;
        event.placeholder_img = Some(reference);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notification::NotificationError;
    use crate::domain::storage::Upload;
    use crate::test_utils::{OWNER, REVIEWER, ROOT, STRANGER, TestState, now};
    use chrono::{Duration, TimeZone, Utc};

    fn base_url() -> BaseUrl {
        BaseUrl::new("http", "localhost:3000")
    }

    fn start_form(title: &str) -> StartForm {
        StartForm {
            title: title.to_string(),
        }
    }

    fn details_form(location: &str, start_time: &str, channels: &[&str]) -> DetailsForm {
        DetailsForm {
            location: location.to_string(),
            start_time: start_time.to_string(),
            privacy: "company".to_string(),
            channels: channels.iter().map(|channel| channel.to_string()).collect(),
        }
    }

    fn redirect(response: StepResponse) -> String {
        match response {
            StepResponse::Redirect(url) => url,
            StepResponse::Page(page) => panic!("expected redirect, got page {:?}", page.step),
        }
    }

    fn page_of(response: StepResponse) -> StepPage {
        match response {
            StepResponse::Page(page) => page,
            StepResponse::Redirect(url) => panic!("expected page, got redirect to {}", url),
        }
    }

    #[tokio::test]
    async fn test_start_creates_draft_in_default_channel() {
        let state = TestState::new();
        let owner = state.user(OWNER);

        let url = redirect(start(&state, &owner, start_form("Weekly Sync")).await.unwrap());

        let created = state.store.suggestions();
        assert_eq!(created.len(), 1);
        let event = &created[0];
        assert_eq!(url, format!("/suggest/{}/description/", event.id));
        assert_eq!(event.title, "Weekly Sync");
        assert_eq!(event.slug.as_ref(), "weekly-sync");
        assert_eq!(event.owner, owner.id);
        assert_eq!(event.channels, BTreeSet::from([ChannelId(1)]));
        assert_eq!(event.submitted, None);
    }

    #[tokio::test]
    async fn test_start_rejects_own_duplicate_title() {
        let state = TestState::new();
        let owner = state.user(OWNER);
        start(&state, &owner, start_form("Weekly Sync")).await.unwrap();

        let page = page_of(start(&state, &owner, start_form("weekly sync")).await.unwrap());

        assert_eq!(page.step, Step::Start);
        assert_eq!(
            page.errors.get(Field::Title),
            Some(&[DUPLICATE_TITLE.to_string()][..])
        );
        assert_eq!(page.suggestions.len(), 1);
        assert_eq!(state.store.suggestions().len(), 1);
    }

    #[tokio::test]
    async fn test_same_title_of_other_user_gets_dated_slug() {
        let state = TestState::new();
        start(&state, &state.user(OWNER), start_form("Weekly Sync"))
            .await
            .unwrap();
        start(&state, &state.user(STRANGER), start_form("Weekly Sync"))
            .await
            .unwrap();

        let slugs: Vec<String> = state
            .store
            .suggestions()
            .iter()
            .map(|event| event.slug.to_string())
            .collect();
        assert_eq!(slugs, vec!["weekly-sync", "weekly-sync-20140101"]);
    }

    #[tokio::test]
    async fn test_start_without_default_channel_fails() {
        let state = TestState::new();
        state.store.remove_channel(1);
        let result = start(&state, &state.user(OWNER), start_form("Weekly Sync")).await;
        assert!(matches!(result, Err(WizardError::MissingDefaultChannel(_))));
        assert!(state.store.suggestions().is_empty());
    }

    #[tokio::test]
    async fn test_start_page_lists_own_drafts_oldest_change_first() {
        let state = TestState::new();
        let mut older = state.store.put_draft(OWNER);
        older.modified = now() - Duration::hours(1);
        state.store.put(older.clone());
        let newer = state.store.put_draft(OWNER);
        state.store.put_draft(STRANGER);

        let page = start_page(&state, &state.user(OWNER)).await.unwrap();

        let ids: Vec<SuggestionId> = page.suggestions.iter().map(|event| event.id).collect();
        assert_eq!(ids, vec![older.id, newer.id]);
    }

    #[tokio::test]
    async fn test_stranger_is_rejected_on_every_step() {
        let state = TestState::new();
        let event = state.store.put_complete_draft(OWNER);
        let stranger = state.user(STRANGER);

        for step in [
            Step::Title,
            Step::Description,
            Step::Details,
            Step::Placeholder,
            Step::Summary,
        ] {
            let shown = show_step(&state, &stranger, event.id, step).await;
            assert!(matches!(shown, Err(WizardError::NotYourEvent)), "GET {:?}", step);
        }

        let forms = [
            StepForm::Title(TitleForm::default()),
            StepForm::Description(DescriptionForm::default()),
            StepForm::Details(DetailsForm::default()),
            StepForm::Placeholder(PlaceholderForm::default()),
        ];
        for form in forms {
            let step = form.step();
            let submitted = submit_step(&state, &stranger, event.id, form).await;
            assert!(matches!(submitted, Err(WizardError::NotYourEvent)), "POST {:?}", step);
        }

        let toggled = toggle_submission(&state, &stranger, event.id, &base_url()).await;
        assert!(matches!(toggled, Err(WizardError::NotYourEvent)));
        let deleted = delete(&state, &stranger, event.id).await;
        assert!(matches!(deleted, Err(WizardError::NotYourEvent)));

        assert_eq!(state.store.suggestion(event.id), Some(event));
    }

    #[tokio::test]
    async fn test_unknown_event_is_not_found() {
        let state = TestState::new();
        let result = show_step(&state, &state.user(OWNER), SuggestionId(99), Step::Title).await;
        assert!(matches!(result, Err(WizardError::NotFound(SuggestionId(99)))));
    }

    #[tokio::test]
    async fn test_missing_fields_redirect_to_earliest_step() {
        let state = TestState::new();
        let event = state.store.put_draft(OWNER);
        let owner = state.user(OWNER);

        let url = redirect(show_step(&state, &owner, event.id, Step::Summary).await.unwrap());
        assert_eq!(url, format!("/suggest/{}/description/", event.id));

        let url = redirect(
            submit_step(
                &state,
                &owner,
                event.id,
                StepForm::Placeholder(PlaceholderForm::default()),
            )
            .await
            .unwrap(),
        );
        assert_eq!(url, format!("/suggest/{}/description/", event.id));
    }

    #[tokio::test]
    async fn test_title_step_changes_title_and_slug() {
        let state = TestState::new();
        let event = state.store.put_draft(OWNER);
        state.store.insert_published_slug("taken");
        let owner = state.user(OWNER);

        let rejected = page_of(
            submit_step(
                &state,
                &owner,
                event.id,
                StepForm::Title(TitleForm {
                    title: "Town Hall".to_string(),
                    slug: "Taken".to_string(),
                }),
            )
            .await
            .unwrap(),
        );
        assert_eq!(rejected.errors.get(Field::Slug), Some(&[SLUG_IN_USE.to_string()][..]));
        assert_eq!(state.store.suggestion(event.id), Some(event.clone()));

        let url = redirect(
            submit_step(
                &state,
                &owner,
                event.id,
                StepForm::Title(TitleForm {
                    title: "Town Hall".to_string(),
                    slug: "town-hall".to_string(),
                }),
            )
            .await
            .unwrap(),
        );
        assert_eq!(url, format!("/suggest/{}/description/", event.id));
        let saved = state.store.suggestion(event.id).unwrap();
        assert_eq!(saved.title, "Town Hall");
        assert_eq!(saved.slug.as_ref(), "town-hall");
    }

    #[tokio::test]
    async fn test_description_step() {
        let state = TestState::new();
        let event = state.store.put_draft(OWNER);
        let owner = state.user(OWNER);

        let page = page_of(
            submit_step(
                &state,
                &owner,
                event.id,
                StepForm::Description(DescriptionForm::default()),
            )
            .await
            .unwrap(),
        );
        assert_eq!(page.errors.get(Field::Description), Some(&[REQUIRED.to_string()][..]));

        let url = redirect(
            submit_step(
                &state,
                &owner,
                event.id,
                StepForm::Description(DescriptionForm {
                    description: " Quarterly all hands ".to_string(),
                    short_description: "All hands".to_string(),
                }),
            )
            .await
            .unwrap(),
        );
        assert_eq!(url, format!("/suggest/{}/details/", event.id));
        let saved = state.store.suggestion(event.id).unwrap();
        assert_eq!(saved.description, "Quarterly all hands");
        assert_eq!(saved.short_description, "All hands");
        assert_eq!(saved.modified, now());
    }

    #[tokio::test]
    async fn test_details_step_converts_local_time() {
        let state = TestState::new();
        let mut event = state.store.put_draft(OWNER);
        event.description = "Quarterly all hands".to_string();
        state.store.put(event.clone());
        let owner = state.user(OWNER);

        let page = page_of(show_step(&state, &owner, event.id, Step::Details).await.unwrap());
        let choices = page.choices.unwrap();
        assert_eq!(choices.locations.len(), 2);
        assert_eq!(choices.channels.len(), 2);

        let url = redirect(
            submit_step(
                &state,
                &owner,
                event.id,
                StepForm::Details(details_form("1", "2014-01-01 12:00", &["1", "2"])),
            )
            .await
            .unwrap(),
        );
        assert_eq!(url, format!("/suggest/{}/placeholder/", event.id));

        let saved = state.store.suggestion(event.id).unwrap();
        assert_eq!(
            saved.start_time,
            Some(Utc.with_ymd_and_hms(2014, 1, 1, 20, 0, 0).unwrap())
        );
        assert_eq!(saved.location.map(|location| location.name), Some("Mountain View".to_string()));
        assert_eq!(saved.channels, BTreeSet::from([ChannelId(1), ChannelId(2)]));
        assert_eq!(saved.privacy, airmozilla_common::Privacy::Company);

        let page = page_of(show_step(&state, &owner, event.id, Step::Details).await.unwrap());
        assert_eq!(
            page.form.get("start_time"),
            Some(&FieldValue::Text("2014-01-01 12:00:00".to_string()))
        );
    }

    #[tokio::test]
    async fn test_invalid_details_do_not_mutate() {
        let state = TestState::new();
        let mut event = state.store.put_draft(OWNER);
        event.description = "Quarterly all hands".to_string();
        state.store.put(event.clone());
        let owner = state.user(OWNER);

        let page = page_of(
            submit_step(
                &state,
                &owner,
                event.id,
                StepForm::Details(details_form("1", "2014-03-09 02:30", &["77"])),
            )
            .await
            .unwrap(),
        );

        assert_eq!(page.step, Step::Details);
        assert!(page.errors.get(Field::StartTime).is_some());
        assert_eq!(page.errors.get(Field::Channels), Some(&[INVALID_CHOICE.to_string()][..]));
        assert_eq!(
            page.form.get("start_time"),
            Some(&FieldValue::Text("2014-03-09 02:30".to_string()))
        );
        assert_eq!(state.store.suggestion(event.id), Some(event));
    }

    #[tokio::test]
    async fn test_placeholder_upload_is_stored() {
        let state = TestState::new();
        let event = state.store.put_complete_draft(OWNER);
        let owner = state.user(OWNER);
        let upload = Upload {
            file_name: "poster.png".to_string(),
            content_type: Some("image/png".to_string()),
            bytes: vec![137, 80, 78, 71],
        };

        let url = redirect(
            submit_step(
                &state,
                &owner,
                event.id,
                StepForm::Placeholder(PlaceholderForm {
                    placeholder_img: Some(upload),
                }),
            )
            .await
            .unwrap(),
        );

        assert_eq!(url, format!("/suggest/{}/summary/", event.id));
        assert_eq!(
            state.store.suggestion(event.id).unwrap().placeholder_img.as_deref(),
            Some("placeholders/poster.png")
        );
        assert_eq!(state.storage.stored(), vec!["placeholders/poster.png".to_string()]);
    }

    #[tokio::test]
    async fn test_submit_then_retract_notifies_once() {
        let state = TestState::new();
        let event = state.store.put_complete_draft(OWNER);
        let owner = state.user(OWNER);

        let url = redirect(toggle_submission(&state, &owner, event.id, &base_url()).await.unwrap());
        assert_eq!(url, format!("/suggest/{}/summary/", event.id));
        assert_eq!(state.store.suggestion(event.id).unwrap().submitted, Some(now()));

        toggle_submission(&state, &owner, event.id, &base_url())
            .await
            .unwrap();
        assert_eq!(state.store.suggestion(event.id).unwrap().submitted, None);

        let sent = state.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "[Air Mozilla] New suggested event: Weekly Sync");
        assert_eq!(
            sent[0].to,
            vec!["reviewer@example.com".to_string(), "root@example.com".to_string()]
        );
        assert!(sent[0].body.contains(&format!("http://localhost:3000/suggest/{}/summary/", event.id)));
    }

    #[tokio::test]
    async fn test_submission_without_reviewers_fails_without_change() {
        let state = TestState::new();
        state.store.set_email(REVIEWER, "");
        state.store.set_email(ROOT, "");
        let event = state.store.put_complete_draft(OWNER);

        let result = toggle_submission(&state, &state.user(OWNER), event.id, &base_url()).await;

        assert!(matches!(
            result,
            Err(WizardError::Notification(NotificationError::NoRecipients(_)))
        ));
        assert_eq!(state.store.suggestion(event.id), Some(event));
        assert!(state.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_failed_delivery_restores_draft() {
        let state = TestState::new();
        state.mailer.fail_next();
        let event = state.store.put_complete_draft(OWNER);

        let result = toggle_submission(&state, &state.user(OWNER), event.id, &base_url()).await;

        assert!(matches!(
            result,
            Err(WizardError::Notification(NotificationError::Mail(_)))
        ));
        assert_eq!(state.store.suggestion(event.id).unwrap().submitted, None);
    }

    #[tokio::test]
    async fn test_reviewer_reads_submitted_summary_only() {
        let state = TestState::new();
        let event = state.store.put_complete_draft(OWNER);
        let reviewer = state.user(REVIEWER);

        let result = show_step(&state, &reviewer, event.id, Step::Summary).await;
        assert!(matches!(result, Err(WizardError::NotSubmitted)));

        toggle_submission(&state, &state.user(OWNER), event.id, &base_url())
            .await
            .unwrap();

        let page = page_of(show_step(&state, &reviewer, event.id, Step::Summary).await.unwrap());
        assert_eq!(page.access, Access::Reviewer);

        let result = toggle_submission(&state, &reviewer, event.id, &base_url()).await;
        assert!(matches!(result, Err(WizardError::NotYourEvent)));
        assert!(state.store.suggestion(event.id).unwrap().submitted.is_some());
    }

    #[tokio::test]
    async fn test_reviewer_sees_summary_after_location_removed() {
        let state = TestState::new();
        let event = state.store.put_complete_draft(OWNER);
        toggle_submission(&state, &state.user(OWNER), event.id, &base_url())
            .await
            .unwrap();

        let mut submitted = state.store.suggestion(event.id).unwrap();
        submitted.location = None;
        state.store.put(submitted);

        let page = page_of(
            show_step(&state, &state.user(REVIEWER), event.id, Step::Summary)
                .await
                .unwrap(),
        );
        assert_eq!(page.access, Access::Reviewer);
        assert_eq!(page.event.unwrap().local_start_time().unwrap(), None);

        // the owner is still sent back to fill it in
        let url = redirect(
            show_step(&state, &state.user(OWNER), event.id, Step::Summary)
                .await
                .unwrap(),
        );
        assert_eq!(url, "/suggest/1/details/");
    }

    #[tokio::test]
    async fn test_delete_then_not_found() {
        let state = TestState::new();
        let event = state.store.put_complete_draft(OWNER);
        let owner = state.user(OWNER);

        let url = redirect(delete(&state, &owner, event.id).await.unwrap());
        assert_eq!(url, "/suggest/");

        let result = show_step(&state, &owner, event.id, Step::Summary).await;
        assert!(matches!(result, Err(WizardError::NotFound(_))));
    }
}
