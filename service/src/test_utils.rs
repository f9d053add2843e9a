// In-memory adapters of every domain port, seeded with a small catalog.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use airmozilla_common::test_utils::{
    make_channel, make_event, make_location, make_staff, make_user,
};
use airmozilla_common::{
    ADD_EVENT_PERMISSION, Channel, ChannelId, Event, FlatPage, Location, LocationId, Privacy,
    Slug, User, UserId,
};
use chrono::{DateTime, TimeZone, Utc};

use crate::domain::notification::{MailError, Mailer, OutgoingEmail};
use crate::domain::repository::{
    EventCatalog, EventFilter, RepositoryError, ReviewerDirectory, SuggestionRepository,
    UserDirectory,
};
use crate::domain::storage::{PlaceholderStorage, StorageError, Upload};
use crate::domain::suggestion::{NewSuggestion, SuggestedEvent, SuggestionId};
use crate::domain::{AppState, Clock, SuggestConfig};

pub const OWNER: i64 = 10;
pub const REVIEWER: i64 = 20;
pub const STRANGER: i64 = 30;
pub const ROOT: i64 = 40;
pub const CONTRIBUTOR: i64 = 50;

/// 2014-01-01 12:00 UTC
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2014, 1, 1, 12, 0, 0).unwrap()
}

/// Fresh draft in the default channel with only a title
pub fn draft(id: i64, owner: i64) -> SuggestedEvent {
    SuggestedEvent {
        id: SuggestionId(id),
        owner: UserId(owner),
        title: "Weekly Sync".to_string(),
        slug: Slug::try_new("weekly-sync").unwrap(),
        description: String::new(),
        short_description: String::new(),
        channels: BTreeSet::from([ChannelId(1)]),
        location: None,
        start_time: None,
        privacy: Privacy::Public,
        placeholder_img: None,
        submitted: None,
        created: now(),
        modified: now(),
    }
}

#[derive(Default)]
struct Data {
    last_id: i64,
    suggestions: BTreeMap<SuggestionId, SuggestedEvent>,
    users: HashMap<UserId, User>,
    channels: Vec<Channel>,
    locations: Vec<Location>,
    events: Vec<(Event, Vec<ChannelId>)>,
    flatpages: Vec<FlatPage>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<Data>>,
}

impl MemoryStore {
    pub fn add_user(&self, user: User) {
        self.data.lock().unwrap().users.insert(user.id, user);
    }

    pub fn set_email(&self, id: i64, email: &str) {
        let mut data = self.data.lock().unwrap();
        if let Some(user) = data.users.get_mut(&UserId(id)) {
            user.email = email.to_string();
        }
    }

    pub fn add_channel(&self, channel: Channel) {
        self.data.lock().unwrap().channels.push(channel);
    }

    pub fn remove_channel(&self, id: i64) {
        self.data
            .lock()
            .unwrap()
            .channels
            .retain(|channel| channel.id != ChannelId(id));
    }

    pub fn add_location(&self, location: Location) {
        self.data.lock().unwrap().locations.push(location);
    }

    pub fn add_event(&self, event: Event, channels: &[i64]) {
        let channels = channels.iter().copied().map(ChannelId).collect();
        self.data.lock().unwrap().events.push((event, channels));
    }

    pub fn add_flatpage(&self, page: FlatPage) {
        self.data.lock().unwrap().flatpages.push(page);
    }

    /// Published event occupying `slug`
    pub fn insert_published_slug(&self, slug: &str) {
        let id = self.data.lock().unwrap().events.len() as i64 + 1000;
        self.add_event(make_event(id, slug, now()), &[1]);
    }

    pub fn put(&self, event: SuggestedEvent) {
        let mut data = self.data.lock().unwrap();
        data.last_id = data.last_id.max(event.id.0);
        data.suggestions.insert(event.id, event);
    }

    /// Stores a title-only draft under a new id
    pub fn put_draft(&self, owner: i64) -> SuggestedEvent {
        let id = self.data.lock().unwrap().last_id + 1;
        let mut event = draft(id, owner);
        event.slug = Slug::try_new(format!("weekly-sync-{}", id)).unwrap();
        self.put(event.clone());
        event
    }

    /// Stores a draft ready for the placeholder and summary steps
    pub fn put_complete_draft(&self, owner: i64) -> SuggestedEvent {
        let mut event = self.put_draft(owner);
        event.description = "Quarterly all hands".to_string();
        event.location = Some(make_location(1, "Mountain View", "America/Los_Angeles"));
        event.start_time = Some(Utc.with_ymd_and_hms(2014, 1, 1, 20, 0, 0).unwrap());
        self.put(event.clone());
        event
    }

    pub fn suggestion(&self, id: SuggestionId) -> Option<SuggestedEvent> {
        self.data.lock().unwrap().suggestions.get(&id).cloned()
    }

    /// Every stored suggestion, by id
    pub fn suggestions(&self) -> Vec<SuggestedEvent> {
        self.data
            .lock()
            .unwrap()
            .suggestions
            .values()
            .cloned()
            .collect()
    }
}

impl SuggestionRepository for MemoryStore {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<SuggestedEvent>, RepositoryError> {
        let data = self.data.lock().unwrap();
        let mut events: Vec<SuggestedEvent> = data
            .suggestions
            .values()
            .filter(|event| event.owner == user_id)
            .cloned()
            .collect();
        events.sort_by_key(|event| event.modified);
        Ok(events)
    }

    async fn find_by_id(&self, id: SuggestionId) -> Result<Option<SuggestedEvent>, RepositoryError> {
        Ok(self.suggestion(id))
    }

    async fn slug_taken(
        &self,
        slug: &Slug,
        except: Option<SuggestionId>,
    ) -> Result<bool, RepositoryError> {
        let data = self.data.lock().unwrap();
        let slug = slug.as_ref();
        let published = data
            .events
            .iter()
            .any(|(event, _)| event.slug.eq_ignore_ascii_case(slug));
        let suggested = data.suggestions.values().any(|event| {
            Some(event.id) != except && event.slug.as_ref().eq_ignore_ascii_case(slug)
        });
        Ok(published || suggested)
    }

    async fn title_taken(
        &self,
        user_id: UserId,
        title: &str,
        except: Option<SuggestionId>,
    ) -> Result<bool, RepositoryError> {
        let data = self.data.lock().unwrap();
        let title = title.to_lowercase();
        Ok(data.suggestions.values().any(|event| {
            event.owner == user_id
                && Some(event.id) != except
                && event.title.to_lowercase() == title
        }))
    }

    async fn create(&self, suggestion: NewSuggestion) -> Result<SuggestedEvent, RepositoryError> {
        let mut data = self.data.lock().unwrap();
        data.last_id += 1;
        let event = SuggestedEvent {
            id: SuggestionId(data.last_id),
            owner: suggestion.owner,
            title: suggestion.title,
            slug: suggestion.slug,
            description: String::new(),
            short_description: String::new(),
            channels: suggestion.channels,
            location: None,
            start_time: None,
            privacy: Privacy::default(),
            placeholder_img: None,
            submitted: None,
            created: suggestion.created,
            modified: suggestion.created,
        };
        data.suggestions.insert(event.id, event.clone());
        Ok(event)
    }

    async fn update(&self, suggestion: &SuggestedEvent) -> Result<SuggestedEvent, RepositoryError> {
        let mut data = self.data.lock().unwrap();
        match data.suggestions.get_mut(&suggestion.id) {
            Some(stored) => {
                *stored = suggestion.clone();
                Ok(suggestion.clone())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, id: SuggestionId) -> Result<(), RepositoryError> {
        let mut data = self.data.lock().unwrap();
        data.suggestions
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

impl UserDirectory for MemoryStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.data.lock().unwrap().users.get(&id).cloned())
    }
}

impl ReviewerDirectory for MemoryStore {
    async fn reviewer_emails(&self, codename: &str) -> Result<Vec<String>, RepositoryError> {
        let data = self.data.lock().unwrap();
        Ok(data
            .users
            .values()
            .filter(|user| user.is_superuser || user.permissions.contains(codename))
            .map(|user| user.email.clone())
            .collect())
    }
}

impl MemoryStore {
    fn listed(&self, filter: &EventFilter, keep: impl Fn(&Event) -> bool) -> Vec<Event> {
        let data = self.data.lock().unwrap();
        data.events
            .iter()
            .filter(|(event, channels)| {
                keep(event)
                    && channels.iter().any(|channel| filter.channels.contains(channel))
                    && (!filter.public_only || event.privacy == Privacy::Public)
            })
            .map(|(event, _)| event.clone())
            .collect()
    }
}

impl EventCatalog for MemoryStore {
    async fn channel_by_slug(&self, slug: &Slug) -> Result<Option<Channel>, RepositoryError> {
        let data = self.data.lock().unwrap();
        Ok(data.channels.iter().find(|channel| &channel.slug == slug).cloned())
    }

    async fn channels_by_slugs(&self, slugs: &[Slug]) -> Result<Vec<Channel>, RepositoryError> {
        let data = self.data.lock().unwrap();
        Ok(slugs
            .iter()
            .filter_map(|slug| data.channels.iter().find(|channel| &channel.slug == slug))
            .cloned()
            .collect())
    }

    async fn channels_by_ids(&self, ids: &[ChannelId]) -> Result<Vec<Channel>, RepositoryError> {
        let data = self.data.lock().unwrap();
        Ok(data
            .channels
            .iter()
            .filter(|channel| ids.contains(&channel.id))
            .cloned()
            .collect())
    }

    async fn channels(&self) -> Result<Vec<Channel>, RepositoryError> {
        Ok(self.data.lock().unwrap().channels.clone())
    }

    async fn location(&self, id: LocationId) -> Result<Option<Location>, RepositoryError> {
        let data = self.data.lock().unwrap();
        Ok(data.locations.iter().find(|location| location.id == id).cloned())
    }

    async fn locations(&self) -> Result<Vec<Location>, RepositoryError> {
        Ok(self.data.lock().unwrap().locations.clone())
    }

    async fn featured_events(&self, filter: &EventFilter) -> Result<Vec<Event>, RepositoryError> {
        let mut events = self.listed(filter, |event| event.featured && event.is_archived(filter.now));
        events.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(events)
    }

    async fn upcoming_events(
        &self,
        filter: &EventFilter,
        limit: usize,
    ) -> Result<Vec<Event>, RepositoryError> {
        let mut events = self.listed(filter, |event| event.is_upcoming(filter.now));
        events.sort_by_key(|event| event.start_time);
        events.truncate(limit);
        Ok(events)
    }

    async fn flatpage(&self, url: &str) -> Result<Option<FlatPage>, RepositoryError> {
        let data = self.data.lock().unwrap();
        Ok(data.flatpages.iter().find(|page| page.url == url).cloned())
    }
}

/// Keeps sent messages; fails the next delivery on request
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err(MailError::Transport("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryStorage {
    stored: Arc<Mutex<Vec<String>>>,
}

impl MemoryStorage {
    pub fn stored(&self) -> Vec<String> {
        self.stored.lock().unwrap().clone()
    }
}

impl PlaceholderStorage for MemoryStorage {
    async fn store(
        &self,
        _id: SuggestionId,
        upload: &Upload,
        _now: DateTime<Utc>,
    ) -> Result<String, StorageError> {
        let reference = format!("placeholders/{}", upload.file_name);
        self.stored.lock().unwrap().push(reference.clone());
        Ok(reference)
    }
}

#[derive(Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Clone)]
pub struct TestState {
    pub store: MemoryStore,
    pub mailer: RecordingMailer,
    pub storage: MemoryStorage,
    pub clock: FixedClock,
    pub config: SuggestConfig,
}

impl TestState {
    /// Channels `main` (1, default) and `music` (2), two locations and one
    /// user per role.
    pub fn new() -> Self {
        let store = MemoryStore::default();
        store.add_channel(make_channel(1, "main", "Main"));
        store.add_channel(make_channel(2, "music", "Music"));
        store.add_location(make_location(1, "Mountain View", "America/Los_Angeles"));
        store.add_location(make_location(2, "London", "Europe/London"));

        store.add_user(make_user(OWNER, "owner@example.com"));
        store.add_user(make_staff(REVIEWER, "reviewer@example.com", ADD_EVENT_PERMISSION));
        store.add_user(make_user(STRANGER, "stranger@example.com"));
        let mut root = make_user(ROOT, "root@example.com");
        root.is_superuser = true;
        store.add_user(root);
        let mut contributor = make_user(CONTRIBUTOR, "volunteer@example.com");
        contributor.contributor = true;
        store.add_user(contributor);

        let config = SuggestConfig {
            default_channel_slug: Slug::try_new("main").unwrap(),
            upcoming_sidebar_count: 5,
            include_analytics: true,
            email_from_address: "airmozilla@mozilla.com".to_string(),
            login_url: "/login/".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        };

        Self {
            store,
            mailer: RecordingMailer::default(),
            storage: MemoryStorage::default(),
            clock: FixedClock(now()),
            config,
        }
    }

    pub fn user(&self, id: i64) -> User {
        self.store
            .data
            .lock()
            .unwrap()
            .users
            .get(&UserId(id))
            .cloned()
            .unwrap()
    }
}

impl AppState for TestState {
    type R = MemoryStore;
    type U = MemoryStore;
    type C = MemoryStore;
    type V = MemoryStore;
    type M = RecordingMailer;
    type P = MemoryStorage;
    type K = FixedClock;

    fn suggestions(&self) -> &Self::R {
        &self.store
    }

    fn users(&self) -> &Self::U {
        &self.store
    }

    fn catalog(&self) -> &Self::C {
        &self.store
    }

    fn reviewers(&self) -> &Self::V {
        &self.store
    }

    fn mailer(&self) -> &Self::M {
        &self.mailer
    }

    fn storage(&self) -> &Self::P {
        &self.storage
    }

    fn clock(&self) -> &Self::K {
        &self.clock
    }

    fn config(&self) -> &SuggestConfig {
        &self.config
    }
}
