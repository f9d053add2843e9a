use std::future::Future;

use airmozilla_common::{
    Channel, ChannelId, Event, FlatPage, Location, LocationId, Slug, User, UserId,
};
use chrono::{DateTime, Utc};

use crate::domain::suggestion::{NewSuggestion, SuggestedEvent, SuggestionId};

pub trait SuggestionRepository: Send + Sync + 'static {
    /// Drafts created by the user, least recently modified first
    fn list_for_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<SuggestedEvent>, RepositoryError>> + Send;

    fn find_by_id(
        &self,
        id: SuggestionId,
    ) -> impl Future<Output = Result<Option<SuggestedEvent>, RepositoryError>> + Send;

    /// Case-insensitive lookup among published and suggested events.
    /// `except` excludes one suggestion, the one being edited.
    fn slug_taken(
        &self,
        slug: &Slug,
        except: Option<SuggestionId>,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Whether the user already has a suggestion with this title, ignoring case
    fn title_taken(
        &self,
        user_id: UserId,
        title: &str,
        except: Option<SuggestionId>,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    fn create(
        &self,
        suggestion: NewSuggestion,
    ) -> impl Future<Output = Result<SuggestedEvent, RepositoryError>> + Send;

    /// Persists every editable field and the channel set
    fn update(
        &self,
        suggestion: &SuggestedEvent,
    ) -> impl Future<Output = Result<SuggestedEvent, RepositoryError>> + Send;

    fn delete(&self, id: SuggestionId) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

pub trait UserDirectory: Send + Sync + 'static {
    fn find_user(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;
}

/// Addresses of the users allowed to review suggestions
pub trait ReviewerDirectory: Send + Sync + 'static {
    /// E-mails of group members holding `codename`, direct holders and superusers.
    /// May contain empty strings and duplicates.
    fn reviewer_emails(
        &self,
        codename: &str,
    ) -> impl Future<Output = Result<Vec<String>, RepositoryError>> + Send;
}

/// Read-only view on channels, locations, published events and flat pages
pub trait EventCatalog: Send + Sync + 'static {
    fn channel_by_slug(
        &self,
        slug: &Slug,
    ) -> impl Future<Output = Result<Option<Channel>, RepositoryError>> + Send;

    /// Existing channels among `slugs`, in the order given
    fn channels_by_slugs(
        &self,
        slugs: &[Slug],
    ) -> impl Future<Output = Result<Vec<Channel>, RepositoryError>> + Send;

    fn channels_by_ids(
        &self,
        ids: &[ChannelId],
    ) -> impl Future<Output = Result<Vec<Channel>, RepositoryError>> + Send;

    /// All channels, by name
    fn channels(&self) -> impl Future<Output = Result<Vec<Channel>, RepositoryError>> + Send;

    fn location(
        &self,
        id: LocationId,
    ) -> impl Future<Output = Result<Option<Location>, RepositoryError>> + Send;

    /// All locations, by name
    fn locations(&self) -> impl Future<Output = Result<Vec<Location>, RepositoryError>> + Send;

    /// Archived featured events, newest first
    fn featured_events(
        &self,
        filter: &EventFilter,
    ) -> impl Future<Output = Result<Vec<Event>, RepositoryError>> + Send;

    /// Events still to come, soonest first
    fn upcoming_events(
        &self,
        filter: &EventFilter,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Event>, RepositoryError>> + Send;

    fn flatpage(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Option<FlatPage>, RepositoryError>> + Send;
}

/// Restricts published event listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    pub channels: Vec<ChannelId>,
    pub public_only: bool,
    pub now: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    #[error("unique violation: {0}")]
    UniqueViolation(String),
    #[error("database error: {0}")]
    DatabaseError(String),
}
