use airmozilla_common::Slug;
use chrono::{DateTime, Utc};

use crate::domain::notification::Mailer;
use crate::domain::repository::{
    EventCatalog, ReviewerDirectory, SuggestionRepository, UserDirectory,
};
use crate::domain::storage::PlaceholderStorage;

pub mod notification;
pub mod repository;
pub mod sidebar;
pub mod slug;
pub mod storage;
pub mod suggestion;
pub mod timezone;

/// Source of the current instant. Slug dates and timestamps come from here.
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Settings of the suggestion flow and the sidebar, resolved once at startup.
#[derive(Debug, Clone)]
pub struct SuggestConfig {
    /// Channel new suggestions are attached to, and the sidebar falls back to
    pub default_channel_slug: Slug,
    pub upcoming_sidebar_count: usize,
    pub include_analytics: bool,
    pub email_from_address: String,
    pub login_url: String,
    /// Largest request body accepted by the wizard steps
    pub max_upload_bytes: usize,
}

/// The global application state shared between all request handlers.
pub trait AppState: Clone + Send + Sync + 'static {
    type R: SuggestionRepository;
    type U: UserDirectory;
    type C: EventCatalog;
    type V: ReviewerDirectory;
    type M: Mailer;
    type P: PlaceholderStorage;
    type K: Clock;

    fn suggestions(&self) -> &Self::R;
    fn users(&self) -> &Self::U;
    fn catalog(&self) -> &Self::C;
    fn reviewers(&self) -> &Self::V;
    fn mailer(&self) -> &Self::M;
    fn storage(&self) -> &Self::P;
    fn clock(&self) -> &Self::K;
    fn config(&self) -> &SuggestConfig;
}
