use airmozilla_common::{Channel, Event, FlatPage, Privacy, Slug, User};
use serde::Serialize;

use crate::domain::repository::{EventCatalog, EventFilter, RepositoryError};
use crate::domain::{AppState, Clock};

/// Pages under this path render without sidebar
pub const MANAGE_PATH: &str = "/manage/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feed {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sidebar {
    /// Channel the feed and flat pages belong to
    pub channel: Channel,
    pub feed: Feed,
    pub featured: Vec<Event>,
    pub upcoming: Vec<Event>,
    pub sidebar_top: Option<FlatPage>,
    pub sidebar_bottom: Option<FlatPage>,
}

#[derive(Debug, thiserror::Error)]
pub enum SidebarError {
    #[error("default channel '{0}' does not exist")]
    MissingDefaultChannel(Slug),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub fn is_skipped(path: &str) -> bool {
    path.contains(MANAGE_PATH)
}

/// Widest feed the viewer may read
pub fn feed_privacy(viewer: Option<&User>) -> Privacy {
    match viewer {
        Some(user) if user.is_active && user.contributor => Privacy::Contributors,
        Some(user) if user.is_active => Privacy::Company,
        _ => Privacy::Public,
    }
}

/// The site feed when the default channel is active, otherwise the feed of
/// the first active channel.
pub fn feed_for(
    active: &[Channel],
    default_slug: &Slug,
    privacy: Privacy,
) -> Option<(Channel, Feed)> {
    if let Some(default) = active.iter().find(|channel| &channel.slug == default_slug) {
        let feed = Feed {
            title: "AirMozilla RSS".to_string(),
            url: format!("/feed/{}/", privacy),
        };
        return Some((default.clone(), feed));
    }

    active.first().map(|channel| {
        let feed = Feed {
            title: format!("AirMozilla - {} - RSS", channel.name),
            url: format!("/channels/{}/feed/{}/", channel.slug, privacy),
        };
        (channel.clone(), feed)
    })
}

/// Builds the sidebar for a page at `path`, or `None` when the page has none.
///
/// `requested` are channel slugs the page is about; unknown ones are
/// ignored and without any known one the default channel is used.
pub async fn assemble<S: AppState>(
    state: &S,
    path: &str,
    requested: &[Slug],
    viewer: Option<&User>,
) -> Result<Option<Sidebar>, SidebarError> {
    if is_skipped(path) {
        return Ok(None);
    }

    let catalog = state.catalog();
    let config = state.config();
    let default_slug = &config.default_channel_slug;
    let missing_default = || SidebarError::MissingDefaultChannel(default_slug.clone());

    let mut active = if requested.is_empty() {
        Vec::new()
    } else {
        catalog.channels_by_slugs(requested).await?
    };
    if active.is_empty() {
        let default = catalog
            .channel_by_slug(default_slug)
            .await?
            .ok_or_else(missing_default)?;
        active.push(default);
    }

    let privacy = feed_privacy(viewer);
    let (channel, feed) = feed_for(&active, default_slug, privacy).ok_or_else(missing_default)?;

    let filter = EventFilter {
        channels: active.iter().map(|channel| channel.id).collect(),
        public_only: !viewer.is_some_and(|user| user.is_active),
        now: state.clock().now(),
    };
    let top = format!("sidebar_top_{}", channel.slug);
    let bottom = format!("sidebar_bottom_{}", channel.slug);

    let (featured, upcoming, sidebar_top, sidebar_bottom) = futures::try_join!(
        catalog.featured_events(&filter),
        catalog.upcoming_events(&filter, config.upcoming_sidebar_count),
        catalog.flatpage(&top),
        catalog.flatpage(&bottom),
    )?;

    Ok(Some(Sidebar {
        channel,
        feed,
        featured,
        upcoming,
        sidebar_top,
        sidebar_bottom,
    }))
}
