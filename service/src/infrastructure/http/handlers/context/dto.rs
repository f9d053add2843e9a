use airmozilla_common::{Channel, Event, FlatPage};
use serde::Serialize;

use crate::domain::sidebar::{Feed, Sidebar};

/// Response for sidebar route
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SidebarResponse {
    channel: Channel,
    feed: Feed,
    featured: Vec<Event>,
    upcoming: Vec<Event>,
    sidebar_top: Option<FlatPage>,
    sidebar_bottom: Option<FlatPage>,
}

impl From<Sidebar> for SidebarResponse {
    fn from(value: Sidebar) -> Self {
        Self {
            channel: value.channel,
            feed: value.feed,
            featured: value.featured,
            upcoming: value.upcoming,
            sidebar_top: value.sidebar_top,
            sidebar_bottom: value.sidebar_bottom,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsResponse {
    pub include_analytics: bool,
}
