use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::domain::{
    Channel, ChannelId, Event, EventId, EventStatus, FlatPage, Location, LocationId, Privacy,
    Slug, User, UserId,
};

// Builders for entities used by tests.
// Public so that other crates can reuse them for their own tests.

/// Active, regular (non staff, non contributor) user.
pub fn make_user(id: i64, email: &str) -> User {
    User {
        id: UserId(id),
        username: format!("user{}", id),
        email: email.to_string(),
        is_active: true,
        is_superuser: false,
        contributor: false,
        permissions: HashSet::new(),
    }
}

/// Active user holding the given permission codename.
pub fn make_staff(id: i64, email: &str, codename: &str) -> User {
    let mut user = make_user(id, email);
    user.permissions.insert(codename.to_string());
    user
}

pub fn make_channel(id: i64, slug: &str, name: &str) -> Channel {
    Channel {
        id: ChannelId(id),
        slug: Slug::try_new(slug).unwrap(),
        name: name.to_string(),
    }
}

pub fn make_location(id: i64, name: &str, timezone: &str) -> Location {
    Location {
        id: LocationId(id),
        name: name.to_string(),
        timezone: timezone.to_string(),
    }
}

/// Scheduled, public, not featured, not archived event.
pub fn make_event(id: i64, slug: &str, start_time: DateTime<Utc>) -> Event {
    Event {
        id: EventId(id),
        title: slug.replace('-', " "),
        slug: slug.to_string(),
        description: String::new(),
        status: EventStatus::Scheduled,
        privacy: Privacy::Public,
        featured: false,
        start_time,
        archive_time: None,
        placeholder_img: None,
    }
}

pub fn make_flatpage(url: &str, content: &str) -> FlatPage {
    FlatPage {
        url: url.to_string(),
        title: url.to_string(),
        content: content.to_string(),
    }
}
