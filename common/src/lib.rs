mod domain;

pub mod database;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Table names shared by the migration tool and the service adapters

pub const USERS_TABLE: &'static str = "users";
pub const GROUPS_TABLE: &'static str = "groups";
pub const USER_GROUPS_TABLE: &'static str = "user_groups";
pub const GROUP_PERMISSIONS_TABLE: &'static str = "group_permissions";
pub const USER_PERMISSIONS_TABLE: &'static str = "user_permissions";
pub const CHANNELS_TABLE: &'static str = "channels";
pub const LOCATIONS_TABLE: &'static str = "locations";
pub const EVENTS_TABLE: &'static str = "events";
pub const EVENT_CHANNELS_TABLE: &'static str = "event_channels";
pub const SUGGESTED_EVENTS_TABLE: &'static str = "suggested_events";
pub const SUGGESTED_EVENT_CHANNELS_TABLE: &'static str = "suggested_event_channels";
pub const FLATPAGES_TABLE: &'static str = "flatpages";

// Common field names

pub const ID_FIELD_NAME: &'static str = "id";
pub const SLUG_FIELD_NAME: &'static str = "slug";
pub const CREATED_FIELD_NAME: &'static str = "created_at";
pub const MODIFIED_FIELD_NAME: &'static str = "modified_at";
pub const SUBMITTED_FIELD_NAME: &'static str = "submitted_at";

/// Codename of the permission that lets staff review suggested events.
pub const ADD_EVENT_PERMISSION: &'static str = "add_event";

// expose domain module

pub use domain::*;
