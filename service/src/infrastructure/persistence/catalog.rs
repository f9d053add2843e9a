use airmozilla_common::database::Database;
use airmozilla_common::{Channel, ChannelId, Event, FlatPage, Location, LocationId, Slug};
use itertools::Itertools;

use crate::domain::repository::{EventCatalog, EventFilter, RepositoryError};
use crate::infrastructure::persistence::{
    channel_from_row, event_from_row, flatpage_from_row, location_from_row,
};

const FEATURED_EVENTS: &str = r#"
SELECT e.id, e.title, e.slug, e.description, e.status, e.privacy, e.featured,
       e.start_time, e.archive_time, e.placeholder_img
FROM events e
WHERE e.status = 'scheduled'
  AND e.featured
  AND e.archive_time IS NOT NULL AND e.archive_time <= $2
  AND e.start_time <= $2
  AND EXISTS (
      SELECT 1 FROM event_channels ec
      WHERE ec.event_id = e.id AND ec.channel_id = ANY($1)
  )
  AND (NOT $3 OR e.privacy = 'public')
ORDER BY e.start_time DESC
"#;

const UPCOMING_EVENTS: &str = r#"
SELECT e.id, e.title, e.slug, e.description, e.status, e.privacy, e.featured,
       e.start_time, e.archive_time, e.placeholder_img
FROM events e
WHERE e.status = 'scheduled'
  AND e.archive_time IS NULL
  AND e.start_time > $2
  AND EXISTS (
      SELECT 1 FROM event_channels ec
      WHERE ec.event_id = e.id AND ec.channel_id = ANY($1)
  )
  AND (NOT $3 OR e.privacy = 'public')
ORDER BY e.start_time
LIMIT $4
"#;

#[derive(Clone)]
pub struct PostgresEventCatalog {
    database: &'static Database,
}

impl PostgresEventCatalog {
    pub fn new(database: &'static Database) -> Self {
        Self { database }
    }
}

impl EventCatalog for PostgresEventCatalog {
    async fn channel_by_slug(&self, slug: &Slug) -> Result<Option<Channel>, RepositoryError> {
        let row = sqlx::query("SELECT id, slug, name FROM channels WHERE slug = $1")
            .bind(slug.to_string())
            .fetch_optional(self.database.database_pool())
            .await?;
        row.as_ref().map(channel_from_row).transpose()
    }

    async fn channels_by_slugs(&self, slugs: &[Slug]) -> Result<Vec<Channel>, RepositoryError> {
        let values: Vec<String> = slugs.iter().map(Slug::to_string).collect();
        let rows = sqlx::query("SELECT id, slug, name FROM channels WHERE slug = ANY($1)")
            .bind(values)
            .fetch_all(self.database.database_pool())
            .await?;
        let channels: Vec<Channel> = rows.iter().map(channel_from_row).try_collect()?;

        // keep the order the slugs were asked in
        Ok(slugs
            .iter()
            .unique()
            .filter_map(|slug| channels.iter().find(|channel| &channel.slug == slug))
            .cloned()
            .collect())
    }

    async fn channels_by_ids(&self, ids: &[ChannelId]) -> Result<Vec<Channel>, RepositoryError> {
        let values: Vec<i64> = ids.iter().map(|id| id.0).collect();
        let rows = sqlx::query("SELECT id, slug, name FROM channels WHERE id = ANY($1) ORDER BY id")
            .bind(values)
            .fetch_all(self.database.database_pool())
            .await?;
        rows.iter().map(channel_from_row).collect()
    }

    async fn channels(&self) -> Result<Vec<Channel>, RepositoryError> {
        let rows = sqlx::query("SELECT id, slug, name FROM channels ORDER BY name")
            .fetch_all(self.database.database_pool())
            .await?;
        rows.iter().map(channel_from_row).collect()
    }

    async fn location(&self, id: LocationId) -> Result<Option<Location>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, timezone FROM locations WHERE id = $1")
            .bind(id.0)
            .fetch_optional(self.database.database_pool())
            .await?;
        row.as_ref().map(location_from_row).transpose()
    }

    async fn locations(&self) -> Result<Vec<Location>, RepositoryError> {
        let rows = sqlx::query("SELECT id, name, timezone FROM locations ORDER BY name")
            .fetch_all(self.database.database_pool())
            .await?;
        rows.iter().map(location_from_row).collect()
    }

    async fn featured_events(&self, filter: &EventFilter) -> Result<Vec<Event>, RepositoryError> {
        let rows = sqlx::query(FEATURED_EVENTS)
            .bind(channel_ids(filter))
            .bind(filter.now)
            .bind(filter.public_only)
            .fetch_all(self.database.database_pool())
            .await?;
        rows.iter().map(event_from_row).collect()
    }

    async fn upcoming_events(
        &self,
        filter: &EventFilter,
        limit: usize,
    ) -> Result<Vec<Event>, RepositoryError> {
        let rows = sqlx::query(UPCOMING_EVENTS)
            .bind(channel_ids(filter))
            .bind(filter.now)
            .bind(filter.public_only)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(self.database.database_pool())
            .await?;
        rows.iter().map(event_from_row).collect()
    }

    async fn flatpage(&self, url: &str) -> Result<Option<FlatPage>, RepositoryError> {
        let row = sqlx::query("SELECT url, title, content FROM flatpages WHERE url = $1")
            .bind(url)
            .fetch_optional(self.database.database_pool())
            .await?;
        row.as_ref().map(flatpage_from_row).transpose()
    }
}

fn channel_ids(filter: &EventFilter) -> Vec<i64> {
    filter.channels.iter().map(|channel| channel.0).collect()
}
