use std::collections::BTreeSet;

use airmozilla_common::database::Database;
use airmozilla_common::{
    CREATED_FIELD_NAME, ChannelId, ID_FIELD_NAME, Location, LocationId, MODIFIED_FIELD_NAME,
    SLUG_FIELD_NAME, SUBMITTED_FIELD_NAME, Slug, UserId,
};
use futures::TryStreamExt;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Row};

use crate::domain::repository::{RepositoryError, SuggestionRepository};
use crate::domain::suggestion::{NewSuggestion, SuggestedEvent, SuggestionId};
use crate::infrastructure::persistence::{parse_column, slug_column};

const SELECT_SUGGESTIONS: &str = r#"
SELECT s.id, s.user_id, s.title, s.slug, s.description, s.short_description,
       s.start_time, s.privacy, s.placeholder_img,
       s.submitted_at, s.created_at, s.modified_at,
       l.id AS location_id, l.name AS location_name, l.timezone AS location_timezone,
       ARRAY(
           SELECT c.channel_id FROM suggested_event_channels c
           WHERE c.suggested_event_id = s.id
           ORDER BY c.channel_id
       ) AS channel_ids
FROM suggested_events s
LEFT JOIN locations l ON l.id = s.location_id
"#;

const SLUG_TAKEN: &str = r#"
SELECT EXISTS (SELECT 1 FROM events WHERE lower(slug) = lower($1))
    OR EXISTS (
        SELECT 1 FROM suggested_events
        WHERE lower(slug) = lower($1) AND ($2::BIGINT IS NULL OR id <> $2)
    )
"#;

const TITLE_TAKEN: &str = r#"
SELECT EXISTS (
    SELECT 1 FROM suggested_events
    WHERE user_id = $1 AND lower(title) = lower($2) AND ($3::BIGINT IS NULL OR id <> $3)
)
"#;

const INSERT_SUGGESTION: &str = r#"
INSERT INTO suggested_events (user_id, title, slug, created_at, modified_at)
VALUES ($1, $2, $3, $4, $4)
RETURNING id
"#;

const UPDATE_SUGGESTION: &str = r#"
UPDATE suggested_events
SET title = $2, slug = $3, description = $4, short_description = $5,
    location_id = $6, start_time = $7, privacy = $8, placeholder_img = $9,
    submitted_at = $10, modified_at = $11
WHERE id = $1
"#;

const LINK_CHANNELS: &str = r#"
INSERT INTO suggested_event_channels (suggested_event_id, channel_id)
SELECT $1, unnest($2::BIGINT[])
"#;

#[derive(Clone)]
pub struct PostgresSuggestionRepository {
    database: &'static Database,
}

impl PostgresSuggestionRepository {
    pub fn new(database: &'static Database) -> Self {
        Self { database }
    }

    async fn reload(&self, id: SuggestionId) -> Result<SuggestedEvent, RepositoryError> {
        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }
}

impl SuggestionRepository for PostgresSuggestionRepository {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<SuggestedEvent>, RepositoryError> {
        let sql = format!("{} WHERE s.user_id = $1 ORDER BY s.modified_at, s.id", SELECT_SUGGESTIONS);
        let mut rows = sqlx::query(&sql)
            .bind(user_id.0)
            .fetch(self.database.database_pool());

        let mut result = Vec::new();
        while let Some(row) = rows.try_next().await? {
            result.push(suggestion_from_row(&row)?);
        }
        Ok(result)
    }

    async fn find_by_id(&self, id: SuggestionId) -> Result<Option<SuggestedEvent>, RepositoryError> {
        let sql = format!("{} WHERE s.id = $1", SELECT_SUGGESTIONS);
        let row = sqlx::query(&sql)
            .bind(id.0)
            .fetch_optional(self.database.database_pool())
            .await?;

        row.as_ref().map(suggestion_from_row).transpose()
    }

    async fn slug_taken(
        &self,
        slug: &Slug,
        except: Option<SuggestionId>,
    ) -> Result<bool, RepositoryError> {
        let taken = sqlx::query_scalar::<_, bool>(SLUG_TAKEN)
            .bind(slug.to_string())
            .bind(except.map(|id| id.0))
            .fetch_one(self.database.database_pool())
            .await?;
        Ok(taken)
    }

    async fn title_taken(
        &self,
        user_id: UserId,
        title: &str,
        except: Option<SuggestionId>,
    ) -> Result<bool, RepositoryError> {
        let taken = sqlx::query_scalar::<_, bool>(TITLE_TAKEN)
            .bind(user_id.0)
            .bind(title)
            .bind(except.map(|id| id.0))
            .fetch_one(self.database.database_pool())
            .await?;
        Ok(taken)
    }

    async fn create(&self, suggestion: NewSuggestion) -> Result<SuggestedEvent, RepositoryError> {
        let mut transaction = self.database.database_pool().begin().await?;

        let id: i64 = sqlx::query_scalar(INSERT_SUGGESTION)
            .bind(suggestion.owner.0)
            .bind(&suggestion.title)
            .bind(suggestion.slug.to_string())
            .bind(suggestion.created)
            .fetch_one(&mut *transaction)
            .await?;
        link_channels(&mut transaction, id, &suggestion.channels).await?;

        transaction.commit().await?;
        tracing::debug!(id, "suggested event inserted");
        self.reload(SuggestionId(id)).await
    }

    async fn update(&self, suggestion: &SuggestedEvent) -> Result<SuggestedEvent, RepositoryError> {
        let id = suggestion.id.0;
        let mut transaction = self.database.database_pool().begin().await?;

        let result = sqlx::query(UPDATE_SUGGESTION)
            .bind(id)
            .bind(&suggestion.title)
            .bind(suggestion.slug.to_string())
            .bind(&suggestion.description)
            .bind(&suggestion.short_description)
            .bind(suggestion.location.as_ref().map(|location| location.id.0))
            .bind(suggestion.start_time)
            .bind(suggestion.privacy.as_str())
            .bind(&suggestion.placeholder_img)
            .bind(suggestion.submitted)
            .bind(suggestion.modified)
            .execute(&mut *transaction)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM suggested_event_channels WHERE suggested_event_id = $1")
            .bind(id)
            .execute(&mut *transaction)
            .await?;
        link_channels(&mut transaction, id, &suggestion.channels).await?;

        transaction.commit().await?;
        self.reload(suggestion.id).await
    }

    async fn delete(&self, id: SuggestionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM suggested_events WHERE id = $1")
            .bind(id.0)
            .execute(self.database.database_pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

async fn link_channels(
    connection: &mut PgConnection,
    id: i64,
    channels: &BTreeSet<ChannelId>,
) -> Result<(), RepositoryError> {
    if channels.is_empty() {
        return Ok(());
    }
    let channel_ids: Vec<i64> = channels.iter().map(|channel| channel.0).collect();
    sqlx::query(LINK_CHANNELS)
        .bind(id)
        .bind(channel_ids)
        .execute(connection)
        .await?;
    Ok(())
}

fn suggestion_from_row(row: &PgRow) -> Result<SuggestedEvent, RepositoryError> {
    let location_id: Option<i64> = row.try_get("location_id")?;
    let location = match location_id {
        Some(id) => Some(Location {
            id: LocationId(id),
            name: row.try_get("location_name")?,
            timezone: row.try_get("location_timezone")?,
        }),
        None => None,
    };
    let channel_ids: Vec<i64> = row.try_get("channel_ids")?;

    Ok(SuggestedEvent {
        id: SuggestionId(row.try_get(ID_FIELD_NAME)?),
        owner: UserId(row.try_get("user_id")?),
        title: row.try_get("title")?,
        slug: slug_column(row, SLUG_FIELD_NAME)?,
        description: row.try_get("description")?,
        short_description: row.try_get("short_description")?,
        channels: channel_ids.into_iter().map(ChannelId).collect(),
        location,
        start_time: row.try_get("start_time")?,
        privacy: parse_column(row, "privacy")?,
        placeholder_img: row.try_get("placeholder_img")?,
        submitted: row.try_get(SUBMITTED_FIELD_NAME)?,
        created: row.try_get(CREATED_FIELD_NAME)?,
        modified: row.try_get(MODIFIED_FIELD_NAME)?,
    })
}
