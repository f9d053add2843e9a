use std::fmt::Display;
use std::str::FromStr;

use airmozilla_common::{
    Channel, ChannelId, Event, EventId, FlatPage, ID_FIELD_NAME, Location, LocationId,
    SLUG_FIELD_NAME, Slug,
};
use sqlx::Row;
use sqlx::postgres::PgRow;

use crate::domain::repository::RepositoryError;

pub mod catalog;
pub mod suggestions;
pub mod users;

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(cause) if cause.is_unique_violation() => {
                RepositoryError::UniqueViolation(cause.message().to_string())
            }
            _ => RepositoryError::DatabaseError(e.to_string()),
        }
    }
}

fn decode_error(column: &str, cause: impl Display) -> RepositoryError {
    RepositoryError::DatabaseError(format!("failed to read {}: {}", column, cause))
}

/// Text column holding a value of one of the domain enums
fn parse_column<T>(row: &PgRow, column: &str) -> Result<T, RepositoryError>
where
    T: FromStr,
    T::Err: Display,
{
    let value: String = row.try_get(column)?;
    value.parse::<T>().map_err(|e| decode_error(column, e))
}

fn slug_column(row: &PgRow, column: &str) -> Result<Slug, RepositoryError> {
    let value: String = row.try_get(column)?;
    Slug::try_new(value).map_err(|e| decode_error(column, e))
}

/// Row of `SELECT id, slug, name FROM channels`
fn channel_from_row(row: &PgRow) -> Result<Channel, RepositoryError> {
    Ok(Channel {
        id: ChannelId(row.try_get(ID_FIELD_NAME)?),
        slug: slug_column(row, SLUG_FIELD_NAME)?,
        name: row.try_get("name")?,
    })
}

/// Row of `SELECT id, name, timezone FROM locations`
fn location_from_row(row: &PgRow) -> Result<Location, RepositoryError> {
    Ok(Location {
        id: LocationId(row.try_get(ID_FIELD_NAME)?),
        name: row.try_get("name")?,
        timezone: row.try_get("timezone")?,
    })
}

fn event_from_row(row: &PgRow) -> Result<Event, RepositoryError> {
    Ok(Event {
        id: EventId(row.try_get(ID_FIELD_NAME)?),
        title: row.try_get("title")?,
        slug: row.try_get(SLUG_FIELD_NAME)?,
        description: row.try_get("description")?,
        status: parse_column(row, "status")?,
        privacy: parse_column(row, "privacy")?,
        featured: row.try_get("featured")?,
        start_time: row.try_get("start_time")?,
        archive_time: row.try_get("archive_time")?,
        placeholder_img: row.try_get("placeholder_img")?,
    })
}

fn flatpage_from_row(row: &PgRow) -> Result<FlatPage, RepositoryError> {
    Ok(FlatPage {
        url: row.try_get("url")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
    })
}
