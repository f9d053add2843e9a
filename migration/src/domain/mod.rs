use airmozilla_common::{
    CHANNELS_TABLE, CREATED_FIELD_NAME, EVENT_CHANNELS_TABLE, EVENTS_TABLE, FLATPAGES_TABLE,
    GROUP_PERMISSIONS_TABLE, GROUPS_TABLE, ID_FIELD_NAME, LOCATIONS_TABLE, MODIFIED_FIELD_NAME,
    SLUG_FIELD_NAME, SUBMITTED_FIELD_NAME, SUGGESTED_EVENT_CHANNELS_TABLE, SUGGESTED_EVENTS_TABLE,
    USER_GROUPS_TABLE, USER_PERMISSIONS_TABLE, USERS_TABLE,
};

use crate::domain::tables::{Column, ColumnType, ForeignKeyConstraint, Index, OnDelete, Table};

pub mod migration;
pub mod persistence;
pub mod tables;

/// Returns the tables of the application, sorted conform dependency order
pub fn schema_tables() -> Vec<Table> {
    vec![
        TableBuilder::entity(USERS_TABLE)
            .column(Column::new("username", ColumnType::Text, true, true, None))
            .column(Column::new("email", ColumnType::Text, true, false, Some("''")))
            .column(flag("is_active", "true"))
            .column(flag("is_superuser", "false"))
            .column(flag("contributor", "false"))
            .into(),
        TableBuilder::entity(GROUPS_TABLE)
            .column(Column::new("name", ColumnType::Text, true, true, None))
            .into(),
        TableBuilder::link(USER_GROUPS_TABLE, ("user_id", USERS_TABLE), ("group_id", GROUPS_TABLE)),
        TableBuilder::new(GROUP_PERMISSIONS_TABLE)
            .column(Column::primary_key("group_id", ColumnType::BigInt))
            .column(Column::primary_key("codename", ColumnType::Text))
            .references("group_id", GROUPS_TABLE, OnDelete::Cascade)
            .into(),
        TableBuilder::new(USER_PERMISSIONS_TABLE)
            .column(Column::primary_key("user_id", ColumnType::BigInt))
            .column(Column::primary_key("codename", ColumnType::Text))
            .references("user_id", USERS_TABLE, OnDelete::Cascade)
            .into(),
        TableBuilder::entity(CHANNELS_TABLE)
            .column(Column::new(SLUG_FIELD_NAME, ColumnType::Text, true, true, None))
            .column(Column::new("name", ColumnType::Text, true, false, None))
            .column(timestamp(CREATED_FIELD_NAME))
            .into(),
        TableBuilder::entity(LOCATIONS_TABLE)
            .column(Column::new("name", ColumnType::Text, true, false, None))
            .column(Column::new("timezone", ColumnType::Text, true, false, None))
            .into(),
        TableBuilder::entity(EVENTS_TABLE)
            .column(Column::new("title", ColumnType::Text, true, false, None))
            .column(Column::new(SLUG_FIELD_NAME, ColumnType::Text, true, false, None))
            .column(text("description"))
            .column(Column::new("status", ColumnType::Text, true, false, Some("'initiated'")))
            .column(Column::new("privacy", ColumnType::Text, true, false, Some("'public'")))
            .column(flag("featured", "false"))
            .column(Column::new("start_time", ColumnType::TimestampTZ, true, false, None))
            .column(Column::new("archive_time", ColumnType::TimestampTZ, false, false, None))
            .column(Column::new("location_id", ColumnType::BigInt, false, false, None))
            .column(Column::new("placeholder_img", ColumnType::Text, false, false, None))
            .column(timestamp(CREATED_FIELD_NAME))
            .column(timestamp(MODIFIED_FIELD_NAME))
            .references("location_id", LOCATIONS_TABLE, OnDelete::SetNull)
            .unique_slug()
            .index("start_time")
            .into(),
        TableBuilder::link(EVENT_CHANNELS_TABLE, ("event_id", EVENTS_TABLE), ("channel_id", CHANNELS_TABLE)),
        TableBuilder::entity(SUGGESTED_EVENTS_TABLE)
            .column(Column::new("user_id", ColumnType::BigInt, true, false, None))
            .column(Column::new("title", ColumnType::Text, true, false, None))
            .column(Column::new(SLUG_FIELD_NAME, ColumnType::Text, true, false, None))
            .column(text("description"))
            .column(text("short_description"))
            .column(Column::new("location_id", ColumnType::BigInt, false, false, None))
            .column(Column::new("start_time", ColumnType::TimestampTZ, false, false, None))
            .column(Column::new("privacy", ColumnType::Text, true, false, Some("'public'")))
            .column(Column::new("placeholder_img", ColumnType::Text, false, false, None))
            .column(Column::new(SUBMITTED_FIELD_NAME, ColumnType::TimestampTZ, false, false, None))
            .column(timestamp(CREATED_FIELD_NAME))
            .column(timestamp(MODIFIED_FIELD_NAME))
            .references("user_id", USERS_TABLE, OnDelete::Cascade)
            .references("location_id", LOCATIONS_TABLE, OnDelete::SetNull)
            .unique_slug()
            .index("user_id")
            .into(),
        TableBuilder::link(
            SUGGESTED_EVENT_CHANNELS_TABLE,
            ("suggested_event_id", SUGGESTED_EVENTS_TABLE),
            ("channel_id", CHANNELS_TABLE),
        ),
        TableBuilder::entity(FLATPAGES_TABLE)
            .column(Column::new("url", ColumnType::Text, true, true, None))
            .column(Column::new("title", ColumnType::Text, true, false, Some("''")))
            .column(text("content"))
            .into(),
    ]
}

fn flag(name: &'static str, default_value: &'static str) -> Column {
    Column::new(name, ColumnType::Boolean, true, false, Some(default_value))
}

fn text(name: &'static str) -> Column {
    Column::new(name, ColumnType::Text, true, false, Some("''"))
}

fn timestamp(name: &'static str) -> Column {
    Column::new(name, ColumnType::TimestampTZ, true, false, Some("now()"))
}

struct TableBuilder {
    table_name: String,
    columns: Vec<Column>,
    foreign_keys: Vec<ForeignKeyConstraint>,
    indexes: Vec<Index>,
}

impl TableBuilder {
    fn new(table_name: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Table with a surrogate `id` primary key
    fn entity(table_name: &str) -> Self {
        Self::new(table_name).column(Column::primary_key(ID_FIELD_NAME, ColumnType::BigSerial))
    }

    /// Many-to-many link table keyed by both sides
    fn link(table_name: &str, left: (&str, &str), right: (&str, &str)) -> Table {
        Self::new(table_name)
            .column(Column::primary_key(left.0, ColumnType::BigInt))
            .column(Column::primary_key(right.0, ColumnType::BigInt))
            .references(left.0, left.1, OnDelete::Cascade)
            .references(right.0, right.1, OnDelete::Cascade)
            .index(right.0)
            .into()
    }

    fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    fn references(mut self, column_name: &str, table_name: &str, on_delete: OnDelete) -> Self {
        self.foreign_keys.push(ForeignKeyConstraint::new(
            &self.table_name as &str,
            column_name,
            table_name,
            ID_FIELD_NAME,
            on_delete,
        ));
        self
    }

    fn index(mut self, column_name: &str) -> Self {
        self.indexes
            .push(Index::new(&self.table_name as &str, vec![column_name], false));
        self
    }

    /// Slugs are unique regardless of letter case
    fn unique_slug(mut self) -> Self {
        let expression = format!("lower({})", SLUG_FIELD_NAME);
        self.indexes
            .push(Index::new(self.table_name.clone(), vec![expression], true));
        self
    }

    fn into(self) -> Table {
        Table::new(self.table_name, self.columns, self.foreign_keys, self.indexes)
    }
}
