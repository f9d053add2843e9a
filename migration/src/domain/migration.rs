use airmozilla_common::{CHANNELS_TABLE, SLUG_FIELD_NAME};

use crate::domain::persistence::Persistence;
use crate::domain::schema_tables;
use crate::domain::tables::{Column, ForeignKeyConstraint, Index, Table};

pub trait MigrationStep {
    fn ctx(&self) -> &'static str;
    fn ddls(&self) -> Vec<String>;
}

struct CreateTableStep {
    ddls: Vec<String>,
}

impl CreateTableStep {
    fn new(database_schema: &str, table: &Table) -> Self {
        let ddls = create_table_ddl(database_schema, table);
        Self { ddls }
    }
}

impl MigrationStep for CreateTableStep {
    fn ctx(&self) -> &'static str {
        "CREATE TABLE"
    }

    fn ddls(&self) -> Vec<String> {
        self.ddls.clone()
    }
}

/// Makes sure the channel new suggestions are attached to exists
struct SeedDefaultChannelStep {
    dml: String,
}

impl SeedDefaultChannelStep {
    fn new(database_schema: &str, channel: &DefaultChannel) -> Self {
        let dml = format!(
            "INSERT INTO \"{}\".\"{}\" (\"{}\", \"name\") VALUES ({}, {}) ON CONFLICT (\"{}\") DO NOTHING",
            database_schema,
            CHANNELS_TABLE,
            SLUG_FIELD_NAME,
            quote_literal(&channel.slug),
            quote_literal(&channel.name),
            SLUG_FIELD_NAME,
        );
        Self { dml }
    }
}

impl MigrationStep for SeedDefaultChannelStep {
    fn ctx(&self) -> &'static str {
        "SEED DEFAULT CHANNEL"
    }

    fn ddls(&self) -> Vec<String> {
        vec![self.dml.clone()]
    }
}

#[derive(Debug, Clone)]
pub struct DefaultChannel {
    pub slug: String,
    pub name: String,
}

/// Brings the database schema in line with [`schema_tables`]
#[derive(Clone)]
pub struct Migration<P: Persistence> {
    persistence: P,
    default_channel: DefaultChannel,
}

impl<P: Persistence> Migration<P> {
    pub fn new(persistence: P, default_channel: DefaultChannel) -> Self {
        Self {
            persistence,
            default_channel,
        }
    }

    pub async fn migrate(&self) -> Result<(), anyhow::Error> {
        let steps = migration_steps(&self.persistence, &self.default_channel).await?;
        tracing::info!(steps = steps.len(), "applying migration steps");
        self.persistence.apply_migration_steps(steps).await
    }
}

pub async fn migration_steps(
    persistence: &impl Persistence,
    default_channel: &DefaultChannel,
) -> Result<Vec<Box<dyn MigrationStep + Send>>, anyhow::Error> {
    let database_schema = persistence.database_schema();
    let actual_schema = persistence.load().await?;

    let mut result: Vec<Box<dyn MigrationStep + Send>> = Vec::new();

    for table in schema_tables() {
        if actual_schema.contains(&table.name) {
            tracing::debug!(table = %table.name, "table exists, skipping");
        } else {
            result.push(Box::new(CreateTableStep::new(database_schema, &table)));
        }
    }

    result.push(Box::new(SeedDefaultChannelStep::new(
        database_schema,
        default_channel,
    )));

    Ok(result)
}

fn create_table_ddl(schema: &str, table: &Table) -> Vec<String> {
    let mut columns = Vec::new();
    let mut pk_columns = Vec::new();

    for column in table.columns.iter() {
        columns.push(column_ddl(column));
        if column.primary_key {
            pk_columns.push(format!("\"{}\"", column.name));
        }
    }

    let columns_sql = columns.join(",\n    ");
    let pk_columns_sql = pk_columns.join(",");

    let table_ddl = format!(
        "CREATE TABLE \"{}\".\"{}\" (\n    {},\n    PRIMARY KEY({})\n)",
        schema, table.name, columns_sql, pk_columns_sql
    );

    let mut ddls = vec![table_ddl];

    for fk in table.foreign_keys.iter() {
        ddls.push(create_fk_ddl(schema, fk));
    }

    for index in table.indexes.iter() {
        ddls.push(create_index_ddl(schema, index));
    }

    ddls
}

fn column_ddl(column: &Column) -> String {
    let mut sql = format!("\"{}\" {}", column.name, column.column_type);
    if column.not_null {
        sql.push_str(" NOT NULL");
    }
    if let Some(default_value) = &column.default_value {
        sql.push_str(format!(" DEFAULT {}", default_value).as_str());
    }
    if column.unique {
        sql.push_str(" UNIQUE");
    }
    sql
}

fn create_fk_ddl(schema: &str, fk: &ForeignKeyConstraint) -> String {
    format!(
        "ALTER TABLE \"{}\".\"{}\" ADD CONSTRAINT \"{}_{}_fkey\" FOREIGN KEY (\"{}\") REFERENCES \"{}\".\"{}\" (\"{}\") ON DELETE {}",
        schema,
        fk.table_name,
        fk.table_name,
        fk.column_name,
        fk.column_name,
        schema,
        fk.referenced_table_name,
        fk.referenced_column_name,
        fk.on_delete
    )
}

fn create_index_ddl(schema: &str, index: &Index) -> String {
    let columns_sql = index.columns.join(", ");
    let kind = if index.unique { "UNIQUE INDEX" } else { "INDEX" };
    format!(
        "CREATE {} \"{}\" ON \"{}\".\"{}\" ({})",
        kind,
        index.name(),
        schema,
        index.table_name,
        columns_sql
    )
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
