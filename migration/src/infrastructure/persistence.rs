use std::collections::HashSet;

use airmozilla_common::database::Database;
use anyhow::Context;
use futures::TryStreamExt;

use crate::domain::migration::MigrationStep;
use crate::domain::persistence::Persistence;

const EXISTING_TABLES: &str = r#"
SELECT table_name FROM information_schema.tables
WHERE table_schema = $1 AND table_type = 'BASE TABLE'
"#;

#[derive(Clone)]
pub struct PersistenceAdapter {
    database: &'static Database,
}

impl PersistenceAdapter {
    pub fn new(database: &'static Database) -> Self {
        Self { database }
    }

    /// Runs the statements of one step, all or nothing
    async fn apply(&self, ctx: &'static str, statements: Vec<String>) -> anyhow::Result<()> {
        let mut transaction = self
            .database
            .database_pool()
            .begin()
            .await
            .with_context(|| format!("failed to start {} transaction", ctx))?;

        for statement in statements.iter() {
            tracing::debug!(%statement, "{}", ctx);
            sqlx::query(statement)
                .execute(&mut *transaction)
                .await
                .with_context(|| format!("{} failed: {}", ctx, statement))?;
        }

        transaction
            .commit()
            .await
            .with_context(|| format!("failed to commit {} transaction", ctx))?;
        tracing::info!(step = ctx, statements = statements.len(), "migration step applied");
        Ok(())
    }
}

impl Persistence for PersistenceAdapter {
    async fn load(&self) -> Result<HashSet<String>, anyhow::Error> {
        sqlx::query_scalar::<_, String>(EXISTING_TABLES)
            .bind(self.database.database_schema())
            .fetch(self.database.database_pool())
            .try_collect::<HashSet<String>>()
            .await
            .context("failed to list existing tables")
    }

    async fn apply_migration_steps(
        &self,
        steps: Vec<Box<dyn MigrationStep + Send>>,
    ) -> Result<(), anyhow::Error> {
        for step in steps {
            let (ctx, statements) = (step.ctx(), step.ddls());
            self.apply(ctx, statements).await?;
        }
        Ok(())
    }

    fn database_schema(&self) -> &str {
        self.database.database_schema()
    }
}
