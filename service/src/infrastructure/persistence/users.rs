use airmozilla_common::database::Database;
use airmozilla_common::{ID_FIELD_NAME, User, UserId};
use sqlx::Row;

use crate::domain::repository::{RepositoryError, ReviewerDirectory, UserDirectory};

/// User with every permission codename granted to it, through a group or
/// directly
const SELECT_USER: &str = r#"
SELECT u.id, u.username, u.email, u.is_active, u.is_superuser, u.contributor,
       ARRAY(
           SELECT gp.codename FROM group_permissions gp
           JOIN user_groups ug ON ug.group_id = gp.group_id
           WHERE ug.user_id = u.id
           UNION
           SELECT up.codename FROM user_permissions up
           WHERE up.user_id = u.id
       ) AS permissions
FROM users u
WHERE u.id = $1
"#;

const SELECT_REVIEWER_EMAILS: &str = r#"
SELECT u.email FROM users u
JOIN user_groups ug ON ug.user_id = u.id
JOIN group_permissions gp ON gp.group_id = ug.group_id
WHERE gp.codename = $1
UNION
SELECT u.email FROM users u
JOIN user_permissions up ON up.user_id = u.id
WHERE up.codename = $1
UNION
SELECT u.email FROM users u
WHERE u.is_superuser
"#;

#[derive(Clone)]
pub struct PostgresUserDirectory {
    database: &'static Database,
}

impl PostgresUserDirectory {
    pub fn new(database: &'static Database) -> Self {
        Self { database }
    }
}

impl UserDirectory for PostgresUserDirectory {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(SELECT_USER)
            .bind(id.0)
            .fetch_optional(self.database.database_pool())
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let permissions: Vec<String> = row.try_get("permissions")?;
        Ok(Some(User {
            id: UserId(row.try_get(ID_FIELD_NAME)?),
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            is_active: row.try_get("is_active")?,
            is_superuser: row.try_get("is_superuser")?,
            contributor: row.try_get("contributor")?,
            permissions: permissions.into_iter().collect(),
        }))
    }
}

impl ReviewerDirectory for PostgresUserDirectory {
    async fn reviewer_emails(&self, codename: &str) -> Result<Vec<String>, RepositoryError> {
        let emails = sqlx::query_scalar::<_, String>(SELECT_REVIEWER_EMAILS)
            .bind(codename)
            .fetch_all(self.database.database_pool())
            .await?;
        Ok(emails)
    }
}
