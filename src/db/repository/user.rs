//! User Repository

use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, CountRow, RepoError, RepoResult, strip_table_prefix};
use crate::db::models::{User, UserCreate};

const USER_TABLE: &str = "users";

// =============================================================================
// User Repository
// =============================================================================

#[derive(Debug, Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a new user with a pre-hashed password
    pub async fn create(&self, data: UserCreate, hashed_password: String) -> RepoResult<User> {
        let now = Utc::now();
        let user = User {
            id: None,
            email: data.email,
            full_name: data.full_name,
            hashed_password,
            is_admin: data.is_admin,
            created_at: now,
            updated_at: now,
        };

        let created: Option<User> = self.base.db().create(USER_TABLE).content(user).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM users WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?
            .take(0)?;
        Ok(users.into_iter().next())
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let pure_id = strip_table_prefix(USER_TABLE, id);
        let user: Option<User> = self.base.db().select((USER_TABLE, pure_id)).await?;
        Ok(user)
    }

    /// Total user count
    pub async fn count(&self) -> RepoResult<u64> {
        let rows: Vec<CountRow> = self
            .base
            .db()
            .query("SELECT count() AS count FROM users GROUP ALL")
            .await?
            .take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }
}
