//! User Model

use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use validator::Validate;

use super::serde_thing;

pub type UserId = Thing;

/// User model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serde_thing::option::serialize",
        deserialize_with = "serde_thing::option::deserialize",
        default
    )]
    pub id: Option<UserId>,
    pub email: String,
    pub full_name: String,
    pub hashed_password: String,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    /// Verify password using argon2
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.hashed_password)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash password using argon2
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub full_name: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// API 响应 (不含密码哈希)
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub is_admin: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            email: u.email,
            full_name: u.full_name,
            is_admin: u.is_admin,
            created_at: u.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = User::hash_password("correct horse battery").unwrap();
        let user = User {
            id: None,
            email: "test@example.com".to_string(),
            full_name: "Test".to_string(),
            hashed_password: hash,
            is_admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(user.verify_password("correct horse battery").unwrap());
        assert!(!user.verify_password("wrong password").unwrap());
    }
}
