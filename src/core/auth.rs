//! Administrator credentials.

use crate::errors::{AppError, AppResult};
use crate::models::User;
use crate::store::UserStore;
use std::sync::Arc;

pub fn hash_password(password: &str) -> AppResult<String> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[derive(Clone)]
pub struct Authenticator {
    users: Arc<dyn UserStore>,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Id of the user owning `email` when `password` matches.
    ///
    /// Unknown email and wrong password both yield [`AppError::Unauthorized`].
    pub fn authenticate(&self, email: &str, password: &str) -> AppResult<i64> {
        let user = self
            .users
            .user_by_email(email.trim())?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password) {
            tracing::info!(email, "login refused");
            return Err(AppError::Unauthorized);
        }
        Ok(user.id)
    }

    pub fn create_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
        access_level: i64,
    ) -> AppResult<i64> {
        if password.chars().count() < 8 {
            return Err(AppError::Validation(
                "password must be at least 8 characters long".into(),
            ));
        }
        let now = chrono::Local::now().to_rfc3339();
        let user = User {
            id: 0,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.trim().to_string(),
            password: hash_password(password)?,
            access_level,
            created_at: now.clone(),
            updated_at: now,
        };
        self.users.insert_user(&user)
    }
}
