//! Registration and password authentication.

use anyhow::anyhow;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use sqlx::PgPool;

use crate::commands::users_command;
use crate::entities::UserId;
use crate::error::{Error, Result};
use crate::ports::{Authenticator, Credentials};
use crate::queries::user_query;

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("hash password: {}", e))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| anyhow!("stored password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[derive(Debug, Clone)]
pub struct PasswordAuthenticator {
    pool: PgPool,
}

impl PasswordAuthenticator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<UserId> {
        if credentials.username.is_empty() || credentials.password.is_empty() {
            return Err(Error::InvalidRequest(
                "username and password must not be empty".to_string(),
            ));
        }

        let password_hash = hash_password(&credentials.password)?;
        let user_id = match users_command::create(
            &self.pool,
            Utc::now(),
            &credentials.username,
            &password_hash,
        )
        .await
        {
            Err(Error::Database(sqlx::Error::Database(e))) if e.is_unique_violation() => {
                return Err(Error::InvalidRequest(format!(
                    "username {} is taken",
                    credentials.username
                )));
            }
            result => result?,
        };
        log::info!("registered {} as {}", credentials.username, user_id);
        Ok(user_id)
    }
}

impl Authenticator for PasswordAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<UserId> {
        let Some(user) = user_query::get_by_username(&self.pool, &credentials.username).await?
        else {
            return Err(Error::Unauthenticated);
        };

        if verify_password(&credentials.password, &user.password_hash)? {
            Ok(user.user_id())
        } else {
            log::info!("password mismatch for {}", credentials.username);
            Err(Error::Unauthenticated)
        }
    }
}
