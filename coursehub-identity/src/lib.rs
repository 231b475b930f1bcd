//! Identity Gateway contract: issues and validates bearer credentials and
//! maps a credential to a stable user identifier. The core never inspects
//! credential internals; everything behind this trait is replaceable.

pub mod error;

use std::collections::HashMap;

use async_trait::async_trait;
pub use error::IdentityError;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Creates an account and returns the new user identifier.
    async fn register(&self, email: &str, password: &str) -> Result<String, IdentityError>;

    /// Exchanges credentials for a bearer token.
    async fn sign_in(&self, email: &str, password: &str) -> Result<String, IdentityError>;

    /// Maps a bearer token to the user identifier it was issued for.
    async fn verify(&self, token: &str) -> Result<String, IdentityError>;

    /// Re-authenticates with the current password before setting the new one.
    async fn change_password(
        &self,
        user_id: &str,
        current: &str,
        new: &str,
    ) -> Result<(), IdentityError>;

    /// Removes the account and revokes its outstanding tokens.
    async fn remove(&self, user_id: &str) -> Result<(), IdentityError>;
}

fn random_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

struct Account {
    user_id: String,
    salt: String,
    password_hash: String,
}

#[derive(Default)]
struct Inner {
    /// email -> account
    accounts: HashMap<String, Account>,
    /// bearer token -> user id
    tokens: HashMap<String, String>,
}

/// In-process gateway implementation backing tests and the dev server.
#[derive(Default)]
pub struct MemoryIdentityGateway {
    inner: RwLock<Inner>,
}

impl MemoryIdentityGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityGateway for MemoryIdentityGateway {
    async fn register(&self, email: &str, password: &str) -> Result<String, IdentityError> {
        let mut inner = self.inner.write().await;
        if inner.accounts.contains_key(email) {
            return Err(IdentityError::EmailTaken(email.to_owned()));
        }
        let user_id = random_string(28);
        let salt = random_string(16);
        let password_hash = hash_password(&salt, password);
        inner.accounts.insert(
            email.to_owned(),
            Account {
                user_id: user_id.clone(),
                salt,
                password_hash,
            },
        );
        Ok(user_id)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<String, IdentityError> {
        let mut inner = self.inner.write().await;
        let user_id = {
            let account = inner
                .accounts
                .get(email)
                .ok_or(IdentityError::Unauthorized)?;
            if hash_password(&account.salt, password) != account.password_hash {
                return Err(IdentityError::Unauthorized);
            }
            account.user_id.clone()
        };
        let token = random_string(48);
        inner.tokens.insert(token.clone(), user_id);
        Ok(token)
    }

    async fn verify(&self, token: &str) -> Result<String, IdentityError> {
        let inner = self.inner.read().await;
        inner
            .tokens
            .get(token)
            .cloned()
            .ok_or(IdentityError::Unauthorized)
    }

    async fn change_password(
        &self,
        user_id: &str,
        current: &str,
        new: &str,
    ) -> Result<(), IdentityError> {
        let mut inner = self.inner.write().await;
        let account = inner
            .accounts
            .values_mut()
            .find(|account| account.user_id == user_id)
            .ok_or(IdentityError::Unauthorized)?;
        if hash_password(&account.salt, current) != account.password_hash {
            return Err(IdentityError::Unauthorized);
        }
        account.salt = random_string(16);
        account.password_hash = hash_password(&account.salt, new);
        Ok(())
    }

    async fn remove(&self, user_id: &str) -> Result<(), IdentityError> {
        let mut inner = self.inner.write().await;
        inner.accounts.retain(|_, account| account.user_id != user_id);
        inner.tokens.retain(|_, id| id != user_id);
        Ok(())
    }
}
