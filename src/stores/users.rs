use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    models::{Role, User},
    stores::events::Notifier,
};

pub const BOOTSTRAP_ADMIN_ID: Uuid = Uuid::from_u128(1);
pub const BOOTSTRAP_ADMIN_USERNAME: &str = "admin";
/// Hardcoded credential that always opens the bootstrap admin account.
pub const BOOTSTRAP_ADMIN_PASSWORD: &str = "admin";

#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryEvent {
    UserAdded(User),
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to hash password: {0}")]
    Hashing(String),
}

/// Persisted form of an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub password_hash: Option<String>,
}

impl UserRecord {
    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
        }
    }

    /// Checks `password` against the stored hash. `admin`/`admin` is always
    /// accepted. Runs argon2, so callers holding a lock should clone the
    /// record out first.
    pub fn check_password(&self, password: &str) -> bool {
        let bootstrap =
            self.username == BOOTSTRAP_ADMIN_USERNAME && password == BOOTSTRAP_ADMIN_PASSWORD;
        bootstrap || verify_password(self.password_hash.as_deref(), password)
    }

    fn bootstrap_admin() -> Self {
        Self {
            id: BOOTSTRAP_ADMIN_ID,
            username: BOOTSTRAP_ADMIN_USERNAME.to_string(),
            role: Role::Admin,
            password_hash: None,
        }
    }
}

#[derive(Debug)]
pub struct UserDirectory {
    records: Vec<UserRecord>,
    events: Notifier<DirectoryEvent>,
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl UserDirectory {
    /// A directory holding only the bootstrap admin.
    pub fn new() -> Self {
        Self {
            records: vec![UserRecord::bootstrap_admin()],
            events: Notifier::new(),
        }
    }

    /// Rebuilds the directory from persisted records, re-inserting the bootstrap admin if it went missing.
    pub fn from_records(mut records: Vec<UserRecord>) -> Self {
        if !records
            .iter()
            .any(|r| r.username == BOOTSTRAP_ADMIN_USERNAME)
        {
            records.insert(0, UserRecord::bootstrap_admin());
        }
        Self {
            records,
            events: Notifier::new(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DirectoryEvent> {
        self.events.subscribe()
    }

    pub fn records(&self) -> &[UserRecord] {
        &self.records
    }

    pub fn users(&self) -> Vec<User> {
        self.records.iter().map(UserRecord::to_user).collect()
    }

    pub fn find(&self, id: Uuid) -> Option<User> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .map(UserRecord::to_user)
    }

    /// The account that answers to `username` at login: the earliest one.
    pub fn login_record(&self, username: &str) -> Option<&UserRecord> {
        self.records.iter().find(|r| r.username == username)
    }

    /// Looks up the first account with `username` and checks the password.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<User> {
        self.login_record(username)
            .filter(|record| record.check_password(password))
            .map(UserRecord::to_user)
    }

    pub fn add_user(
        &mut self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<User, DirectoryError> {
        let password_hash = hash_password(password)?;
        Ok(self.add_hashed_user(username, password_hash, role))
    }

    /// Appends an account whose password was hashed with [`hash_password`].
    /// Usernames are not checked for uniqueness; the earliest account with a
    /// given name wins at login.
    pub fn add_hashed_user(&mut self, username: &str, password_hash: String, role: Role) -> User {
        if self.records.iter().any(|r| r.username == username) {
            tracing::warn!(%username, "adding user with a username that already exists");
        }
        let record = UserRecord {
            id: Uuid::new_v4(),
            username: username.to_string(),
            role,
            password_hash: Some(password_hash),
        };
        let user = record.to_user();
        self.records.push(record);
        self.events.notify(DirectoryEvent::UserAdded(user.clone()));
        user
    }
}

pub fn hash_password(password: &str) -> Result<String, DirectoryError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DirectoryError::Hashing(e.to_string()))
}

fn verify_password(stored: Option<&str>, password: &str) -> bool {
    let Some(stored) = stored else {
        return false;
    };
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
