//! User entity - an account within a tenant

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::error::DomainError;
use crate::query::UserQuery;
use crate::traits::{Entity, Searchable};

const USERNAME_MIN: usize = 2;
const USERNAME_MAX: usize = 40;

/// User entity
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub custom_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub deleted: bool,
    /// Platform name to the external ids linked on that platform
    #[serde(default)]
    pub social_ids: BTreeMap<String, BTreeSet<String>>,
    #[serde(default)]
    pub last_read: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create an unsaved, enabled User
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            enabled: true,
            ..Self::default()
        }
    }

    /// Link an external id on a platform
    pub fn with_social_id(mut self, platform: impl Into<String>, id: impl Into<String>) -> Self {
        self.social_ids
            .entry(platform.into())
            .or_default()
            .insert(id.into());
        self
    }
}

impl Entity for User {
    type Query = UserQuery;

    const KIND: &'static str = "user";
    const FLAKE_KIND: &'static str = "users";

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = Some(at);
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.custom_id.is_empty() && self.username.is_empty() && self.email.is_empty() {
            return Err(DomainError::invalid_entity(
                Self::KIND,
                "one of custom id, username or email must be set",
            ));
        }

        let username_len = self.username.chars().count();
        if !self.username.is_empty() && !(USERNAME_MIN..=USERNAME_MAX).contains(&username_len) {
            return Err(DomainError::invalid_entity(
                Self::KIND,
                format!("username must be {USERNAME_MIN}-{USERNAME_MAX} characters"),
            ));
        }

        if !self.email.is_empty() && !self.email.validate_email() {
            return Err(DomainError::invalid_entity(Self::KIND, "invalid email"));
        }

        if self.social_ids.keys().any(String::is_empty) {
            return Err(DomainError::invalid_entity(Self::KIND, "missing social platform"));
        }

        Ok(())
    }

    fn matches(&self, opts: &UserQuery) -> bool {
        opts.matches(self)
    }
}

impl Searchable for User {
    fn search_text(&self) -> &str {
        &self.username
    }
}

/// Helpers on user collections
pub trait UserListExt {
    /// User ids in collection order
    fn ids(&self) -> Vec<u64>;

    /// Index the collection by user id
    fn to_map(&self) -> HashMap<u64, User>;
}

impl UserListExt for [User] {
    fn ids(&self) -> Vec<u64> {
        self.iter().map(|u| u.id).collect()
    }

    fn to_map(&self) -> HashMap<u64, User> {
        self.iter().map(|u| (u.id, u.clone())).collect()
    }
}
