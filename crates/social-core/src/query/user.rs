//! User query options

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::entities::User;
use crate::traits::QueryOptions;

use super::{flag_matches, in_set};

/// Options to narrow down user queries and searches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserQuery {
    #[serde(default)]
    pub custom_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub ids: Vec<u64>,
    #[serde(skip)]
    pub limit: Option<usize>,
    #[serde(skip)]
    pub offset: usize,
    /// Free text, only used by search
    #[serde(skip)]
    pub query: String,
    /// Platform name to acceptable external ids
    #[serde(default)]
    pub social_ids: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub usernames: Vec<String>,
}

impl UserQuery {
    /// Search options for `text`
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            query: text.into(),
            ..Self::default()
        }
    }

    /// Whether `user` satisfies every populated option
    pub fn matches(&self, user: &User) -> bool {
        in_set(&self.custom_ids, &user.custom_id)
            && flag_matches(self.deleted, user.deleted)
            && in_set(&self.emails, &user.email)
            && flag_matches(self.enabled, user.enabled)
            && in_set(&self.ids, &user.id)
            && self.matches_social_ids(&user.social_ids)
            && in_set(&self.usernames, &user.username)
    }

    /// OR across platforms, OR across ids within a platform. A platform listed
    /// without ids accepts any linked id on it.
    fn matches_social_ids(&self, linked: &BTreeMap<String, BTreeSet<String>>) -> bool {
        if self.social_ids.is_empty() {
            return true;
        }

        self.social_ids
            .iter()
            .any(|(platform, wanted)| match linked.get(platform) {
                Some(ids) if !ids.is_empty() => {
                    wanted.is_empty() || wanted.iter().any(|id| ids.contains(id))
                }
                _ => false,
            })
    }
}

impl QueryOptions for UserQuery {
    fn limit(&self) -> Option<usize> {
        self.limit.filter(|l| *l > 0)
    }
}
