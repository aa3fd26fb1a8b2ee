use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identifier. Opaque to everything above the repository;
/// only the repository decides whether a value is well-formed.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        UserId(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        UserId(id.to_owned())
    }
}

/// The caller-writable attributes of a user. Create and update both take
/// the whole profile; an update writes every field back, empty or not.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    // NOTE: stored and returned as plain text.
    pub password: String,
    pub email: String,
    pub country: String,
}

impl fmt::Debug for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserProfile")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("nickname", &self.nickname)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .field("country", &self.country)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(flatten)]
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Exact-match predicate. `None` fields impose no constraint, the rest
/// are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub country: Option<String>,
}

impl UserFilter {
    /// Builds a filter from raw transport values, treating empty strings
    /// as absent.
    pub fn from_parts(
        first_name: Option<String>,
        last_name: Option<String>,
        nickname: Option<String>,
        country: Option<String>,
    ) -> Self {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        UserFilter {
            first_name: present(first_name),
            last_name: present(last_name),
            nickname: present(nickname),
            country: present(country),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.nickname.is_none()
            && self.country.is_none()
    }

    pub fn matches(&self, profile: &UserProfile) -> bool {
        fn eq(wanted: &Option<String>, actual: &str) -> bool {
            wanted.as_deref().is_none_or(|w| w == actual)
        }

        eq(&self.first_name, &profile.first_name)
            && eq(&self.last_name, &profile.last_name)
            && eq(&self.nickname, &profile.nickname)
            && eq(&self.country, &profile.country)
    }
}

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// 1-based page window. Out-of-range input falls back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE);
        let page_size = page_size.filter(|s| *s >= 1).unwrap_or(DEFAULT_PAGE_SIZE);
        PageRequest { page, page_size }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size) as u64
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(None, None)
    }
}
