use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Group a user belongs to. At most one `Admin` may exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupCode {
    Admin,
    User,
}

impl GroupCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::User => "User",
        }
    }
}

impl fmt::Display for GroupCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            other => Err(format!("unknown group code '{other}'")),
        }
    }
}

/// Lifecycle code. `Blocked` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCode {
    Active,
    Blocked,
}

impl StatusCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Blocked => "Blocked",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "blocked" => Ok(Self::Blocked),
            other => Err(format!("unknown status code '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroup {
    pub id: i32,
    pub code: GroupCode,
    pub description: Option<String>,
    pub user_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserState {
    pub id: i32,
    pub code: StatusCode,
    pub description: Option<String>,
    pub user_id: i32,
}

/// A persisted user.
///
/// `group` and `state` are `None` only when the query that produced this
/// value did not ask for them; every stored user owns exactly one of each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub login: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub group: Option<UserGroup>,
    pub state: Option<UserState>,
}

/// Candidate submitted for creation.
///
/// The state code is accepted so callers can send whatever they have, but it
/// is always replaced with [`StatusCode::Active`] on creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub login: String,
    pub password: String,
    pub group: GroupCode,
    #[serde(default)]
    pub group_description: Option<String>,
    #[serde(default)]
    pub state: Option<StatusCode>,
    #[serde(default)]
    pub state_description: Option<String>,
}

impl NewUser {
    pub fn new(login: impl Into<String>, password: impl Into<String>, group: GroupCode) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            group,
            group_description: None,
            state: None,
            state_description: None,
        }
    }

    #[must_use]
    pub fn with_group_description(mut self, description: impl Into<String>) -> Self {
        self.group_description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_state(mut self, code: StatusCode, description: Option<String>) -> Self {
        self.state = Some(code);
        self.state_description = description;
        self
    }
}

/// Normalized record handed to the store: timestamp and state fixed by the
/// coordinator.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub login: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub group: GroupCode,
    pub group_description: Option<String>,
    pub state: StatusCode,
    pub state_description: Option<String>,
}

/// Conjunction of optional attribute matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub id: Option<i32>,
    pub login: Option<String>,
    pub group: Option<GroupCode>,
    pub state: Option<StatusCode>,
}

impl UserFilter {
    #[must_use]
    pub fn by_id(id: i32) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_login(login: impl Into<String>) -> Self {
        Self {
            login: Some(login.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_group(mut self, group: GroupCode) -> Self {
        self.group = Some(group);
        self
    }

    #[must_use]
    pub const fn with_state(mut self, state: StatusCode) -> Self {
        self.state = Some(state);
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.id.is_none() && self.login.is_none() && self.group.is_none() && self.state.is_none()
    }
}

/// Related records to load alongside each user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Includes {
    pub group: bool,
    pub state: bool,
}

impl Includes {
    pub const NONE: Self = Self {
        group: false,
        state: false,
    };

    pub const ALL: Self = Self {
        group: true,
        state: true,
    };
}

impl FromStr for Includes {
    type Err = String;

    /// Parses a comma-separated list such as `UserGroup,UserState`.
    /// Empty segments are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut includes = Self::NONE;

        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.to_ascii_lowercase().as_str() {
                "usergroup" | "group" => includes.group = true,
                "userstate" | "state" => includes.state = true,
                _ => return Err(format!("unknown relation '{part}'")),
            }
        }

        Ok(includes)
    }
}

/// Whether a lookup's result is meant to be kept for a later write.
///
/// The store hands back detached snapshots in both modes; the flag is carried
/// through to the store call and its log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tracking {
    Tracked,
    #[default]
    NoTracking,
}
