//! Translation of `GET /users` parameters into a repository query and the
//! pagination metadata returned alongside the results.

use crate::dto::user_dto::ListUsersQuery;
use crate::model::user::User;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// Conjunction of the optional list filters. An absent field matches all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Case-insensitive substring of the username.
    pub username: Option<String>,
    /// Exact role name. Kept as text: a value outside the role set is not an
    /// error, it just matches nothing.
    pub role: Option<String>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        let username_ok = self.username.as_ref().map_or(true, |needle| {
            user.username.to_lowercase().contains(&needle.to_lowercase())
        });
        let role_ok = self
            .role
            .as_ref()
            .map_or(true, |role| user.role.as_str() == role);
        username_ok && role_ok
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListQuery {
    pub filter: UserFilter,
    pub page: u64,
    pub limit: u64,
}

impl Default for UserListQuery {
    fn default() -> Self {
        UserListQuery {
            filter: UserFilter::default(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl UserListQuery {
    pub fn from_params(params: &ListUsersQuery) -> Self {
        UserListQuery {
            filter: UserFilter {
                username: non_empty(params.username.as_deref()),
                role: non_empty(params.role.as_deref()),
            },
            page: positive_or(params.page.as_deref(), DEFAULT_PAGE),
            limit: positive_or(params.limit.as_deref(), DEFAULT_LIMIT),
        }
    }

    /// Number of matching records to skip before the current page.
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Pagination block of the list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_count: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub has_next_page: bool,
    pub limit: u64,
}

impl PageMeta {
    pub fn compute(total_count: u64, page: u64, limit: u64) -> Self {
        let limit = limit.max(1);
        let total_pages = total_count.div_ceil(limit);
        PageMeta {
            total_count,
            total_pages,
            current_page: page,
            has_next_page: page < total_pages,
            limit,
        }
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.filter(|s| !s.is_empty()).map(str::to_string)
}

/// Parses a positive integer, falling back to `default` for anything else
/// (absent, empty, non-numeric, zero or negative).
fn positive_or(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}
