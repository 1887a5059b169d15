use crate::model::user::{NewUser, Role, User};
use crate::service::user_query::PageMeta;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

// --- Validated DTOs for request validation ---

/// Body of `POST /users`.
///
/// Every field is optional at the JSON level so that a missing field is
/// reported as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(
        required(message = "Path `username` is required."),
        length(min = 1, message = "Path `username` is required.")
    )]
    pub username: Option<String>,

    #[serde(rename = "employeeId")]
    #[validate(
        required(message = "Path `employeeId` is required."),
        length(min = 1, message = "Path `employeeId` is required.")
    )]
    pub employee_id: Option<String>,

    #[validate(
        required(message = "Path `email` is required."),
        length(min = 1, message = "Path `email` is required.")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "Path `role` is required."),
        length(min = 1, message = "Path `role` is required.")
    )]
    pub role: Option<String>,
}

impl CreateUserRequest {
    /// Runs the required-field and role checks and, when they all pass,
    /// produces a record ready to be persisted. Values are kept verbatim.
    pub fn into_new_user(self) -> Result<NewUser, ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(e) => e,
        };

        let role = match self.role.as_deref() {
            Some(raw) if !raw.is_empty() => match raw.parse::<Role>() {
                Ok(role) => Some(role),
                Err(e) => {
                    let mut err = ValidationError::new("enum");
                    err.message = Some(Cow::Owned(e.to_string()));
                    err.add_param(Cow::Borrowed("value"), &raw);
                    errors.add("role", err);
                    None
                }
            },
            _ => None,
        };

        match (self.username, self.employee_id, self.email, role) {
            (Some(username), Some(employee_id), Some(email), Some(role))
                if errors.errors().is_empty() =>
            {
                Ok(NewUser::new(username, employee_id, email, role))
            }
            _ => Err(errors),
        }
    }
}

/// Raw query string of `GET /users`. Numbers are parsed leniently by the
/// query builder, so they arrive as text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
}

impl ListUsersQuery {
    /// Collects the known parameters from raw `key=value` pairs. A key given
    /// more than once keeps its first value; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = ListUsersQuery::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page" => &mut query.page,
                "limit" => &mut query.limit,
                "username" => &mut query.username,
                "role" => &mut query.role,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

/// A user as returned over HTTP, with the ObjectId rendered as hex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    #[serde(rename = "employeeId")]
    pub employee_id: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            username: user.username,
            employee_id: user.employee_id,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<UserDto>,
    pub pagination: PageMeta,
}
