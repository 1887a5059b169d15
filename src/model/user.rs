use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role held by a staff user. Stored lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Collector,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Collector];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Collector => "collector",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a valid role (expected admin, manager or collector)", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// A user document as stored in the `users` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    #[serde(rename = "employeeId")]
    pub employee_id: String,
    pub email: String,
    pub role: Role,
}

/// A user that passed validation but has not been persisted yet.
///
/// Fields are private so the only ways to obtain one are
/// `CreateUserRequest::into_new_user` and the record generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    username: String,
    employee_id: String,
    email: String,
    role: Role,
}

impl NewUser {
    pub(crate) fn new(username: String, employee_id: String, email: String, role: Role) -> Self {
        NewUser { username, employee_id, email, role }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn employee_id(&self) -> &str {
        &self.employee_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Turns this record into a stored document with the given identity.
    pub fn into_user(self, id: ObjectId) -> User {
        User {
            id: Some(id),
            username: self.username,
            employee_id: self.employee_id,
            email: self.email,
            role: self.role,
        }
    }
}
