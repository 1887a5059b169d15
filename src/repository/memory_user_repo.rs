use crate::model::user::{NewUser, User};
use crate::repository::repository_error::RepositoryResult;
use crate::repository::user_repo::UserRepository;
use crate::service::user_query::UserFilter;
use async_trait::async_trait;
use bson::oid::ObjectId;
use tokio::sync::RwLock;

/// In-process [`UserRepository`] that keeps documents in insertion order.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    pub async fn all(&self) -> Vec<User> {
        self.users.read().await.clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: NewUser) -> RepositoryResult<User> {
        let user = user.into_user(ObjectId::new());
        self.users.write().await.push(user.clone());
        Ok(user)
    }

    async fn find(&self, filter: &UserFilter, skip: u64, limit: u64) -> RepositoryResult<Vec<User>> {
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|user| filter.matches(user))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &UserFilter) -> RepositoryResult<u64> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|user| filter.matches(user)).count() as u64)
    }
}
