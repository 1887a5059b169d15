use tracing::{info, error, instrument};
use crate::dto::user_dto::CreateUserRequest;
use crate::model::user::User;
use crate::repository::user_repo::UserRepository;
use crate::service::user_query::{PageMeta, UserListQuery};
use crate::util::error::ServiceError;
use async_trait::async_trait;
use std::sync::Arc;

/// One page of users plus its metadata.
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<User>,
    pub pagination: PageMeta,
}

#[async_trait]
pub trait UserService: Send + Sync {
    async fn create_user(&self, request: CreateUserRequest) -> Result<User, ServiceError>;
    async fn list_users(&self, query: UserListQuery) -> Result<UserPage, ServiceError>;
}

pub struct UserServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
}

impl UserServiceImpl {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    #[instrument(skip(self, request), fields(username = ?request.username))]
    async fn create_user(&self, request: CreateUserRequest) -> Result<User, ServiceError> {
        let new_user = request.into_new_user().map_err(|e| {
            let err = ServiceError::from(e);
            info!("Rejected user: {}", err);
            err
        })?;
        // Write failures of any kind are reported back to the client
        match self.user_repo.insert(new_user).await {
            Ok(user) => {
                info!(id = ?user.id, "User created");
                Ok(user)
            }
            Err(e) => {
                error!("Failed to insert user: {e}");
                Err(ServiceError::InvalidInput(e.to_string()))
            }
        }
    }

    #[instrument(skip(self), fields(page = query.page, limit = query.limit))]
    async fn list_users(&self, query: UserListQuery) -> Result<UserPage, ServiceError> {
        let users = self
            .user_repo
            .find(&query.filter, query.skip(), query.limit)
            .await
            .map_err(|e| {
                error!("Failed to list users: {e}");
                ServiceError::InternalError(e.to_string())
            })?;
        let total_count = self.user_repo.count(&query.filter).await.map_err(|e| {
            error!("Failed to count users: {e}");
            ServiceError::InternalError(e.to_string())
        })?;
        Ok(UserPage {
            users,
            pagination: PageMeta::compute(total_count, query.page, query.limit),
        })
    }
}
