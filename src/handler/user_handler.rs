use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use crate::dto::user_dto::{CreateUserRequest, ListUsersQuery, UserDto, UserListResponse};
use crate::service::user_query::UserListQuery;
use crate::service::user_service::{UserService, UserServiceImpl};
use crate::util::error::HandlerError;
use std::sync::Arc;
use tracing::{debug, warn};


// List users with optional filters and pagination
pub async fn list_users_handler(
    State(service): State<Arc<UserServiceImpl>>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Query(pairs) = params.map_err(|e| {
        warn!("Rejected list query: {}", e);
        HandlerError::bad_request(e.body_text())
    })?;
    let query = UserListQuery::from_params(&ListUsersQuery::from_pairs(pairs));
    debug!(?query, "Listing users");

    let page = service.list_users(query).await?;
    Ok(Json(UserListResponse {
        users: page.users.into_iter().map(UserDto::from).collect(),
        pagination: page.pagination,
    }))
}


// Create a user
pub async fn create_user_handler(
    State(service): State<Arc<UserServiceImpl>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(payload) = payload.map_err(|e| {
        warn!("Rejected user payload: {}", e);
        HandlerError::bad_request(e.body_text())
    })?;

    let user = service.create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}
