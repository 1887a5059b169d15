use axum::{Router, routing::get};
use crate::handler::user_handler::{create_user_handler, list_users_handler};
use std::sync::Arc;
use crate::service::user_service::UserServiceImpl;

pub fn user_router(service: Arc<UserServiceImpl>) -> Router {
    Router::new()
        .route("/users", get(list_users_handler).post(create_user_handler))
        .with_state(service)
}
