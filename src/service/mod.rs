pub mod seed_service;
pub mod user_query;
pub mod user_service;
