pub mod memory_user_repo;
pub mod repository_error;
pub mod user_repo;
