pub mod error;
pub mod logger;
pub mod user_generator;
