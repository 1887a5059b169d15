use axum::{Router, routing::get, http::{header, Method}};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use crate::config::app_conf::AppConfig;
use crate::config::ConfigError;
use crate::config::mongo_conf::MongoConfig;
use crate::config::seed_conf::SeedConfig;
use crate::repository::user_repo::{MongoUserRepository, UnavailableUserRepository, UserRepository};
use crate::router::user_router::user_router;
use crate::service::seed_service::BulkSeeder;
use crate::service::user_service::UserServiceImpl;
use crate::util::user_generator::RandomUserGenerator;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid listen address: {0}")]
    InvalidAddress(#[from] ConfigError),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct App {
    config: AppConfig,
    router: Router,
    pub user_service: Arc<UserServiceImpl>,
}

impl App {
    pub async fn new() -> Self {
        let config = AppConfig::from_env();
        let user_repo = Self::connect_user_repository().await;
        let user_service = Arc::new(UserServiceImpl::new(user_repo));
        let router = build_router(user_service.clone());

        let app = App { config, router, user_service };
        app.spawn_startup_seed();
        app
    }

    /// Builds the MongoDB repository. Failures are logged and replaced by a
    /// repository that errors per request, so the server still comes up.
    async fn connect_user_repository() -> Arc<dyn UserRepository> {
        let mongo_config = match MongoConfig::from_env() {
            Ok(c) => c,
            Err(e) => {
                error!("Mongo config error: {e}");
                return Arc::new(UnavailableUserRepository::new(e.to_string()));
            }
        };

        match MongoUserRepository::new(&mongo_config).await {
            Ok(repo) => {
                match repo.ping().await {
                    Ok(()) => info!("MongoDB connected"),
                    Err(e) => error!("Connection error: {e}"),
                }
                Arc::new(repo)
            }
            Err(e) => {
                error!("Connection error: {e}");
                Arc::new(UnavailableUserRepository::new(e.to_string()))
            }
        }
    }

    fn spawn_startup_seed(&self) {
        let seed_config = match SeedConfig::from_env() {
            Ok(c) => c,
            Err(e) => {
                warn!("Seed config not loaded: {e}");
                return;
            }
        };
        if !seed_config.on_startup {
            return;
        }

        info!(count = seed_config.count, "Starting background seeding");
        let seeder = BulkSeeder::new(
            self.user_service.user_repo.clone(),
            Arc::new(RandomUserGenerator),
            &seed_config,
        );
        tokio::spawn(async move {
            if let Err(e) = seeder.run().await {
                error!("Background seeding aborted: {e}");
            }
        });
    }

    pub async fn start(self) -> Result<(), AppError> {
        let addr = self.config.socket_addr()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("🚀 Server is running at http://{}", addr);
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}

/// Full HTTP surface: user routes, health check, CORS and request tracing.
pub fn build_router(user_service: Arc<UserServiceImpl>) -> Router {
    Router::new()
        .merge(user_router(user_service))
        .route("/health", get(|| async { "OK" }))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
