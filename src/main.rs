use dotenv::dotenv;
use roster_backend::app::app::App;
use roster_backend::util::logger::Logger;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env first so LOG_DIR and the log levels can come from it
    let env_file = dotenv();

    let _logger = match Logger::new("roster-backend") {
        Ok(logger) => Some(logger),
        Err(e) => {
            Logger::console_only();
            warn!("⚠️ File logging disabled: {}", e);
            None
        }
    };

    info!("🚀 Starting Roster Backend");
    match env_file {
        Ok(_) => info!("✅ Successfully loaded .env file"),
        Err(e) => warn!("⚠️ Failed to load .env file: {} (using system env vars)", e),
    }

    let app = App::new().await;
    match app.start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server stopped: {}", e);
            ExitCode::FAILURE
        }
    }
}
