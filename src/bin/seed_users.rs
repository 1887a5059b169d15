use clap::Parser;
use dotenv::dotenv;
use roster_backend::config::{MongoConfig, SeedConfig, SeedFailurePolicy};
use roster_backend::repository::user_repo::MongoUserRepository;
use roster_backend::service::seed_service::BulkSeeder;
use roster_backend::util::logger::Logger;
use roster_backend::util::user_generator::RandomUserGenerator;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "seed_users")]
#[command(about = "Populate the users collection with synthetic records")]
struct Cli {
    /// Number of users to create (also read from `SEED_COUNT`).
    #[arg(long, env = "SEED_COUNT")]
    count: Option<usize>,

    /// Maximum inserts in flight (also read from `SEED_CONCURRENCY`).
    #[arg(long, env = "SEED_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Stop starting new inserts after the first failure.
    #[arg(long)]
    fail_fast: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let env_file = dotenv();
    let cli = Cli::parse();

    let _logger = match Logger::new("seed-users") {
        Ok(logger) => Some(logger),
        Err(e) => {
            Logger::console_only();
            warn!("File logging disabled: {}", e);
            None
        }
    };
    if let Err(e) = env_file {
        warn!("Failed to load .env file: {} (using system env vars)", e);
    }

    let mut seed_config = match SeedConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Seed config error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(count) = cli.count {
        seed_config.count = count;
    }
    if let Some(concurrency) = cli.concurrency {
        seed_config.concurrency = concurrency;
    }
    if cli.fail_fast {
        seed_config.failure_policy = SeedFailurePolicy::FailFast;
    }
    if let Err(e) = seed_config.validate() {
        error!("Seed config error: {e}");
        return ExitCode::FAILURE;
    }

    let mongo_config = match MongoConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Mongo config error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let repo = match MongoUserRepository::new(&mongo_config).await {
        Ok(repo) => repo,
        Err(e) => {
            error!("Connection error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let client = repo.client().clone();

    let outcome = {
        let seeder = BulkSeeder::new(Arc::new(repo), Arc::new(RandomUserGenerator), &seed_config);
        seeder.run().await
    };

    // Release the connection whatever the outcome
    client.shutdown().await;
    info!("Disconnected from MongoDB");

    match outcome {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(report) => {
            error!(
                failed = report.failures.len(),
                attempted = report.attempted,
                "Seeding finished with failures"
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Seeding aborted: {e}");
            ExitCode::FAILURE
        }
    }
}
