use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use football_etl::config::Config;
use football_etl::db;
use football_etl::error::Result;
use football_etl::fetcher::MatchFetcher;
use football_etl::pipeline::Pipeline;
use football_etl::report::RunStatus;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    match run(cfg).await {
        Ok(status) => std::process::exit(status.exit_code()),
        Err(e) => {
            error!("Fatal error: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(cfg: Config) -> Result<RunStatus> {
    let codes: Vec<&str> = cfg.competitions.iter().map(|c| c.code()).collect();
    info!(
        competitions = %codes.join(","),
        concurrency = cfg.concurrency,
        schema_mode = %cfg.schema_mode,
        "Starting football data run",
    );

    let pool = db::open_pool(&cfg).await?;
    info!("Database ready at {}", cfg.db_path);

    let fetcher = MatchFetcher::new(&cfg)?;
    let pipeline = Pipeline::new(&cfg, fetcher, pool.clone());
    let report = pipeline.run_all().await;

    pool.close().await;
    Ok(report.status())
}
