use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use playlists_api::{
    auth::TokenService,
    config::AppConfig,
    database::DatabaseManager,
    router, AppState,
};

#[derive(Parser)]
#[command(name = "playlists-api")]
#[command(about = "REST backend for bands, members and per-band playlists")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, env = "SKIP_MIGRATIONS", help = "Do not apply pending migrations on startup")]
        skip_migrations: bool,
    },

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and JWT_SECRET
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("invalid configuration")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting Playlists API in {:?} mode", config.environment);

    match cli.command.unwrap_or(Commands::Serve { skip_migrations: false }) {
        Commands::Migrate => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            pool.close().await;
            Ok(())
        }
        Commands::Serve { skip_migrations } => serve(config, skip_migrations).await,
    }
}

async fn serve(config: AppConfig, skip_migrations: bool) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    if !skip_migrations {
        DatabaseManager::migrate(&pool).await.context("failed to run migrations")?;
    }

    let tokens = TokenService::from_config(&config.security).context("invalid token configuration")?;
    let app = router(AppState::new(pool.clone(), tokens), &config.server);

    let bind_addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Playlists API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
