use anyhow::Context;
use rusty_library::{
    adapters::{
        postgres::{PostgresBookRepository, PostgresLoanRepository},
        smtp::SmtpEmailService,
    },
    api::{handlers::AppState, router::create_router},
    application::{
        ServiceDependencies,
        notification::{OverdueNotice, spawn_daily_notifier},
    },
    config::AppConfig,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_library=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    // Initialize adapters
    let book_repository = Arc::new(PostgresBookRepository::new(pool.clone()));
    let loan_repository = Arc::new(PostgresLoanRepository::new(pool.clone()));
    let email_service = Arc::new(
        SmtpEmailService::new(&config.email)
            .map_err(|e| anyhow::anyhow!(e))
            .context("Failed to configure SMTP transport")?,
    );

    let service_deps = ServiceDependencies {
        book_repository,
        loan_repository,
        email_service,
    };

    if config.notifier.enabled {
        let notice = OverdueNotice {
            overdue_days: config.loans.overdue_days,
            message: config.email.late_loan_message.clone(),
        };
        spawn_daily_notifier(service_deps.clone(), notice);
        tracing::info!("Overdue loan notifier scheduled daily at midnight");
    }

    let app_state = Arc::new(AppState { service_deps });
    let app = create_router(app_state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
