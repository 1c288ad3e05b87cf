//! Agrinova RBAC maintenance worker.

#![forbid(unsafe_code)]

use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use agrinova_application::{
    AuthorizationRequest, AuthorizationService, Clock, OverrideCleanupService,
    RbacBootstrapService, RbacStatisticsRepository, RbacStores, SystemClock,
};
use agrinova_core::{AppError, AppResult, UserId};
use agrinova_domain::{PermissionScope, ScopeType};
use agrinova_infrastructure::{PostgresRbacRepository, PostgresUserDirectory, run_migrations};

use clap::{Parser, Subcommand};
use serde::Serialize;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct WorkerConfig {
    database_url: String,
    max_connections: u32,
    store_timeout_ms: u64,
    cleanup_interval_secs: u64,
}

#[derive(Debug, Parser)]
#[command(name = "agrinova-worker", version, about = "Agrinova RBAC maintenance worker")]
struct Cli {
    #[command(subcommand)]
    command: Option<WorkerCommand>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum WorkerCommand {
    /// Sweep expired overrides until interrupted (default).
    Run,
    /// Apply pending database migrations.
    Migrate,
    /// Migrate, then seed system roles, permissions and grants.
    Seed,
    /// Print RBAC statistics as JSON.
    Stats,
    /// Evaluate one permission for a user and print the decision.
    Check {
        /// User to evaluate.
        user_id: Uuid,
        /// Permission name, for example `harvest:approve`.
        permission: String,
        /// Resource type the check targets: company, estate, division or block.
        #[arg(requires = "scope_id")]
        scope_type: Option<ScopeType>,
        /// Resource id the check targets.
        scope_id: Option<Uuid>,
    },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let command = Cli::parse().command.unwrap_or(WorkerCommand::Run);
    let config = WorkerConfig::load()?;
    let pool = connect_pool(&config).await?;

    match command {
        WorkerCommand::Migrate => run_migrations(&pool).await,
        WorkerCommand::Seed => {
            run_migrations(&pool).await?;
            let report = RbacBootstrapService::new(build_stores(&pool))
                .seed_defaults()
                .await?;
            print_json(&report)
        }
        WorkerCommand::Stats => {
            let stats = PostgresRbacRepository::new(pool)
                .rbac_statistics(SystemClock.now())
                .await?;
            print_json(&stats)
        }
        WorkerCommand::Check {
            user_id,
            permission,
            scope_type,
            scope_id,
        } => {
            let engine = build_engine(&pool, &config);
            let mut request = AuthorizationRequest::new(UserId::from_uuid(user_id), permission);
            if let Some((scope_type, scope_id)) = scope_type.zip(scope_id) {
                request = request.with_scope(PermissionScope::new(scope_type, scope_id));
            }
            let decision = engine.authorize(&request).await;
            print_json(&decision)
        }
        WorkerCommand::Run => run_cleanup_loop(pool, &config).await,
    }
}

async fn run_cleanup_loop(pool: PgPool, config: &WorkerConfig) -> AppResult<()> {
    let cleanup = OverrideCleanupService::new(
        Arc::new(PostgresRbacRepository::new(pool)),
        Arc::new(SystemClock),
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    info!(
        cleanup_interval_secs = config.cleanup_interval_secs,
        store_timeout_ms = config.store_timeout_ms,
        "agrinova-worker started"
    );

    tokio::spawn(async move {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(error = %error, "failed to listen for shutdown signal");
        }
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let purged = cleanup
        .run_periodic(
            Duration::from_secs(config.cleanup_interval_secs),
            shutdown_rx,
        )
        .await;
    info!(purged, "agrinova-worker stopped");
    Ok(())
}

fn build_stores(pool: &PgPool) -> RbacStores {
    let repository = Arc::new(PostgresRbacRepository::new(pool.clone()));
    RbacStores {
        roles: repository.clone(),
        permissions: repository.clone(),
        role_permissions: repository.clone(),
        overrides: repository,
        users: Arc::new(PostgresUserDirectory::new(pool.clone())),
    }
}

fn build_engine(pool: &PgPool, config: &WorkerConfig) -> AuthorizationService {
    AuthorizationService::new(build_stores(pool), Arc::new(SystemClock))
        .with_store_timeout(Duration::from_millis(config.store_timeout_ms))
}

fn print_json(value: &impl Serialize) -> AppResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|error| AppError::Internal(format!("failed to render output: {error}")))?;
    println!("{rendered}");
    Ok(())
}

async fn connect_pool(config: &WorkerConfig) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(config.database_url.as_str())
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

impl WorkerConfig {
    fn load() -> AppResult<Self> {
        let database_url = required_env("DATABASE_URL")?;
        let max_connections = parse_env_u32("DATABASE_MAX_CONNECTIONS", 5)?;
        let store_timeout_ms = parse_env_u64("RBAC_STORE_TIMEOUT_MS", 5000)?;
        let cleanup_interval_secs = parse_env_u64("OVERRIDE_CLEANUP_INTERVAL_SECS", 300)?;

        if max_connections == 0 {
            return Err(AppError::Validation(
                "DATABASE_MAX_CONNECTIONS must be greater than zero".to_owned(),
            ));
        }

        if store_timeout_ms == 0 {
            return Err(AppError::Validation(
                "RBAC_STORE_TIMEOUT_MS must be greater than zero".to_owned(),
            ));
        }

        if cleanup_interval_secs == 0 {
            return Err(AppError::Validation(
                "OVERRIDE_CLEANUP_INTERVAL_SECS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            database_url,
            max_connections,
            store_timeout_ms,
            cleanup_interval_secs,
        })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn parse_env_u32(name: &str, default: u32) -> AppResult<u32> {
    parse_value(name, env::var(name).ok(), default)
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    parse_value(name, env::var(name).ok(), default)
}

fn parse_value<T>(name: &str, value: Option<String>, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(value) => value.trim().parse::<T>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}
