//! Pulse Worker
//!
//! One-shot command-line worker, meant to be run by cron or any external
//! scheduler.
//!
//! ## Commands
//!
//! - `capture-all` - Capture today's snapshot for every eligible tenant
//! - `backfill-all` - Backfill every tenant still lacking history
//! - `capture --tenant <id>` - Capture one tenant
//! - `backfill --tenant <id> [--force]` - Backfill one tenant
//! - `series --tenant <id> --granularity <g> --count <n>` - Print a series as JSON
//! - `register --tenant <id> [--title <t>] [--backfill]` - Register a tenant
//! - `set-capture --tenant <id> --enabled <bool>` - Toggle daily capture
//!
//! Batch commands exit non-zero when any tenant failed.

mod cli;
mod config;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use pulse_core::{BatchReport, SnapshotService};
use pulse_db::pg::{PgSnapshotRepository, PgTenantRepository};
use pulse_db::{CreateTenant, Repositories, TenantRepository};
use pulse_platform::HttpPlatformClient;
use pulse_types::TenantId;
use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::config::Config;

type Service = SnapshotService<PgTenantRepository, PgSnapshotRepository, HttpPlatformClient>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    pulse_utils::load_env();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pulse_worker=info,pulse_core=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        api_base = %config.platform.api_base,
        batch_concurrency = config.core.batch_concurrency,
        "Configuration loaded"
    );

    // Create database pool
    let pool = pulse_db::create_pool_with_options(&config.database_url, config.pool.clone())
        .await
        .context("connecting to database")?;
    pulse_db::run_migrations(&pool).await?;
    tracing::debug!("Database ready");

    let repos = Repositories::new(pool);
    let tenants = Arc::new(repos.tenants);
    let platform = Arc::new(HttpPlatformClient::new(config.platform.clone())?);
    let service = SnapshotService::new(
        config.core.clone(),
        Arc::clone(&tenants),
        Arc::new(repos.snapshots),
        platform,
    );

    run(cli.command, &service, tenants.as_ref()).await
}

async fn run(command: Command, service: &Service, tenants: &PgTenantRepository) -> anyhow::Result<()> {
    match command {
        Command::CaptureAll => {
            let report = service.capture_all_snapshots().await?;
            finish_batch("capture-all", &report)
        }
        Command::BackfillAll => {
            let report = service.backfill_all_companies_needing_history().await?;
            finish_batch("backfill-all", &report)
        }
        Command::Capture { tenant } => {
            let snapshot = service.capture_snapshot(&tenant).await?;
            print_json(&snapshot.metrics)
        }
        Command::Backfill { tenant, force } => {
            let outcome = if force {
                service.force_backfill(&tenant).await?
            } else {
                service.backfill_history(&tenant).await?
            };
            print_json(&outcome)
        }
        Command::Series {
            tenant,
            granularity,
            count,
        } => {
            let series = service.get_series(&tenant, granularity, count).await?;
            let points: Vec<_> = series.points().collect();
            print_json(&points)
        }
        Command::Register {
            tenant,
            title,
            backfill,
        } => {
            let id = TenantId::parse(&tenant)?;
            let row = tenants.register(CreateTenant { id, title }).await?;
            tracing::info!(tenant_id = %row.id, "Tenant registered");

            if backfill {
                let outcome = service.spawn_backfill(&tenant).await??;
                print_json(&outcome)
            } else {
                Ok(())
            }
        }
        Command::SetCapture { tenant, enabled } => {
            let id = TenantId::parse(&tenant)?;
            tenants.set_capture_enabled(&id, enabled).await?;
            tracing::info!(tenant_id = %id, enabled, "Capture setting updated");
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn finish_batch(name: &str, report: &BatchReport) -> anyhow::Result<()> {
    print_json(report)?;
    if report.failures.is_empty() {
        tracing::info!(command = name, succeeded = report.succeeded, "Batch finished");
        Ok(())
    } else {
        anyhow::bail!("{name}: {} of {} tenants failed", report.failures.len(), report.total())
    }
}
