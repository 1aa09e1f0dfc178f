use clap::{Parser, Subcommand};
use pulse_types::Granularity;

#[derive(Parser)]
#[command(name = "pulse-worker")]
#[command(about = "Capture, backfill and report subscription-health snapshots")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Capture today's snapshot for every tenant with completed history
    CaptureAll,
    /// Backfill every tenant still lacking history
    BackfillAll,
    /// Capture today's snapshot for one tenant
    Capture {
        /// Tenant (company) ID
        #[arg(long)]
        tenant: String,
    },
    /// Backfill history for one tenant
    Backfill {
        /// Tenant (company) ID
        #[arg(long)]
        tenant: String,

        /// Rebuild even if history is already complete
        #[arg(long)]
        force: bool,
    },
    /// Print a metrics series as JSON
    Series {
        /// Tenant (company) ID
        #[arg(long)]
        tenant: String,

        /// daily, weekly, monthly or quarterly
        #[arg(long, default_value = "daily")]
        granularity: Granularity,

        /// Number of buckets
        #[arg(long, default_value_t = 30)]
        count: u32,
    },
    /// Register a tenant
    Register {
        /// Tenant (company) ID
        #[arg(long)]
        tenant: String,

        /// Display name
        #[arg(long)]
        title: Option<String>,

        /// Backfill immediately after registering
        #[arg(long)]
        backfill: bool,
    },
    /// Enable or disable daily capture for a tenant
    SetCapture {
        /// Tenant (company) ID
        #[arg(long)]
        tenant: String,

        /// true to enable, false to disable
        #[arg(long, action = clap::ArgAction::Set)]
        enabled: bool,
    },
}
