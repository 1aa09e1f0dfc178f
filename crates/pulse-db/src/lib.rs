//! Pulse DB - Persistence abstractions
//!
//! Repository traits for tenants and daily snapshots, with SQLx-based
//! PostgreSQL implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! use pulse_db::{create_pool, run_migrations, Repositories};
//!
//! let pool = create_pool("postgres://localhost/pulse").await?;
//! run_migrations(&pool).await?;
//! let repos = Repositories::new(pool);
//!
//! let tenants = repos.tenants.list_needing_backfill().await?;
//! ```

pub mod error;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool, create_pool_with_options, run_migrations, DbPool, PoolOptions};
pub use repo::*;
