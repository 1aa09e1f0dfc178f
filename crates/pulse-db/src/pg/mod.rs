//! PostgreSQL repository implementations

mod snapshot;
mod tenant;

pub use snapshot::PgSnapshotRepository;
pub use tenant::PgTenantRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub tenants: PgTenantRepository,
    pub snapshots: PgSnapshotRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            tenants: PgTenantRepository::new(pool.clone()),
            snapshots: PgSnapshotRepository::new(pool),
        }
    }
}
