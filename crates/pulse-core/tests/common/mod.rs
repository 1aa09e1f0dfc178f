//! Common test utilities for pulse-core integration tests

pub mod fixtures;
pub mod mock_platform;
pub mod mock_repos;

#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_platform::{MockPlatform, PlatformData};
#[allow(unused_imports)]
pub use mock_repos::{MockSnapshotRepository, MockTenantRepository};
