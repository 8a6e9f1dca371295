//! Service layer: business logic orchestration.
//!
//! [`StakingService`] resolves the live program layout through
//! [`VersionResolver`], runs the reward engine, and hands results to the
//! transaction builders.

pub mod staking_service;
pub mod version_resolver;

pub use staking_service::StakingService;
pub use version_resolver::{ProgramIds, ResolvedVersion, VersionResolver};
