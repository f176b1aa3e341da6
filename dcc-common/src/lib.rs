//! Shared types and contracts for the Deploy Convergence Checker.
//!
//! Everything the scheduler, the evaluator, and the platform client agree
//! on lives here: the target and snapshot vocabulary, the status-query
//! contract, the error taxonomy, and the deterministic mock used by tests
//! across the workspace.

pub mod errors;
pub mod mock;
pub mod query;
pub mod types;

pub use errors::{CheckError, ConfigError, QueryError};
pub use mock::MockStatusQuery;
pub use query::PlatformStatusQuery;
pub use types::{
    ApplicationVersionSnapshot, Classification, DeployTarget, EnvironmentSnapshot, HealthStatus,
    LifecycleStatus, PollSnapshot, ProcessingStatus, ReportLevel, TimeoutBudget,
};
