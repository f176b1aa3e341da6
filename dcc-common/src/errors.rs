//! Error taxonomy for the Deploy Convergence Checker.
//!
//! Configuration problems fail before the poll loop starts; everything the
//! loop itself can hit is fatal on first occurrence — the only retry in
//! the system is the implicit "still converging" path via the next tick.

use std::time::Duration;

use thiserror::Error;

/// Configuration problems detected before the loop starts. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Application name is required and must be non-empty.
    #[error("application name is required")]
    MissingApplication,

    /// Timeout and tick must both be strictly positive.
    #[error("{field} must be a positive duration")]
    NonPositiveDuration { field: &'static str },
}

/// Failure reported by the remote status query.
///
/// These are transport-level outcomes; an empty-but-successful result is a
/// business outcome the caller surfaces as [`CheckError::NotFound`], never
/// something the query converts or swallows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The request never produced a usable response (connect, TLS, I/O).
    #[error("platform request failed: {message}")]
    Transport { message: String },

    /// The platform answered with a non-success status.
    #[error("platform returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("malformed platform response: {message}")]
    Decode { message: String },
}

/// Terminal outcome of a check run that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// Invalid configuration, surfaced before any polling.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The remote query failed; fatal, never retried.
    #[error("problem retrieving deployment status: {0}")]
    Query(#[from] QueryError),

    /// The query succeeded but matched nothing. A misconfigured name, not
    /// a deploy in progress; waiting cannot fix it.
    #[error("application {application} environment [{environment}] not found")]
    NotFound {
        application: String,
        environment: String,
    },

    /// The platform reports an explicit failure for the target version.
    #[error("deployment of {version_label} failed: {reason}")]
    DeploymentFailed {
        version_label: String,
        reason: String,
    },

    /// Budget exhausted while still converging. The expected outcome for a
    /// deploy that never completed in time, not a programming error.
    #[error("timed out after {waited:?}")]
    TimedOut { waited: Duration },
}
