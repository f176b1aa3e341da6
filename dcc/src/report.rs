//! Per-tick structured reporting.
//!
//! A plain immutable record bundling the fields every poll log line
//! carries, so the scheduler logs each observation with one call instead
//! of repeating the field list.

use tracing::{error, info, warn};

use dcc_common::{ApplicationVersionSnapshot, EnvironmentSnapshot, PollSnapshot};

/// Field bundle for one observed snapshot.
///
/// In application-version mode there is no environment or health to
/// report; those fields carry the application name and a dash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub env: String,
    pub version: String,
    pub status: String,
    pub health: String,
}

impl TickReport {
    pub fn from_snapshot(application: &str, snapshot: &PollSnapshot) -> Self {
        match snapshot {
            PollSnapshot::Environment(env) => Self::for_environment(env),
            PollSnapshot::ApplicationVersion(version) => Self::for_version(application, version),
        }
    }

    pub fn for_environment(snapshot: &EnvironmentSnapshot) -> Self {
        Self {
            env: snapshot.name.clone(),
            version: snapshot.version_label.clone(),
            status: snapshot.status.to_string(),
            health: snapshot.health.to_string(),
        }
    }

    pub fn for_version(application: &str, snapshot: &ApplicationVersionSnapshot) -> Self {
        Self {
            env: application.to_string(),
            version: snapshot.version_label.clone(),
            status: snapshot.status.to_string(),
            health: "-".to_string(),
        }
    }

    pub fn info(&self, message: &str) {
        info!(
            env = %self.env,
            status = %self.status,
            health = %self.health,
            version = %self.version,
            "{message}"
        );
    }

    pub fn warn(&self, message: &str) {
        warn!(
            env = %self.env,
            status = %self.status,
            health = %self.health,
            version = %self.version,
            "{message}"
        );
    }

    pub fn error(&self, message: &str) {
        error!(
            env = %self.env,
            status = %self.status,
            health = %self.health,
            version = %self.version,
            "{message}"
        );
    }
}
