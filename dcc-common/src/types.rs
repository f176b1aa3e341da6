//! Common types shared by the checker core and its collaborators.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// The deployment a single check run verifies.
///
/// Immutable for the lifetime of one check: the scheduler borrows it on
/// every tick and never mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployTarget {
    /// Application name on the platform.
    pub application: String,
    /// Optional environment name; `None` means every environment of the
    /// application is inspected.
    pub environment: Option<String>,
    /// Version label the deployment is expected to converge to.
    pub version_label: String,
    /// Platform region hosting the application.
    pub region: String,
}

impl DeployTarget {
    /// Build a target, rejecting an empty application name up front.
    pub fn new(
        application: impl Into<String>,
        environment: Option<String>,
        version_label: impl Into<String>,
        region: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let application = application.into();
        if application.trim().is_empty() {
            return Err(ConfigError::MissingApplication);
        }
        Ok(Self {
            application,
            environment: environment.filter(|e| !e.is_empty()),
            version_label: version_label.into(),
            region: region.into(),
        })
    }

    /// Environment selector as the platform API expects it, empty when the
    /// check spans all environments.
    pub fn environment_selector(&self) -> &str {
        self.environment.as_deref().unwrap_or_default()
    }
}

/// Platform-reported state of an environment's deployment process.
///
/// Unknown values deserialize to [`LifecycleStatus::Unknown`] so a new
/// platform state reads as "still converging" instead of a decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LifecycleStatus {
    Ready,
    Launching,
    Updating,
    Terminating,
    Terminated,
    Unknown,
}

impl From<&str> for LifecycleStatus {
    fn from(value: &str) -> Self {
        match value {
            "Ready" => Self::Ready,
            "Launching" => Self::Launching,
            "Updating" => Self::Updating,
            "Terminating" => Self::Terminating,
            "Terminated" => Self::Terminated,
            _ => Self::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for LifecycleStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from(value.as_str()))
    }
}

impl std::fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => write!(f, "Ready"),
            Self::Launching => write!(f, "Launching"),
            Self::Updating => write!(f, "Updating"),
            Self::Terminating => write!(f, "Terminating"),
            Self::Terminated => write!(f, "Terminated"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Platform-reported aggregate health signal, independent of lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    Green,
    Yellow,
    Red,
    Grey,
    Unknown,
}

impl From<&str> for HealthStatus {
    fn from(value: &str) -> Self {
        match value {
            "Green" => Self::Green,
            "Yellow" => Self::Yellow,
            "Red" => Self::Red,
            "Grey" => Self::Grey,
            _ => Self::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for HealthStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from(value.as_str()))
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Green => write!(f, "Green"),
            Self::Yellow => write!(f, "Yellow"),
            Self::Red => write!(f, "Red"),
            Self::Grey => write!(f, "Grey"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Processing state of an uploaded application version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Processed,
    Processing,
    Building,
    Failed,
    Unknown,
}

impl From<&str> for ProcessingStatus {
    fn from(value: &str) -> Self {
        match value {
            "processed" => Self::Processed,
            "processing" => Self::Processing,
            "building" => Self::Building,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for ProcessingStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from(value.as_str()))
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Processed => write!(f, "processed"),
            Self::Processing => write!(f, "processing"),
            Self::Building => write!(f, "building"),
            Self::Failed => write!(f, "failed"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One environment description as returned by the environment-status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    /// Environment name.
    pub name: String,
    /// Version label currently deployed to the environment.
    pub version_label: String,
    /// Deployment lifecycle state.
    pub status: LifecycleStatus,
    /// Aggregate health signal.
    pub health: HealthStatus,
}

/// One application-version description as returned by the version query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationVersionSnapshot {
    /// Version label of the described build.
    pub version_label: String,
    /// Processing state of the version.
    pub status: ProcessingStatus,
}

/// One item returned per poll, produced fresh each tick and discarded
/// after evaluation. Which variant arrives depends on the active query
/// mode; the scheduler is agnostic to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollSnapshot {
    Environment(EnvironmentSnapshot),
    ApplicationVersion(ApplicationVersionSnapshot),
}

/// Log level a converging observation should be reported at.
///
/// A version-label mismatch is the expected mid-deploy picture and logs at
/// info; a matching label that is not ready or not healthy is suspicious
/// and logs at warn, as the original checker did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    Info,
    Warn,
}

/// Verdict for one snapshot on one tick. Derived, never persisted.
///
/// `Converging` never terminates the loop; `Succeeded` and `Failed` do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Deployment has not finished rolling out; poll again next tick.
    Converging { reason: String, level: ReportLevel },
    /// Observed state matches the expected target and is healthy.
    Succeeded { reason: String },
    /// The platform reports a terminal failure; never retried.
    Failed { reason: String },
}

impl Classification {
    pub fn converging(reason: impl Into<String>, level: ReportLevel) -> Self {
        Self::Converging {
            reason: reason.into(),
            level,
        }
    }

    pub fn succeeded(reason: impl Into<String>) -> Self {
        Self::Succeeded {
            reason: reason.into(),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Human-readable reason carried for logging.
    pub fn reason(&self) -> &str {
        match self {
            Self::Converging { reason, .. } | Self::Succeeded { reason } | Self::Failed { reason } => {
                reason
            }
        }
    }

    /// Whether this classification ends the poll loop.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Converging { .. })
    }
}

/// Bounds for one check run: total wall-clock budget and poll interval.
///
/// Both must be strictly positive. `total >= tick` is expected but not
/// enforced; a budget smaller than the interval times out on or before the
/// first tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutBudget {
    /// Total wall-clock budget for the check.
    pub total: Duration,
    /// Interval between polls.
    pub tick: Duration,
}

impl TimeoutBudget {
    /// Validate and build a budget.
    pub fn new(total: Duration, tick: Duration) -> Result<Self, ConfigError> {
        if total.is_zero() {
            return Err(ConfigError::NonPositiveDuration { field: "timeout" });
        }
        if tick.is_zero() {
            return Err(ConfigError::NonPositiveDuration { field: "tick" });
        }
        Ok(Self { total, tick })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_target_rejects_empty_application() {
        let err = DeployTarget::new("", None, "v1", "us-east-1").unwrap_err();
        assert!(matches!(err, ConfigError::MissingApplication));

        let err = DeployTarget::new("   ", None, "v1", "us-east-1").unwrap_err();
        assert!(matches!(err, ConfigError::MissingApplication));
    }

    #[test]
    fn test_deploy_target_empty_environment_means_all() {
        let target =
            DeployTarget::new("orders-api", Some(String::new()), "v42", "us-east-1").unwrap();
        assert_eq!(target.environment, None);
        assert_eq!(target.environment_selector(), "");

        let target =
            DeployTarget::new("orders-api", Some("prod".to_string()), "v42", "us-east-1").unwrap();
        assert_eq!(target.environment_selector(), "prod");
    }

    #[test]
    fn test_unknown_lifecycle_status_deserializes_to_unknown() {
        let status: LifecycleStatus = serde_json::from_str("\"Hibernating\"").unwrap();
        assert_eq!(status, LifecycleStatus::Unknown);

        let status: LifecycleStatus = serde_json::from_str("\"Ready\"").unwrap();
        assert_eq!(status, LifecycleStatus::Ready);
    }

    #[test]
    fn test_unknown_health_status_deserializes_to_unknown() {
        let health: HealthStatus = serde_json::from_str("\"Chartreuse\"").unwrap();
        assert_eq!(health, HealthStatus::Unknown);
    }

    #[test]
    fn test_processing_status_wire_names_are_lowercase() {
        let status: ProcessingStatus = serde_json::from_str("\"processed\"").unwrap();
        assert_eq!(status, ProcessingStatus::Processed);

        let status: ProcessingStatus = serde_json::from_str("\"building\"").unwrap();
        assert_eq!(status, ProcessingStatus::Building);

        let status: ProcessingStatus = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(status, ProcessingStatus::Unknown);
    }

    #[test]
    fn test_environment_snapshot_deserializes_from_api_shape() {
        let snapshot: EnvironmentSnapshot = serde_json::from_str(
            r#"{"name":"prod","version_label":"v42","status":"Ready","health":"Green"}"#,
        )
        .unwrap();
        assert_eq!(snapshot.name, "prod");
        assert_eq!(snapshot.status, LifecycleStatus::Ready);
        assert_eq!(snapshot.health, HealthStatus::Green);
    }

    #[test]
    fn test_classification_terminality() {
        assert!(!Classification::converging("updating", ReportLevel::Info).is_terminal());
        assert!(Classification::succeeded("done").is_terminal());
        assert!(Classification::failed("boom").is_terminal());
    }

    #[test]
    fn test_budget_rejects_zero_durations() {
        let err = TimeoutBudget::new(Duration::ZERO, Duration::from_secs(20)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NonPositiveDuration { field: "timeout" }
        ));

        let err = TimeoutBudget::new(Duration::from_secs(60), Duration::ZERO).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NonPositiveDuration { field: "tick" }
        ));
    }

    #[test]
    fn test_budget_smaller_than_tick_is_allowed() {
        let budget =
            TimeoutBudget::new(Duration::from_secs(5), Duration::from_secs(20)).unwrap();
        assert!(budget.total < budget.tick);
    }
}
