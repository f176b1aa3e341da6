//! Convergence evaluation policies.
//!
//! Pure classification of one polled snapshot against the expected version
//! label. No I/O, no side effects; the scheduler owns all of those.

use clap::ValueEnum;
use dcc_common::{
    ApplicationVersionSnapshot, Classification, EnvironmentSnapshot, HealthStatus, LifecycleStatus,
    PollSnapshot, ProcessingStatus, ReportLevel,
};

/// How an observed version label is compared against the expected one.
///
/// `Exact` is the default. `Prefix` accepts an observed label that is a
/// prefix of the expected label; it exists for installs whose platform
/// truncates labels, and it can false-positive when one real label
/// prefixes another, which is why it is opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LabelMatch {
    #[default]
    Exact,
    Prefix,
}

impl LabelMatch {
    /// Whether the observed label counts as the expected one.
    pub fn matches(self, observed: &str, expected: &str) -> bool {
        match self {
            Self::Exact => observed == expected,
            Self::Prefix => expected.starts_with(observed),
        }
    }
}

impl std::fmt::Display for LabelMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Prefix => write!(f, "prefix"),
        }
    }
}

/// Evaluation policy for one check run.
///
/// The two historical checker variants (environment-status polling and
/// application-version polling) are one capability with two policies; the
/// scheduler is parameterized by this tagged variant rather than
/// duplicated per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationPolicy {
    /// Classify environment descriptions: label, then lifecycle, then
    /// health, first miss wins.
    Environment { label_match: LabelMatch },
    /// Classify application-version processing status.
    Version,
}

impl EvaluationPolicy {
    /// Classify one snapshot against the expected version label.
    pub fn evaluate(&self, snapshot: &PollSnapshot, expected_label: &str) -> Classification {
        match snapshot {
            PollSnapshot::Environment(env) => {
                let label_match = match self {
                    Self::Environment { label_match } => *label_match,
                    Self::Version => LabelMatch::Exact,
                };
                evaluate_environment(env, expected_label, label_match)
            }
            PollSnapshot::ApplicationVersion(version) => evaluate_version(version),
        }
    }
}

/// Environment rules, applied in fixed order; the first miss classifies.
fn evaluate_environment(
    snapshot: &EnvironmentSnapshot,
    expected_label: &str,
    label_match: LabelMatch,
) -> Classification {
    if !label_match.matches(&snapshot.version_label, expected_label) {
        return Classification::converging("environment is updating", ReportLevel::Info);
    }

    if snapshot.status != LifecycleStatus::Ready {
        return Classification::converging("environment is not ready", ReportLevel::Warn);
    }

    if snapshot.health != HealthStatus::Green {
        return Classification::converging("environment health is not ok", ReportLevel::Warn);
    }

    Classification::succeeded("environment deployment was successful")
}

/// Application-version rules: processed wins, failed is terminal,
/// everything else is still converging.
fn evaluate_version(snapshot: &ApplicationVersionSnapshot) -> Classification {
    match snapshot.status {
        ProcessingStatus::Processed => Classification::succeeded("version was processed"),
        ProcessingStatus::Failed => Classification::failed("version processing failed"),
        ProcessingStatus::Processing | ProcessingStatus::Building | ProcessingStatus::Unknown => {
            Classification::converging(
                format!("version is still {}", snapshot.status),
                ReportLevel::Info,
            )
        }
    }
}
