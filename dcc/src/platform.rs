//! HTTP client for the platform management API.
//!
//! Implements the status-query contract over the region-scoped management
//! endpoint. Transport, authorization, and decode failures surface as
//! [`QueryError`]; an empty environment list is a successful response and
//! is returned as such — the scheduler decides what emptiness means.

use clap::ValueEnum;
use serde::Deserialize;

use dcc_common::{
    ApplicationVersionSnapshot, DeployTarget, EnvironmentSnapshot, PlatformStatusQuery,
    PollSnapshot, QueryError,
};

/// Request header carrying the static access key.
const ACCESS_KEY_HEADER: &str = "x-platform-access-key";
/// Request header carrying the static secret key.
const SECRET_KEY_HEADER: &str = "x-platform-secret-key";
/// Ambient credential pair set by pipeline runners.
const AMBIENT_ACCESS_KEY_VAR: &str = "PLATFORM_ACCESS_KEY";
const AMBIENT_SECRET_KEY_VAR: &str = "PLATFORM_SECRET_KEY";

/// Which management query a check run polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum QueryMode {
    /// Describe the target's environments (name, label, lifecycle, health).
    #[default]
    Environment,
    /// Describe the uploaded application version (processing status).
    Version,
}

impl std::fmt::Display for QueryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Environment => write!(f, "environment"),
            Self::Version => write!(f, "version"),
        }
    }
}

/// Credentials for the management API.
///
/// A static key pair is used when supplied; otherwise the ambient
/// platform-assigned pair from the runner's environment, if present.
/// Without either, requests go out unauthenticated for installs that
/// authorize by network identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Static {
        access_key: String,
        secret_key: String,
    },
    Ambient,
}

impl Credentials {
    /// Pick static credentials if supplied, falling back to the ambient
    /// environment pair.
    pub fn resolve(access_key: Option<String>, secret_key: Option<String>) -> Self {
        let ambient = std::env::var(AMBIENT_ACCESS_KEY_VAR)
            .ok()
            .zip(std::env::var(AMBIENT_SECRET_KEY_VAR).ok());
        Self::from_parts(access_key, secret_key, ambient)
    }

    fn from_parts(
        access_key: Option<String>,
        secret_key: Option<String>,
        ambient: Option<(String, String)>,
    ) -> Self {
        match (access_key, secret_key) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => Self::Static {
                access_key: key,
                secret_key: secret,
            },
            _ => match ambient {
                Some((key, secret)) if !key.is_empty() && !secret.is_empty() => Self::Static {
                    access_key: key,
                    secret_key: secret,
                },
                _ => Self::Ambient,
            },
        }
    }

    fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::Static {
                access_key,
                secret_key,
            } => request
                .header(ACCESS_KEY_HEADER, access_key)
                .header(SECRET_KEY_HEADER, secret_key),
            Self::Ambient => request,
        }
    }
}

/// Management API client; one instance serves a whole check run.
pub struct PlatformClient {
    http: reqwest::Client,
    endpoint: String,
    mode: QueryMode,
    credentials: Credentials,
}

#[derive(Debug, Deserialize)]
struct EnvironmentsResponse {
    environments: Vec<EnvironmentSnapshot>,
}

impl PlatformClient {
    pub fn new(endpoint: impl Into<String>, mode: QueryMode, credentials: Credentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            mode,
            credentials,
        }
    }

    /// Region-scoped default management host.
    pub fn default_endpoint(region: &str) -> String {
        format!("https://deploy.{region}.platform.internal")
    }

    fn environments_url(&self, target: &DeployTarget) -> String {
        format!(
            "{}/applications/{}/environments",
            self.endpoint,
            urlencoding::encode(&target.application)
        )
    }

    fn version_url(&self, target: &DeployTarget) -> String {
        format!(
            "{}/applications/{}/versions/{}",
            self.endpoint,
            urlencoding::encode(&target.application),
            urlencoding::encode(&target.version_label)
        )
    }

    async fn get_body(&self, url: &str, query: &[(&str, &str)]) -> Result<String, QueryError> {
        let request = self.credentials.apply(self.http.get(url).query(query));
        let response = request.send().await.map_err(|err| QueryError::Transport {
            message: err.to_string(),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| QueryError::Transport {
            message: err.to_string(),
        })?;

        if !status.is_success() {
            return Err(QueryError::Api {
                status: status.as_u16(),
                message: truncate_body(&body),
            });
        }
        Ok(body)
    }
}

impl PlatformStatusQuery for PlatformClient {
    async fn fetch(&self, target: &DeployTarget) -> Result<Vec<PollSnapshot>, QueryError> {
        match self.mode {
            QueryMode::Environment => {
                let url = self.environments_url(target);
                let query: Vec<(&str, &str)> = match &target.environment {
                    Some(env) => vec![("environment", env.as_str())],
                    None => Vec::new(),
                };
                let body = self.get_body(&url, &query).await?;
                let parsed: EnvironmentsResponse =
                    serde_json::from_str(&body).map_err(|err| QueryError::Decode {
                        message: err.to_string(),
                    })?;
                Ok(parsed
                    .environments
                    .into_iter()
                    .map(PollSnapshot::Environment)
                    .collect())
            }
            QueryMode::Version => {
                let url = self.version_url(target);
                let body = self.get_body(&url, &[]).await?;
                let parsed: ApplicationVersionSnapshot =
                    serde_json::from_str(&body).map_err(|err| QueryError::Decode {
                        message: err.to_string(),
                    })?;
                Ok(vec![PollSnapshot::ApplicationVersion(parsed)])
            }
        }
    }
}

/// Keep API error bodies readable in a single log line.
fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    let trimmed = body.trim();
    if trimmed.len() <= MAX {
        return trimmed.to_string();
    }
    let mut cut = MAX;
    while !trimmed.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &trimmed[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcc_common::{HealthStatus, LifecycleStatus, ProcessingStatus};

    fn target(environment: Option<&str>) -> DeployTarget {
        DeployTarget::new(
            "orders-api",
            environment.map(str::to_string),
            "v42",
            "us-east-1",
        )
        .unwrap()
    }

    #[test]
    fn test_default_endpoint_is_region_scoped() {
        assert_eq!(
            PlatformClient::default_endpoint("eu-west-1"),
            "https://deploy.eu-west-1.platform.internal"
        );
    }

    #[test]
    fn test_urls_encode_path_segments_and_strip_trailing_slash() {
        let client = PlatformClient::new(
            "https://deploy.example.test/",
            QueryMode::Environment,
            Credentials::Ambient,
        );
        let target = DeployTarget::new("orders api", None, "v42 rc1", "us-east-1").unwrap();
        assert_eq!(
            client.environments_url(&target),
            "https://deploy.example.test/applications/orders%20api/environments"
        );
        assert_eq!(
            client.version_url(&target),
            "https://deploy.example.test/applications/orders%20api/versions/v42%20rc1"
        );
    }

    #[test]
    fn test_static_credentials_win_over_ambient() {
        let credentials = Credentials::from_parts(
            Some("AK".to_string()),
            Some("SK".to_string()),
            Some(("ambient-ak".to_string(), "ambient-sk".to_string())),
        );
        assert_eq!(
            credentials,
            Credentials::Static {
                access_key: "AK".to_string(),
                secret_key: "SK".to_string(),
            }
        );
    }

    #[test]
    fn test_ambient_pair_used_when_flags_absent() {
        let credentials = Credentials::from_parts(
            None,
            None,
            Some(("ambient-ak".to_string(), "ambient-sk".to_string())),
        );
        assert_eq!(
            credentials,
            Credentials::Static {
                access_key: "ambient-ak".to_string(),
                secret_key: "ambient-sk".to_string(),
            }
        );
    }

    #[test]
    fn test_half_supplied_pair_is_not_static() {
        let credentials = Credentials::from_parts(Some("AK".to_string()), None, None);
        assert_eq!(credentials, Credentials::Ambient);

        let credentials =
            Credentials::from_parts(Some(String::new()), Some("SK".to_string()), None);
        assert_eq!(credentials, Credentials::Ambient);
    }

    #[test]
    fn test_environments_response_decodes() {
        let body = r#"{
            "environments": [
                {"name": "prod", "version_label": "v42", "status": "Ready", "health": "Green"},
                {"name": "canary", "version_label": "v41", "status": "Updating", "health": "Grey"}
            ]
        }"#;
        let parsed: EnvironmentsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.environments.len(), 2);
        assert_eq!(parsed.environments[0].status, LifecycleStatus::Ready);
        assert_eq!(parsed.environments[1].health, HealthStatus::Grey);
    }

    #[test]
    fn test_version_response_decodes() {
        let body = r#"{"version_label": "v42", "status": "processing"}"#;
        let parsed: ApplicationVersionSnapshot = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.status, ProcessingStatus::Processing);
    }

    #[test]
    fn test_error_bodies_are_truncated() {
        let long = "x".repeat(500);
        let message = truncate_body(&long);
        assert_eq!(message.len(), 203);
        assert!(message.ends_with("..."));

        assert_eq!(truncate_body("  access denied  "), "access denied");
    }

    #[test]
    fn test_target_env_selector_drives_query_shape() {
        // The query parameter list mirrors the selector: present for one
        // environment, absent for all.
        assert_eq!(target(Some("prod")).environment_selector(), "prod");
        assert_eq!(target(None).environment_selector(), "");
    }
}
