//! Status query contract between the poll scheduler and the platform.
//!
//! The scheduler never talks to the management API directly; it is generic
//! over this trait so tests can wire in the deterministic mock and the
//! binary can wire in the HTTP client.

use crate::errors::QueryError;
use crate::types::{DeployTarget, PollSnapshot};

/// One-shot status fetch for a deploy target.
///
/// Implementations return every snapshot the platform currently reports
/// for the target: one per environment in environment-status mode, exactly
/// one version description in application-version mode. An empty list is a
/// valid, successful response — it means the target matched nothing, and
/// the caller decides what that means. Errors are reserved for transport,
/// authorization, and decoding failures.
#[allow(async_fn_in_trait)]
pub trait PlatformStatusQuery {
    async fn fetch(&self, target: &DeployTarget) -> Result<Vec<PollSnapshot>, QueryError>;
}
