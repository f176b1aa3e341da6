//! Poll scheduler: the timeout/tick race that bounds a check run.
//!
//! One logical task owns both timers and the query handle. Every tick
//! fetches once, classifies every returned snapshot, and either exits on a
//! terminal classification or waits for the next timer fire. The deadline
//! preempts anything in flight, including a query mid-await; the dropped
//! future's result is discarded, never folded into returned state.

use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use dcc_common::{
    CheckError, Classification, DeployTarget, PlatformStatusQuery, ReportLevel, TimeoutBudget,
};

use crate::evaluate::EvaluationPolicy;
use crate::report::TickReport;

/// Drives one check run to a definitive outcome.
pub struct PollScheduler<Q> {
    query: Q,
    policy: EvaluationPolicy,
    budget: TimeoutBudget,
}

impl<Q: PlatformStatusQuery> PollScheduler<Q> {
    pub fn new(query: Q, policy: EvaluationPolicy, budget: TimeoutBudget) -> Self {
        Self {
            query,
            policy,
            budget,
        }
    }

    /// Poll until the deployment outcome is known.
    ///
    /// Returns the winning report on success, or the terminal error:
    /// query failure, target not found, explicit deployment failure, or
    /// timeout. Converging never terminates the loop.
    pub async fn run(&self, target: &DeployTarget) -> Result<TickReport, CheckError> {
        let mut last_report: Option<TickReport> = None;

        match time::timeout(self.budget.total, self.poll(target, &mut last_report)).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => {
                if let Some(report) = &last_report {
                    report.error("could not identify a successful deploy in time");
                }
                Err(CheckError::TimedOut {
                    waited: self.budget.total,
                })
            }
        }
    }

    /// The tick loop. Only ever exits through a terminal classification or
    /// a hard error; the enclosing deadline handles the timeout case.
    async fn poll(
        &self,
        target: &DeployTarget,
        last_report: &mut Option<TickReport>,
    ) -> Result<TickReport, CheckError> {
        // First poll happens one full tick after entry; there is no eager
        // poll on construction. A tick that outlives the interval delays
        // the next fire instead of bursting.
        let mut ticker = time::interval_at(Instant::now() + self.budget.tick, self.budget.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            debug!(application = %target.application, "ticking");

            let snapshots = self.query.fetch(target).await?;

            if snapshots.is_empty() {
                return Err(CheckError::NotFound {
                    application: target.application.clone(),
                    environment: target.environment_selector().to_string(),
                });
            }

            for snapshot in &snapshots {
                let report = TickReport::from_snapshot(&target.application, snapshot);
                match self.policy.evaluate(snapshot, &target.version_label) {
                    Classification::Succeeded { reason } => {
                        report.info(&reason);
                        return Ok(report);
                    }
                    Classification::Failed { reason } => {
                        report.error(&reason);
                        return Err(CheckError::DeploymentFailed {
                            version_label: target.version_label.clone(),
                            reason,
                        });
                    }
                    Classification::Converging { reason, level } => {
                        match level {
                            ReportLevel::Info => report.info(&reason),
                            ReportLevel::Warn => report.warn(&reason),
                        }
                        *last_report = Some(report);
                    }
                }
            }
        }
    }
}
