//! Runs a registry of checks against one target
//!
//! Checks are evaluated concurrently up to the configured limit; outcomes
//! come back in registration order regardless of completion order.

use crate::check::Check;
use crate::context::RunContext;
use crate::error::CheckError;
use crate::registry::CheckRegistry;
use crate::target::Target;
use futures::stream::{self, StreamExt};
use kompat_core::{CheckOutcome, Config, RunReport};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Evaluates every registered check and collects a [`RunReport`]
#[derive(Debug, Clone)]
pub struct Runner {
    registry: Arc<CheckRegistry>,
    config: Config,
}

impl Runner {
    pub fn new(registry: CheckRegistry, config: Config) -> Self {
        Self::from_shared(Arc::new(registry), config)
    }

    /// Runner over a registry shared with other runners
    pub fn from_shared(registry: Arc<CheckRegistry>, config: Config) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Evaluate all checks against `target`
    ///
    /// A configured target version takes precedence over the one on `target`.
    pub async fn run(&self, ctx: &RunContext, target: &Target) -> RunReport {
        let mut target = target.clone();
        if let Some(version) = &self.config.target_version {
            target.target_version = Some(version.clone());
        }

        info!(
            checks = self.registry.len(),
            concurrency = self.config.concurrency,
            target = %target.target_version_label(),
            "starting check run"
        );

        let target = &target;
        let outcomes: Vec<CheckOutcome> = stream::iter(self.registry.all())
            .map(|check| self.evaluate(ctx, target, check.as_ref()))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let report = RunReport::from_outcomes(outcomes).with_versions(
            target.current_version.as_ref(),
            target.target_version.as_ref(),
        );

        info!(
            total = report.summary.total,
            passed = report.summary.passed,
            failed = report.summary.failed,
            blocking = report.summary.blocking,
            skipped = report.summary.skipped,
            errored = report.summary.errored,
            "check run finished"
        );
        report
    }

    async fn evaluate(&self, ctx: &RunContext, target: &Target, check: &dyn Check) -> CheckOutcome {
        let id = check.id();

        if self.config.checks.is_skipped(id) {
            debug!(check = %id, "skipped by configuration");
            return CheckOutcome::skipped(id, "skipped by configuration");
        }

        match self.apply(ctx, target, check).await {
            Ok(Some(mut result)) => {
                if let Some(impact) = self.config.impact.get(id) {
                    for condition in &mut result.conditions {
                        condition.impact = impact;
                    }
                }
                CheckOutcome::completed(id, result)
            }
            Ok(None) => {
                debug!(check = %id, "not applicable");
                CheckOutcome::skipped(id, "not applicable")
            }
            Err(e) => {
                warn!(check = %id, error = %e, "check could not be evaluated");
                CheckOutcome::errored(id, e.to_string())
            }
        }
    }

    async fn apply(
        &self,
        ctx: &RunContext,
        target: &Target,
        check: &dyn Check,
    ) -> Result<Option<kompat_core::DiagnosticResult>, CheckError> {
        if ctx.is_cancelled() {
            return Err(CheckError::Cancelled);
        }
        if !check.can_apply(ctx, target).await? {
            return Ok(None);
        }
        check.validate(ctx, target).await.map(Some)
    }
}
