//! Operator-presence protocol
//!
//! Looks for an OLM subscription matching a name/channel policy and turns
//! (found, installed version) into a single condition.

use crate::check::{annotations, gates, Check, CheckMeta, Gate};
use crate::context::RunContext;
use crate::error::CheckError;
use crate::protocol::stamp_target_version;
use crate::target::Target;
use kompat_cluster::{Subscription, OLM_UNAVAILABLE_MESSAGE};
use kompat_core::{condition_types, Condition, ConditionStatus, DiagnosticResult, Reason};
use std::sync::Arc;
use tracing::debug;

/// Turns (found, installed version) into the check's condition
pub type ConditionBuilder =
    Arc<dyn Fn(bool, &str) -> Result<Condition, CheckError> + Send + Sync>;

/// `Available=True/ResourceFound` when found, `Available=False/ResourceNotFound` otherwise
pub fn presence_condition(kind: &str, found: bool, version: &str) -> Condition {
    if found {
        let message = if version.is_empty() {
            format!("{kind} operator installed")
        } else {
            format!("{kind} operator installed (version {version})")
        };
        Condition::new(
            condition_types::AVAILABLE,
            ConditionStatus::True,
            Reason::ResourceFound,
            message,
        )
    } else {
        Condition::new(
            condition_types::AVAILABLE,
            ConditionStatus::False,
            Reason::ResourceNotFound,
            format!("{kind} operator not installed"),
        )
    }
}

/// Check built on the operator-presence protocol
pub struct OperatorCheck {
    meta: CheckMeta,
    names: Vec<String>,
    channels: Vec<String>,
    condition: ConditionBuilder,
    gate: Gate,
}

impl OperatorCheck {
    /// Match subscriptions named after the check's kind, with the default condition
    pub fn new(meta: CheckMeta) -> Self {
        let kind = meta.kind.clone();
        Self {
            meta,
            names: Vec::new(),
            channels: Vec::new(),
            condition: Arc::new(move |found, version| Ok(presence_condition(&kind, found, version))),
            gate: Arc::new(gates::always),
        }
    }

    /// Match any of these subscription names instead of the kind
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Additionally require the subscription channel to be one of these
    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = channels.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the condition builder (e.g. to make presence the failure case)
    pub fn with_condition<F>(mut self, builder: F) -> Self
    where
        F: Fn(bool, &str) -> Result<Condition, CheckError> + Send + Sync + 'static,
    {
        self.condition = Arc::new(builder);
        self
    }

    /// Only apply when `gate` holds for the target
    pub fn applies_when<G>(mut self, gate: G) -> Self
    where
        G: Fn(&Target) -> bool + Send + Sync + 'static,
    {
        self.gate = Arc::new(gate);
        self
    }

    fn matches(&self, subscription: &Subscription) -> bool {
        let name_matches = if self.names.is_empty() {
            subscription.name == self.meta.kind
        } else {
            self.names.iter().any(|n| *n == subscription.name)
        };

        if !name_matches {
            return false;
        }
        if self.channels.is_empty() {
            return true;
        }

        // an unset channel never satisfies a channel allow-list
        !subscription.channel.is_empty() && self.channels.iter().any(|c| *c == subscription.channel)
    }

    fn build_condition(&self, found: bool, version: &str) -> Result<Condition, CheckError> {
        (self.condition)(found, version).map_err(|e| CheckError::Condition {
            kind: self.meta.kind.clone(),
            source: Box::new(e),
        })
    }
}

#[async_trait::async_trait]
impl Check for OperatorCheck {
    fn meta(&self) -> &CheckMeta {
        &self.meta
    }

    async fn can_apply(&self, _ctx: &RunContext, target: &Target) -> Result<bool, CheckError> {
        Ok((self.gate)(target))
    }

    async fn validate(
        &self,
        ctx: &RunContext,
        target: &Target,
    ) -> Result<DiagnosticResult, CheckError> {
        let mut result = self.meta.new_result();
        stamp_target_version(&mut result, target);

        let olm = target.reader().olm();
        if !olm.available() {
            debug!(check = %self.meta.id, "OLM not available");
            let mut condition = self.build_condition(false, "")?;
            condition.message = OLM_UNAVAILABLE_MESSAGE.to_string();
            result.set_condition(condition);
            return Ok(result);
        }

        let subscriptions = ctx
            .guard(olm.list_subscriptions())
            .await?
            .map_err(|e| CheckError::read("listing subscriptions", e))?;

        let matched = subscriptions.iter().find(|s| self.matches(s));
        let found = matched.is_some();
        let version = matched.map(Subscription::installed_version).unwrap_or_default();
        debug!(check = %self.meta.id, found, version = %version, "operator lookup finished");

        result.set_condition(self.build_condition(found, &version)?);
        if !version.is_empty() {
            result.set_annotation(annotations::OPERATOR_INSTALLED_VERSION, version);
        }

        Ok(result)
    }
}
