//! Workload-collection protocol
//!
//! Lists every live instance of a kind, filters them, hands the slice to a
//! policy and, unless the policy set its own, records one impacted object
//! per remaining item. Works with both full objects ([`Unstructured`]) and
//! metadata-only projections ([`PartialObjectMetadata`]).
//!
//! [`Unstructured`]: kompat_cluster::Unstructured
//! [`PartialObjectMetadata`]: kompat_cluster::PartialObjectMetadata

use crate::check::{annotations, gates, Check, CheckMeta, Gate};
use crate::context::RunContext;
use crate::error::CheckError;
use crate::protocol::stamp_target_version;
use crate::target::Target;
use kompat_cluster::{list_or_empty, KubeObject, Listable, ListOptions, ResourceReader, ResourceType};
use kompat_core::DiagnosticResult;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Everything a workload policy gets to see
pub struct WorkloadRequest<'a, T> {
    /// Result being built; pre-stamped with metadata and the item count
    pub result: DiagnosticResult,

    /// Items that passed the filter
    pub items: Vec<T>,

    /// Kind that was listed
    pub resource: &'a ResourceType,

    pub target: &'a Target,

    pub ctx: &'a RunContext,
}

impl<T> WorkloadRequest<'_, T> {
    pub fn reader(&self) -> &dyn ResourceReader {
        self.target.reader()
    }
}

/// Policy callbacks for [`WorkloadCheck`]
#[async_trait::async_trait]
pub trait WorkloadPolicy<T: Listable>: Send + Sync {
    /// Keep an item. The default keeps everything.
    ///
    /// Errors abort the check; a failing filter is a bug, not a finding.
    fn filter(&self, _item: &T) -> Result<bool, CheckError> {
        Ok(true)
    }

    async fn evaluate(&self, req: &mut WorkloadRequest<'_, T>) -> Result<(), CheckError>;
}

/// Check built on the workload-collection protocol
pub struct WorkloadCheck<T, P> {
    meta: CheckMeta,
    resource: ResourceType,
    list_options: ListOptions,
    gate: Gate,
    policy: P,
    _shape: PhantomData<fn() -> T>,
}

impl<T, P> WorkloadCheck<T, P>
where
    T: Listable,
    P: WorkloadPolicy<T>,
{
    pub fn new(meta: CheckMeta, resource: ResourceType, policy: P) -> Self {
        Self {
            meta,
            resource,
            list_options: ListOptions::default(),
            gate: Arc::new(gates::always),
            policy,
            _shape: PhantomData,
        }
    }

    /// Restrict the listing (namespace, label selector)
    pub fn with_list_options(mut self, opts: ListOptions) -> Self {
        self.list_options = opts;
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

    fn filter_items(&self, items: Vec<T>) -> Result<Vec<T>, CheckError> {
        let mut kept = Vec::with_capacity(items.len());
        for item in items {
            let keep = self.policy.filter(&item).map_err(|e| CheckError::Filter {
                resource: self.resource.to_string(),
                source: Box::new(e),
            })?;
            if keep {
                kept.push(item);
            }
        }
        Ok(kept)
    }
}

#[async_trait::async_trait]
impl<T, P> Check for WorkloadCheck<T, P>
where
    T: Listable,
    P: WorkloadPolicy<T>,
{
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

        let listed: Vec<T> = ctx
            .guard(list_or_empty::<T>(target.reader(), &self.resource, &self.list_options))
            .await?
            .map_err(|e| CheckError::read(format!("listing {}", self.resource), e))?;

        let listed_count = listed.len();
        let items = self.filter_items(listed)?;
        debug!(
            check = %self.meta.id,
            resource = %self.resource,
            listed = listed_count,
            kept = items.len(),
            "evaluating workload policy"
        );

        result.set_annotation(annotations::WORKLOAD_COUNT, items.len().to_string());

        let mut req = WorkloadRequest {
            result,
            items,
            resource: &self.resource,
            target,
            ctx,
        };
        self.policy.evaluate(&mut req).await?;

        let WorkloadRequest {
            mut result, items, ..
        } = req;

        if !result.has_impacted_objects_set() && !items.is_empty() {
            result.set_impacted_objects(
                &self.resource.type_meta(),
                items.iter().map(KubeObject::object_ref),
            );
        }

        Ok(result)
    }
}
