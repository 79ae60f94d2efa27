//! Check registry
//!
//! Built once at startup by explicitly registering checks in order, then
//! shared read-only (behind an `Arc`) for the rest of the run.

use crate::check::Check;
use crate::error::CheckError;
use kompat_core::CheckGroup;
use std::collections::HashSet;
use std::sync::Arc;

/// Ordered, append-only set of checks
#[derive(Default)]
pub struct CheckRegistry {
    checks: Vec<Arc<dyn Check>>,
    ids: HashSet<String>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a check. Duplicate IDs are rejected.
    pub fn register<C>(&mut self, check: C) -> Result<(), CheckError>
    where
        C: Check + 'static,
    {
        self.register_arc(Arc::new(check))
    }

    /// Register an already shared check
    pub fn register_arc(&mut self, check: Arc<dyn Check>) -> Result<(), CheckError> {
        let id = check.id().to_string();
        if !self.ids.insert(id.clone()) {
            return Err(CheckError::DuplicateCheck(id));
        }

        tracing::debug!(check = %id, "registered check");
        self.checks.push(check);
        Ok(())
    }

    /// All checks in registration order
    pub fn all(&self) -> &[Arc<dyn Check>] {
        &self.checks
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Check>> {
        self.checks.iter().find(|c| c.id() == id)
    }

    /// Checks of one group, in registration order
    pub fn by_group(&self, group: CheckGroup) -> impl Iterator<Item = &Arc<dyn Check>> {
        self.checks.iter().filter(move |c| c.group() == group)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl std::fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckRegistry")
            .field("checks", &self.ids())
            .finish()
    }
}
