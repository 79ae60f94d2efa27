//! Check execution framework
//!
//! Checks implement a two-phase contract: [`Check::can_apply`] decides
//! whether a check is relevant to the upgrade being evaluated, and
//! [`Check::validate`] reads live cluster state and returns a
//! [`DiagnosticResult`](kompat_core::DiagnosticResult).
//!
//! Most checks are built from one of three protocols rather than
//! implementing [`Check`] by hand:
//! - [`ComponentCheck`] - reads one component's management state off the platform singleton
//! - [`WorkloadCheck`] - lists every live instance of a kind and hands the slice to a policy
//! - [`OperatorCheck`] - looks for an OLM subscription and its installed version
//!
//! The [`Runner`] evaluates a [`CheckRegistry`] against a [`Target`] and
//! produces a [`RunReport`](kompat_core::RunReport).

pub mod error;
pub mod context;
pub mod target;
pub mod check;
pub mod registry;
pub mod protocol;
pub mod platform;
pub mod runner;
pub mod telemetry;
pub mod checks;

pub use error::CheckError;
pub use context::{CancelHandle, RunContext};
pub use target::Target;
pub use check::{annotations, gates, Check, CheckMeta, Gate};
pub use registry::CheckRegistry;
pub use protocol::component::{ComponentCheck, ComponentPolicy, ComponentRequest, ManagementState};
pub use protocol::operator::{ConditionBuilder, OperatorCheck};
pub use protocol::workload::{WorkloadCheck, WorkloadPolicy, WorkloadRequest};
pub use platform::{build_target, detect_current_version};
pub use runner::Runner;
pub use checks::default_registry;
