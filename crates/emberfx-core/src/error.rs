//! Configuration diagnostics.

use thiserror::Error;

use crate::types::SystemId;

/// Problem found by the advisory sub-emitter check.
///
/// The runtime never relies on these: misconfigured entries are skipped at
/// trigger time and recursion is bounded by the depth cap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    #[error("sub-emitter entry {entry} has no target")]
    NoTarget { entry: usize },

    #[error("sub-emitter entry {entry} targets its own system")]
    SelfReference { entry: usize },

    #[error("sub-emitter entry {entry} targets {target}, which no longer exists")]
    MissingTarget { entry: usize, target: SystemId },

    #[error("sub-emitter entry {entry} targets {target}, which leads back to this system")]
    Cycle { entry: usize, target: SystemId },
}
