//! Sub-emitter triggering and the advisory cycle check.
//!
//! A parent system never touches a child directly. Triggers produce
//! [`SessionInstall`] messages that the engine delivers to the target, and a
//! child reads its parents only through [`ParentLookup`].

use std::collections::HashMap;

use glam::Vec2;

use emberfx_core::constants::MAX_CYCLE_CHECK_DEPTH;
use emberfx_core::enums::{InheritFlags, SubEmitterKind};
use emberfx_core::error::ConfigIssue;
use emberfx_core::modules::SubEmitterModule;
use emberfx_core::types::SystemId;

use crate::session::{Inherited, ParentRef};
use crate::store::Particle;

/// Request for `target` to host a new emission session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInstall {
    pub target: SystemId,
    pub kind: SubEmitterKind,
    pub parent: ParentRef,
    pub flags: InheritFlags,
    /// Parent position when the trigger fired.
    pub position: Vec2,
    pub inherited: Inherited,
}

/// Read-only view of parent particles, polled by Birth sessions each tick.
pub trait ParentLookup {
    /// Position of the referenced particle, or `None` if it is gone.
    fn parent_position(&self, parent: &ParentRef) -> Option<Vec2>;
}

/// Lookup for a system running on its own. Every parent reads as gone.
pub struct NoParents;

impl ParentLookup for NoParents {
    fn parent_position(&self, _parent: &ParentRef) -> Option<Vec2> {
        None
    }
}

/// Positions probed ahead of an advance, keyed by the reference that was valid.
impl ParentLookup for HashMap<ParentRef, Vec2> {
    fn parent_position(&self, parent: &ParentRef) -> Option<Vec2> {
        self.get(parent).copied()
    }
}

/// The triggering system's side of a sub-emitter event.
pub struct TriggerSource<'a> {
    pub system: SystemId,
    pub module: &'a SubEmitterModule,
    /// Current sub-emitter depth of the triggering system.
    pub depth: u8,
    /// Configured start size at the system's current normalized time.
    pub base_size: f32,
}

/// Queue an install for every entry of `kind` fired by `particle` at `slot`.
///
/// Nothing fires from a system at sub-emitter depth, from a disabled module,
/// or for entries without a target or targeting the source itself.
pub fn trigger(
    kind: SubEmitterKind,
    source: &TriggerSource<'_>,
    slot: usize,
    particle: &Particle,
    outbox: &mut Vec<SessionInstall>,
) {
    if !source.module.enabled || source.depth != 0 {
        return;
    }

    let ratio = if source.base_size > 0.0 {
        particle.size / source.base_size
    } else {
        1.0
    };

    for entry in source.module.entries.iter().filter(|e| e.kind == kind) {
        let Some(target) = entry.target else {
            continue;
        };
        if target == source.system {
            continue;
        }

        outbox.push(SessionInstall {
            target,
            kind,
            parent: ParentRef {
                system: source.system,
                slot,
                id: particle.id,
            },
            flags: entry.inherit,
            position: particle.position,
            inherited: Inherited {
                velocity: particle.velocity * entry.velocity_multiplier,
                color: particle.color,
                size_ratio: ratio * entry.size_multiplier,
                rotation: particle.rotation,
            },
        });
    }
}

/// Check the sub-emitter entries of `source` for configuration problems.
///
/// `lookup` resolves a system's sub-emitter module, `None` meaning the system
/// does not exist. Cycles are searched up to `MAX_CYCLE_CHECK_DEPTH` hops.
pub fn diagnose<'a, F>(source: SystemId, module: &SubEmitterModule, lookup: F) -> Vec<ConfigIssue>
where
    F: Fn(SystemId) -> Option<&'a SubEmitterModule>,
{
    let mut issues = Vec::new();
    for (entry_index, entry) in module.entries.iter().enumerate() {
        let Some(target) = entry.target else {
            issues.push(ConfigIssue::NoTarget { entry: entry_index });
            continue;
        };
        if target == source {
            issues.push(ConfigIssue::SelfReference { entry: entry_index });
            continue;
        }
        if lookup(target).is_none() {
            issues.push(ConfigIssue::MissingTarget {
                entry: entry_index,
                target,
            });
            continue;
        }
        if leads_back(source, target, &lookup, 0) {
            issues.push(ConfigIssue::Cycle {
                entry: entry_index,
                target,
            });
        }
    }
    issues
}

fn leads_back<'a, F>(source: SystemId, target: SystemId, lookup: &F, depth: usize) -> bool
where
    F: Fn(SystemId) -> Option<&'a SubEmitterModule>,
{
    if depth > MAX_CYCLE_CHECK_DEPTH {
        return false;
    }
    let Some(module) = lookup(target) else {
        return false;
    };
    if !module.enabled {
        return false;
    }

    module.entries.iter().filter_map(|e| e.target).any(|next| {
        next == source || leads_back(source, next, lookup, depth + 1)
    })
}
