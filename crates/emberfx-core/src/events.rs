//! Events emitted by a system for renderer and UI feedback.

use serde::{Deserialize, Serialize};

use crate::enums::{SessionEndReason, SubEmitterKind};
use crate::types::SystemId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ParticleEvent {
    /// A sprite-stamped particle died; the renderer may release the slot.
    SpriteDetached { slot: u32, sprite_slot: i32 },
    /// Every particle of the system was removed at once.
    ParticlesCleared,
    /// A parent system installed a sub-emitter session here.
    SessionInstalled {
        session_id: u32,
        kind: SubEmitterKind,
        parent: SystemId,
    },
    /// A hosted sub-emitter session was removed.
    SessionEnded {
        session_id: u32,
        reason: SessionEndReason,
    },
    /// The particle store was reallocated.
    StoreRebuilt { capacity: usize },
}
