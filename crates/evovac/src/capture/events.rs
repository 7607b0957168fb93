//! Events emitted by target acquisition and capture sessions.
use std::fmt;
use std::sync::Arc;

use crate::capture::session::CapturePhase;
use crate::spawn::{Archetype, CollectibleId};

/// Why the resource pool refused an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Capacity,
    Weight,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Capacity => f.write_str("storage full"),
            RejectReason::Weight => f.write_str("too heavy"),
        }
    }
}

/// Why a capture session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEndReason {
    /// The engage input was released.
    Released,
    /// Energy reached zero.
    Depleted,
    /// The item was admitted and absorbed.
    Collected,
    /// The pool refused the item.
    Rejected,
    /// The item (or its physics body) disappeared.
    TargetLost,
    /// Input was disabled while engaged.
    InputDisabled,
    /// The world was cleared or regenerated.
    Cleared,
}

#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    /// The acquisition candidate changed. Fires once per change.
    TargetChanged { target: Option<CollectibleId> },

    SessionStarted { target: CollectibleId },

    PhaseChanged {
        target: CollectibleId,
        from: CapturePhase,
        to: CapturePhase,
    },

    /// The item was admitted and removed from the world.
    ItemCollected {
        target: CollectibleId,
        archetype: Arc<Archetype>,
    },

    /// The pool refused the item; it was released back into the world.
    ItemRejected {
        target: CollectibleId,
        archetype: Arc<Archetype>,
        reason: RejectReason,
    },

    SessionEnded {
        target: CollectibleId,
        reason: SessionEndReason,
    },

    /// Energy crossed to zero.
    EnergyDepleted,
}
