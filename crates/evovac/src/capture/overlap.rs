//! Bodies currently inside the capture tool's collection volume.
//!
//! Fed by the backend's trigger notifications. The tracker is informational:
//! it backs status queries and never starts or ends a capture on its own.
use std::collections::BTreeSet;

use crate::capture::physics::LayerMask;
use crate::spawn::CollectibleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapKind {
    Enter,
    Stay,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapEvent {
    pub kind: OverlapKind,
    pub body: CollectibleId,
    pub layer: LayerMask,
}

impl OverlapEvent {
    pub fn enter(body: CollectibleId, layer: LayerMask) -> Self {
        Self {
            kind: OverlapKind::Enter,
            body,
            layer,
        }
    }

    pub fn stay(body: CollectibleId, layer: LayerMask) -> Self {
        Self {
            kind: OverlapKind::Stay,
            body,
            layer,
        }
    }

    pub fn exit(body: CollectibleId, layer: LayerMask) -> Self {
        Self {
            kind: OverlapKind::Exit,
            body,
            layer,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OverlapTracker {
    filter: LayerMask,
    inside: BTreeSet<CollectibleId>,
}

impl Default for OverlapTracker {
    fn default() -> Self {
        Self::new(LayerMask::COLLECTIBLE)
    }
}

impl OverlapTracker {
    pub fn new(filter: LayerMask) -> Self {
        Self {
            filter,
            inside: BTreeSet::new(),
        }
    }

    /// Apply one notification. Returns `true` if the tracked set changed.
    ///
    /// A stay for an untracked body registers it; an exit for an untracked
    /// body is ignored.
    pub fn handle(&mut self, event: OverlapEvent) -> bool {
        if !event.layer.intersects(self.filter) {
            return false;
        }
        match event.kind {
            OverlapKind::Enter | OverlapKind::Stay => self.inside.insert(event.body),
            OverlapKind::Exit => self.inside.remove(&event.body),
        }
    }

    /// Drop a body that left the world.
    pub fn forget(&mut self, body: CollectibleId) {
        self.inside.remove(&body);
    }

    pub fn contains(&self, body: CollectibleId) -> bool {
        self.inside.contains(&body)
    }

    pub fn len(&self) -> usize {
        self.inside.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inside.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = CollectibleId> + '_ {
        self.inside.iter().copied()
    }

    pub fn clear(&mut self) {
        self.inside.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: CollectibleId = CollectibleId(1);

    #[test]
    fn enter_stay_exit_cycle() {
        let mut t = OverlapTracker::default();
        assert!(t.handle(OverlapEvent::enter(A, LayerMask::COLLECTIBLE)));
        assert!(!t.handle(OverlapEvent::stay(A, LayerMask::COLLECTIBLE)));
        assert!(t.contains(A));
        assert!(t.handle(OverlapEvent::exit(A, LayerMask::COLLECTIBLE)));
        assert!(!t.handle(OverlapEvent::exit(A, LayerMask::COLLECTIBLE)));
        assert!(t.is_empty());
    }

    #[test]
    fn stay_registers_missed_enter() {
        let mut t = OverlapTracker::default();
        assert!(t.handle(OverlapEvent::stay(A, LayerMask::COLLECTIBLE)));
        assert_eq!(t.iter().collect::<Vec<_>>(), vec![A]);
    }

    #[test]
    fn other_layers_are_filtered() {
        let mut t = OverlapTracker::default();
        assert!(!t.handle(OverlapEvent::enter(A, LayerMask::DEFAULT)));
        assert!(t.is_empty());
    }
}
