//! Per-frame selection of the best capturable item in front of the nozzle.
use tracing::debug;

use crate::capture::config::CaptureConfig;
use crate::capture::events::CaptureEvent;
use crate::capture::physics::{Nozzle, RaycastQuery};
use crate::events::EventSink;
use crate::spawn::{CollectibleId, CollectibleStore};

/// Tracks the current candidate and keeps exactly that item highlighted.
#[derive(Debug, Clone, Default)]
pub struct TargetAcquisition {
    current: Option<CollectibleId>,
}

impl TargetAcquisition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<CollectibleId> {
        self.current
    }

    /// Run one detection pass.
    ///
    /// The forward ray wins; if it hits nothing and a cone is configured, the
    /// live item on a capturable layer with the smallest angular offset inside
    /// the detection range is used instead (ties go to the nearer item). Emits
    /// [`CaptureEvent::TargetChanged`] only when the candidate changes.
    pub fn update(
        &mut self,
        nozzle: &Nozzle,
        config: &CaptureConfig,
        query: &dyn RaycastQuery,
        store: &mut CollectibleStore,
        sink: &mut dyn EventSink<CaptureEvent>,
    ) -> Option<CollectibleId> {
        let candidate = query
            .raycast(
                nozzle.position,
                nozzle.forward,
                config.detection_range,
                config.capturable_layers,
            )
            .map(|hit| hit.body)
            .filter(|id| store.contains(*id))
            .or_else(|| cone_candidate(nozzle, config, &*store));

        if candidate != self.current {
            debug!(
                "Target changed: {:?} -> {:?}",
                self.current.map(|id| id.0),
                candidate.map(|id| id.0)
            );
            let stale: Vec<CollectibleId> =
                store.highlighted().filter(|id| Some(*id) != candidate).collect();
            for id in stale {
                if let Some(c) = store.get_mut(id) {
                    c.highlighted = false;
                }
            }
            self.current = candidate;
            sink.send(CaptureEvent::TargetChanged { target: candidate });
        }

        if let Some(c) = candidate.and_then(|id| store.get_mut(id)) {
            c.highlighted = true;
        }
        candidate
    }
}

fn cone_candidate(
    nozzle: &Nozzle,
    config: &CaptureConfig,
    store: &CollectibleStore,
) -> Option<CollectibleId> {
    if config.cone_half_angle <= 0.0 {
        return None;
    }
    let forward = nozzle.forward.try_normalize()?;
    store
        .iter()
        .filter(|c| c.archetype.layer.intersects(config.capturable_layers))
        .filter_map(|c| {
            let offset = c.position - nozzle.position;
            let distance = offset.length();
            if distance > config.detection_range {
                return None;
            }
            let angle = match offset.try_normalize() {
                Some(dir) => forward.dot(dir).clamp(-1.0, 1.0).acos(),
                None => 0.0,
            };
            (angle <= config.cone_half_angle).then_some((c.id, angle, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.2.total_cmp(&b.2)))
        .map(|(id, _, _)| id)
}
