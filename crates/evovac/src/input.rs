//! Capability for subsystems that can be switched off while a menu or dialog
//! owns the input.
use tracing::debug;

pub trait InputEnabled {
    fn set_input_enabled(&mut self, enabled: bool);

    fn is_input_enabled(&self) -> bool;
}

/// Toggle every subsystem in `targets`.
pub fn set_input_enabled_all(targets: &mut [&mut dyn InputEnabled], enabled: bool) {
    debug!(
        "Setting input enabled = {} on {} subsystems",
        enabled,
        targets.len()
    );
    for t in targets.iter_mut() {
        t.set_input_enabled(enabled);
    }
}
