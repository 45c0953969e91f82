//! Ready-made callback that logs every snapshot through `tracing`.
use crate::eventbus::StateCallback;
use crate::snapshot::MotionState;
use std::sync::Arc;
use tracing::info;

/// Logs each snapshot as one formatted line, tagged with `label`.
pub struct StateLogger {
    label: String,
}

impl StateLogger {
    pub fn new(label: impl Into<String>) -> Self {
        StateLogger {
            label: label.into(),
        }
    }

    pub fn into_callback(self) -> StateCallback {
        let label = self.label;
        Arc::new(move |state: &MotionState| {
            info!(target: "spacemouse::state", device = %label, buttons = state.buttons.mask(), "{state}");
        })
    }
}
