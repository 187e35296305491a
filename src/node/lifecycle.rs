use parking_lot::Mutex;

use crate::error::MeshError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unregistered,
    Registering,
    Registered,
    Unregistering,
    /// Unregistered after shutdown. Terminal.
    Departed,
}

impl LifecycleState {
    fn can_become(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, next),
            (Unregistered, Registering)
                | (Registering, Registered)
                | (Registering, Unregistered)
                | (Registered, Unregistering)
                | (Unregistering, Departed)
        )
    }
}

/// Guarded registration state of one node.
pub struct Lifecycle {
    state: Mutex<LifecycleState>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LifecycleState::Unregistered),
        }
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    pub fn transition(&self, next: LifecycleState) -> Result<LifecycleState, MeshError> {
        let mut state = self.state.lock();
        if !state.can_become(next) {
            return Err(MeshError::Lifecycle(format!("{:?} -> {:?}", *state, next)));
        }
        let previous = *state;
        *state = next;
        tracing::debug!("Lifecycle {:?} -> {:?}", previous, next);
        Ok(previous)
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
