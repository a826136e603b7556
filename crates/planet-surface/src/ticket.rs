use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Lifecycle of one asynchronous split.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SplitState {
    /// Children exist in the tree but have not been announced.
    Pending,
    /// Children announced and the parent deactivated.
    Applied,
    /// Abandoned before it was applied; the children were never announced.
    Cancelled,
    Failed(String),
}

/// Shared between the tree node that split and the task building its children.
/// The transition out of `Pending` happens exactly once, under the lock, so the
/// worker and the main thread agree on whether the children were announced.
#[derive(Debug)]
pub struct SplitTicket {
    state: Mutex<SplitState>,
}

impl SplitTicket {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SplitState::Pending),
        })
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, SplitState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SplitState {
        self.lock().clone()
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.lock(), SplitState::Pending)
    }

    pub fn is_applied(&self) -> bool {
        matches!(*self.lock(), SplitState::Applied)
    }

    /// Cancels a pending split. Returns the state seen before the call.
    pub(crate) fn cancel(&self) -> SplitState {
        let mut state = self.lock();
        let prior = state.clone();
        if prior == SplitState::Pending {
            *state = SplitState::Cancelled;
        }
        prior
    }

    /// Marks a pending split failed. Returns false if it was no longer pending.
    pub(crate) fn fail(&self, message: String) -> bool {
        let mut state = self.lock();
        if *state == SplitState::Pending {
            *state = SplitState::Failed(message);
            true
        } else {
            false
        }
    }
}
