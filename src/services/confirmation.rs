//! Confirmation step in front of destructive row actions.

use parking_lot::Mutex;

use crate::domain::entity::Entity;
use crate::domain::types::EntityId;

/// Row a destructive action is aimed at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmationTarget {
    pub id: EntityId,
    pub label: String,
}

impl ConfirmationTarget {
    pub fn new(id: EntityId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }

    pub fn from_entity<E: Entity>(entity: &E) -> Self {
        Self::new(entity.id(), entity.label())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum GateState {
    #[default]
    Idle,
    Confirming(ConfirmationTarget),
    Mutating(ConfirmationTarget),
}

/// `Idle -> Confirming -> {Idle, Mutating -> Idle}`.
///
/// While mutating, the target id is the pending action marker: only that
/// row renders busy.
#[derive(Default)]
pub struct ConfirmationGate {
    state: Mutex<GateState>,
}

impl ConfirmationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GateState {
        self.state.lock().clone()
    }

    /// Opens the prompt for `target`. Has no side effects beyond the prompt;
    /// refused while another action is still mutating.
    pub fn request_confirmation(&self, target: ConfirmationTarget) -> bool {
        let mut state = self.state.lock();
        if matches!(*state, GateState::Mutating(_)) {
            log::warn!("Ignoring confirmation request for {} while busy", target.id);
            return false;
        }
        *state = GateState::Confirming(target);
        true
    }

    /// Target awaiting the user's answer, if any.
    pub fn pending_confirmation(&self) -> Option<ConfirmationTarget> {
        match &*self.state.lock() {
            GateState::Confirming(target) => Some(target.clone()),
            _ => None,
        }
    }

    pub fn cancel(&self) {
        let mut state = self.state.lock();
        if matches!(*state, GateState::Confirming(_)) {
            *state = GateState::Idle;
        }
    }

    /// Moves the confirmed target into `Mutating` and returns a guard that
    /// clears the marker when dropped, whatever the mutation's outcome.
    pub fn begin(&self) -> Option<PendingAction<'_>> {
        let mut state = self.state.lock();
        let GateState::Confirming(target) = std::mem::take(&mut *state) else {
            return None;
        };
        *state = GateState::Mutating(target.clone());
        Some(PendingAction { gate: self, target })
    }

    /// Id of the row currently undergoing a mutating action.
    pub fn pending_action(&self) -> Option<EntityId> {
        match &*self.state.lock() {
            GateState::Mutating(target) => Some(target.id),
            _ => None,
        }
    }

    pub fn is_busy(&self, id: EntityId) -> bool {
        self.pending_action() == Some(id)
    }

    fn settle(&self) {
        let mut state = self.state.lock();
        if matches!(*state, GateState::Mutating(_)) {
            *state = GateState::Idle;
        }
    }
}

/// Holds the pending action marker for the duration of one mutation.
pub struct PendingAction<'a> {
    gate: &'a ConfirmationGate,
    target: ConfirmationTarget,
}

impl PendingAction<'_> {
    pub fn target(&self) -> &ConfirmationTarget {
        &self.target
    }
}

impl Drop for PendingAction<'_> {
    fn drop(&mut self) {
        self.gate.settle();
    }
}
