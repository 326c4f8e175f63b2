//! Create, update and delete calls with modal error state.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use validator::Validate;

use crate::domain::outcome::{FailureKind, FieldErrors, MutationOutcome};
use crate::domain::types::EntityId;
use crate::forms::prepare_payload;
use crate::models::auth::TokenSource;
use crate::repository::ResourceWriter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    Remove,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalMode {
    Create,
    Edit(EntityId),
}

/// Create/edit modal as the view renders it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModalState {
    pub mode: ModalMode,
    pub field_errors: FieldErrors,
    pub message: Option<String>,
}

impl ModalState {
    fn new(mode: ModalMode) -> Self {
        Self {
            mode,
            field_errors: FieldErrors::new(),
            message: None,
        }
    }
}

#[derive(Default)]
struct GatewayState {
    modal: Option<ModalState>,
    in_flight: HashMap<MutationKind, usize>,
}

/// Clears one in-flight slot when the call settles or is dropped.
struct InFlight<'a> {
    state: &'a Mutex<GatewayState>,
    kind: MutationKind,
}

impl<'a> InFlight<'a> {
    fn start(state: &'a Mutex<GatewayState>, kind: MutationKind) -> Self {
        *state.lock().in_flight.entry(kind).or_default() += 1;
        Self { state, kind }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if let Some(count) = state.in_flight.get_mut(&self.kind) {
            *count -= 1;
            if *count == 0 {
                state.in_flight.remove(&self.kind);
            }
        }
    }
}

/// Executes mutations against one resource.
///
/// Each call returns a [`MutationOutcome`] and never an error. Outcomes of
/// create and update are reflected in the open modal: validation messages are
/// merged per field, other failures become the top-level message and success
/// closes the modal. Refetching the list is left to the caller.
pub struct MutationGateway<R: ResourceWriter> {
    repo: Arc<R>,
    tokens: Arc<dyn TokenSource>,
    state: Mutex<GatewayState>,
}

impl<R> MutationGateway<R>
where
    R: ResourceWriter,
{
    pub fn new(repo: Arc<R>, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            repo,
            tokens,
            state: Mutex::new(GatewayState::default()),
        }
    }

    pub fn open_create(&self) {
        self.state.lock().modal = Some(ModalState::new(ModalMode::Create));
    }

    pub fn open_edit(&self, id: EntityId) {
        self.state.lock().modal = Some(ModalState::new(ModalMode::Edit(id)));
    }

    pub fn close_modal(&self) {
        self.state.lock().modal = None;
    }

    pub fn modal(&self) -> Option<ModalState> {
        self.state.lock().modal.clone()
    }

    /// The user changed `field`: its validation messages are dropped, other
    /// fields keep theirs.
    pub fn edit_field(&self, field: &str) {
        if let Some(modal) = self.state.lock().modal.as_mut() {
            modal.field_errors.clear_field(field);
        }
    }

    pub fn is_in_flight(&self, kind: MutationKind) -> bool {
        self.state.lock().in_flight.contains_key(&kind)
    }

    pub async fn create<P>(&self, payload: &P) -> MutationOutcome<R::Item>
    where
        P: Serialize + Validate + Sync,
    {
        let outcome = self.submit_create(payload).await;
        self.record(&outcome);
        outcome
    }

    pub async fn update<P>(&self, id: EntityId, payload: &P) -> MutationOutcome<R::Item>
    where
        P: Serialize + Validate + Sync,
    {
        let outcome = self.submit_update(id, payload).await;
        self.record(&outcome);
        outcome
    }

    pub async fn remove(&self, id: EntityId) -> MutationOutcome<()> {
        let Some(token) = self.tokens.bearer_token() else {
            return missing_token();
        };
        let _in_flight = InFlight::start(&self.state, MutationKind::Remove);
        match self.repo.delete_entity(&token, id).await {
            Ok(()) => {
                log::info!("Deleted entity {id}");
                MutationOutcome::Success(())
            }
            Err(err) => {
                log::error!("Failed to delete entity {id}: {err}");
                err.into()
            }
        }
    }

    async fn submit_create<P>(&self, payload: &P) -> MutationOutcome<R::Item>
    where
        P: Serialize + Validate + Sync,
    {
        let body = match prepare_payload(payload) {
            Ok(body) => body,
            Err(err) => return err.into(),
        };
        let Some(token) = self.tokens.bearer_token() else {
            return missing_token();
        };
        let _in_flight = InFlight::start(&self.state, MutationKind::Create);
        match self.repo.create_entity(&token, &body).await {
            Ok(entity) => MutationOutcome::Success(entity),
            Err(err) => {
                log::error!("Failed to create entity: {err}");
                err.into()
            }
        }
    }

    async fn submit_update<P>(&self, id: EntityId, payload: &P) -> MutationOutcome<R::Item>
    where
        P: Serialize + Validate + Sync,
    {
        let body = match prepare_payload(payload) {
            Ok(body) => body,
            Err(err) => return err.into(),
        };
        let Some(token) = self.tokens.bearer_token() else {
            return missing_token();
        };
        let _in_flight = InFlight::start(&self.state, MutationKind::Update);
        match self.repo.update_entity(&token, id, &body).await {
            Ok(entity) => MutationOutcome::Success(entity),
            Err(err) => {
                log::error!("Failed to update entity {id}: {err}");
                err.into()
            }
        }
    }

    fn record<T>(&self, outcome: &MutationOutcome<T>) {
        let mut state = self.state.lock();
        match outcome {
            MutationOutcome::Success(_) => state.modal = None,
            MutationOutcome::ValidationFailure {
                field_errors,
                message,
            } => {
                if let Some(modal) = state.modal.as_mut() {
                    modal.field_errors.merge(field_errors.clone());
                    modal.message = message.clone();
                }
            }
            MutationOutcome::TransportFailure { message, .. } => {
                if let Some(modal) = state.modal.as_mut() {
                    modal.message = Some(message.clone());
                }
            }
        }
    }
}

fn missing_token<T>() -> MutationOutcome<T> {
    log::warn!("Mutation attempted without a bearer token");
    MutationOutcome::TransportFailure {
        kind: FailureKind::Auth,
        message: "Authentication required".to_string(),
    }
}
