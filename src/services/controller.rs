//! Paginated list controller: one instance per mounted list view.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use validator::Validate;

use crate::domain::outcome::{FailureKind, MutationOutcome};
use crate::domain::query::QueryState;
use crate::domain::resource::ResourceDescriptor;
use crate::domain::types::{EntityId, FieldName};
use crate::models::auth::TokenSource;
use crate::models::config::{ClientConfig, CreatePolicy};
use crate::pagination::Direction;
use crate::repository::ResourceWriter;
use crate::services::confirmation::{ConfirmationGate, ConfirmationTarget};
use crate::services::debounce::Debouncer;
use crate::services::fetch::{FetchCoordinator, FetchSettlement, RequestToken};
use crate::services::mutation::{ModalState, MutationGateway, MutationKind};
use crate::services::view::ListView;
use crate::services::{ServiceError, ServiceResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControllerSettings {
    pub debounce: Duration,
    pub create_policy: CreatePolicy,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            create_policy: CreatePolicy::default(),
        }
    }
}

impl From<&ClientConfig> for ControllerSettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            debounce: config.debounce(),
            create_policy: config.create_policy,
        }
    }
}

/// Committed query plus the activation flag, guarded together.
#[derive(Default)]
struct Session {
    query: QueryState,
    active: bool,
}

struct Inner<R: ResourceWriter> {
    resource: ResourceDescriptor,
    settings: ControllerSettings,
    session: Mutex<Session>,
    fetcher: Arc<FetchCoordinator<R>>,
    mutations: MutationGateway<R>,
    confirmation: ConfirmationGate,
    debouncer: Debouncer,
}

/// Coordinates search, sort, filter, pagination and mutations for one list.
///
/// Every committed query change goes through a single path that dispatches
/// exactly one fetch. Methods that dispatch spawn tokio tasks and must be
/// called from within a runtime.
pub struct ListController<R: ResourceWriter> {
    inner: Arc<Inner<R>>,
}

impl<R: ResourceWriter> Clone for ListController<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> ListController<R>
where
    R: ResourceWriter + 'static,
{
    pub fn new(
        repo: Arc<R>,
        tokens: Arc<dyn TokenSource>,
        resource: ResourceDescriptor,
        settings: ControllerSettings,
    ) -> Self {
        let inner = Inner {
            fetcher: Arc::new(FetchCoordinator::new(
                Arc::clone(&repo),
                Arc::clone(&tokens),
            )),
            mutations: MutationGateway::new(repo, tokens),
            confirmation: ConfirmationGate::new(),
            debouncer: Debouncer::new(settings.debounce),
            session: Mutex::new(Session::default()),
            resource,
            settings,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn resource(&self) -> &ResourceDescriptor {
        &self.inner.resource
    }

    pub fn settings(&self) -> ControllerSettings {
        self.inner.settings
    }

    /// Starts the view from a fresh default query and fetches page 1.
    pub fn activate(&self) {
        self.inner.debouncer.cancel_all();
        self.inner.mutations.close_modal();
        self.inner.confirmation.cancel();

        let mut session = self.inner.session.lock();
        *session = Session {
            query: QueryState::default(),
            active: true,
        };
        self.inner.fetcher.reset();
        log::info!("Activated {} list", self.inner.resource.name());
        self.inner.dispatch(&session.query);
    }

    /// Cancels pending debounce timers and invalidates any in-flight fetch;
    /// its eventual response is ignored.
    pub fn deactivate(&self) {
        self.inner.debouncer.cancel_all();
        {
            let mut session = self.inner.session.lock();
            session.active = false;
            self.inner.fetcher.reset();
        }
        self.inner.mutations.close_modal();
        self.inner.confirmation.cancel();
        log::info!("Deactivated {} list", self.inner.resource.name());
    }

    pub fn is_active(&self) -> bool {
        self.inner.session.lock().active
    }

    pub fn query(&self) -> QueryState {
        self.inner.session.lock().query.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListView<R::Item>> {
        self.inner.fetcher.subscribe()
    }

    pub fn snapshot(&self) -> ListView<R::Item> {
        self.inner.fetcher.snapshot()
    }

    /// Stages a keystroke for a search field. The term is committed after the
    /// debounce interval, or immediately when the field is cleared.
    pub fn update_search(&self, field: &str, value: &str) -> ServiceResult<()> {
        let field = self.search_field(field)?;
        self.ensure_active()?;

        let weak = Arc::downgrade(&self.inner);
        self.inner
            .debouncer
            .stage(field, value, move |field, value| {
                if let Some(inner) = Weak::upgrade(&weak) {
                    inner.commit(|query| query.set_search(field, &value));
                }
            });
        Ok(())
    }

    /// What the search input should display: the staged value if the user is
    /// typing, the committed term otherwise.
    pub fn staged_search(&self, field: &str) -> ServiceResult<String> {
        let field = self.search_field(field)?;
        if let Some(staged) = self.inner.debouncer.staged(&field) {
            return Ok(staged);
        }
        Ok(self
            .inner
            .session
            .lock()
            .query
            .search_term(&field)
            .unwrap_or_default()
            .to_string())
    }

    /// Sorts by `key`, flipping the direction when it is already the sort key.
    pub fn update_sort(&self, key: &str) -> ServiceResult<()> {
        let key = self
            .inner
            .resource
            .sort_key(key)
            .cloned()
            .ok_or_else(|| ServiceError::UnknownSortKey(key.to_string()))?;
        self.ensure_active()?;
        self.inner.commit(|query| query.toggle_sort(key));
        Ok(())
    }

    /// `None` shows every status.
    pub fn update_filter(&self, status: Option<&str>) -> ServiceResult<()> {
        let status = match status {
            Some(value) => Some(
                self.inner
                    .resource
                    .status(value)
                    .cloned()
                    .ok_or_else(|| ServiceError::UnknownStatus(value.to_string()))?,
            ),
            None => None,
        };
        self.ensure_active()?;
        self.inner.commit(|query| query.set_filter(status));
        Ok(())
    }

    /// Jumps to an explicit page within the range of the displayed list.
    pub fn update_page(&self, page: usize) -> ServiceResult<()> {
        if let Some(cursor) = self.snapshot().cursor {
            if !cursor.contains(page) {
                return Err(ServiceError::PageOutOfRange {
                    page,
                    last_page: cursor.meta().last_page,
                });
            }
        }
        self.commit_page(page)
    }

    /// Follows the server's prev/next link. Fails when the control is
    /// disabled.
    pub fn go_to(&self, direction: Direction) -> ServiceResult<()> {
        let page = self
            .snapshot()
            .cursor
            .and_then(|cursor| cursor.target(direction))
            .ok_or(ServiceError::NavigationUnavailable(direction))?;
        self.commit_page(page)
    }

    /// Re-fetches the committed query; this is the retry affordance.
    pub fn refresh(&self) -> ServiceResult<()> {
        let session = self.inner.session.lock();
        if !session.active {
            return Err(ServiceError::Inactive);
        }
        self.inner.dispatch(&session.query);
        Ok(())
    }

    pub fn open_create(&self) {
        self.inner.mutations.open_create();
    }

    pub fn open_edit(&self, id: EntityId) {
        self.inner.mutations.open_edit(id);
    }

    pub fn close_modal(&self) {
        self.inner.mutations.close_modal();
    }

    pub fn edit_field(&self, field: &str) {
        self.inner.mutations.edit_field(field);
    }

    pub fn modal(&self) -> Option<ModalState> {
        self.inner.mutations.modal()
    }

    pub fn is_in_flight(&self, kind: MutationKind) -> bool {
        self.inner.mutations.is_in_flight(kind)
    }

    /// Submits the create modal. On success the list is refetched according
    /// to the configured [`CreatePolicy`].
    pub async fn create<P>(&self, payload: &P) -> MutationOutcome<R::Item>
    where
        P: Serialize + Validate + Sync,
    {
        let outcome = self.inner.mutations.create(payload).await;
        if outcome.is_success() {
            match self.inner.settings.create_policy {
                CreatePolicy::StayOnPage => self.inner.refetch(),
                CreatePolicy::FirstPage => self.inner.commit_or_refetch(1),
            }
        } else {
            self.inner.refetch_if_stale(&outcome);
        }
        outcome
    }

    /// Submits the edit modal and refetches the current query on success.
    pub async fn update<P>(&self, id: EntityId, payload: &P) -> MutationOutcome<R::Item>
    where
        P: Serialize + Validate + Sync,
    {
        let outcome = self.inner.mutations.update(id, payload).await;
        if outcome.is_success() {
            self.inner.refetch();
        } else {
            self.inner.refetch_if_stale(&outcome);
        }
        outcome
    }

    /// Opens the delete prompt. Nothing is sent until [`Self::confirm_delete`].
    pub fn request_delete(&self, target: ConfirmationTarget) -> bool {
        self.inner.confirmation.request_confirmation(target)
    }

    pub fn cancel_delete(&self) {
        self.inner.confirmation.cancel();
    }

    pub fn pending_confirmation(&self) -> Option<ConfirmationTarget> {
        self.inner.confirmation.pending_confirmation()
    }

    /// Deletes the confirmed row. Returns `None` when nothing was awaiting
    /// confirmation.
    ///
    /// The row's busy marker is held for the duration of the call and
    /// cleared whatever the outcome. Success always refetches; when the
    /// removed row was the only one on the last page the list steps back one
    /// page first.
    pub async fn confirm_delete(&self) -> Option<MutationOutcome<()>> {
        let pending = self.inner.confirmation.begin()?;
        let id = pending.target().id;
        let committed = self.query();
        let before = self.snapshot();

        let outcome = self.inner.mutations.remove(id).await;
        drop(pending);

        if outcome.is_success() {
            let step_back = before.cursor.as_ref().and_then(|cursor| {
                let meta = cursor.meta();
                let emptied = before.items.len() <= 1;
                (emptied && meta.current_page == meta.last_page && meta.last_page > 1)
                    .then(|| meta.current_page - 1)
            });
            match step_back {
                Some(page) => self.inner.step_back(&committed, page),
                None => self.inner.refetch(),
            }
        } else {
            self.inner.refetch_if_stale(&outcome);
        }
        Some(outcome)
    }

    /// Id of the row whose actions render busy.
    pub fn pending_action(&self) -> Option<EntityId> {
        self.inner.confirmation.pending_action()
    }

    pub fn is_row_busy(&self, id: EntityId) -> bool {
        self.inner.confirmation.is_busy(id)
    }

    fn search_field(&self, field: &str) -> ServiceResult<FieldName> {
        self.inner
            .resource
            .search_field(field)
            .cloned()
            .ok_or_else(|| ServiceError::UnknownSearchField(field.to_string()))
    }

    fn ensure_active(&self) -> ServiceResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(ServiceError::Inactive)
        }
    }

    fn commit_page(&self, page: usize) -> ServiceResult<()> {
        let mut session = self.inner.session.lock();
        if !session.active {
            return Err(ServiceError::Inactive);
        }
        if session.query.set_page(page)? {
            self.inner.dispatch(&session.query);
        }
        Ok(())
    }
}

impl<R> Inner<R>
where
    R: ResourceWriter + 'static,
{
    /// The single commit path: applies `change` to the committed query and
    /// dispatches a fetch when it changed anything.
    fn commit(self: &Arc<Self>, change: impl FnOnce(&mut QueryState) -> bool) {
        let mut session = self.session.lock();
        if !session.active {
            log::debug!("Ignoring query change on inactive {} list", self.resource.name());
            return;
        }
        if change(&mut session.query) {
            self.dispatch(&session.query);
        }
    }

    /// Commits `page`; refetches when the query is already on that page.
    fn commit_or_refetch(self: &Arc<Self>, page: usize) {
        let mut session = self.session.lock();
        if !session.active {
            return;
        }
        match session.query.set_page(page) {
            Ok(_) => self.dispatch(&session.query),
            Err(err) => log::error!("Cannot move to page {page}: {err}"),
        }
    }

    /// Moves to `page` only while `expected` is still the committed query;
    /// a query changed in the meantime is refetched as it stands.
    fn step_back(self: &Arc<Self>, expected: &QueryState, page: usize) {
        let mut session = self.session.lock();
        if !session.active {
            return;
        }
        if session.query != *expected {
            log::debug!("Query changed during delete, refetching without stepping back");
            self.dispatch(&session.query);
            return;
        }
        match session.query.set_page(page) {
            Ok(_) => self.dispatch(&session.query),
            Err(err) => log::error!("Cannot move to page {page}: {err}"),
        }
    }

    /// Moves to `last_page` after fetch `token` came back past the end,
    /// unless a newer fetch has been dispatched since.
    fn clamp_to_last_page(self: &Arc<Self>, token: RequestToken, last_page: usize) {
        let mut session = self.session.lock();
        if !session.active || self.fetcher.latest_token() != token {
            log::debug!("Skipping clamp for superseded fetch {}", token.get());
            return;
        }
        match session.query.set_page(last_page) {
            Ok(_) => self.dispatch(&session.query),
            Err(err) => log::error!("Cannot move to page {last_page}: {err}"),
        }
    }

    fn refetch(self: &Arc<Self>) {
        let session = self.session.lock();
        if session.active {
            self.dispatch(&session.query);
        }
    }

    fn refetch_if_stale<T>(self: &Arc<Self>, outcome: &MutationOutcome<T>) {
        if let MutationOutcome::TransportFailure {
            kind: FailureKind::StaleTarget,
            ..
        } = outcome
        {
            log::info!("Target row is gone, refreshing {} list", self.resource.name());
            self.refetch();
        }
    }

    /// Issues the fetch for `query`. Called with the session lock held so
    /// dispatch order matches commit order.
    fn dispatch(self: &Arc<Self>, query: &QueryState) {
        let pending = self.fetcher.fetch(query.clone());
        let token = self.fetcher.latest_token();
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            if let FetchSettlement::BeyondLastPage { last_page } = pending.await {
                if let Some(inner) = weak.upgrade() {
                    inner.clamp_to_last_page(token, last_page);
                }
            }
        });
    }
}
