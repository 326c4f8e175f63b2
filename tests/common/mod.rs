#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use pushkind_listview::domain::entity::Record;
use pushkind_listview::domain::page::{PageMeta, PageResult};
use pushkind_listview::domain::query::{QueryState, SortDirection};
use pushkind_listview::domain::resource::ResourceDescriptor;
use pushkind_listview::domain::types::EntityId;
use pushkind_listview::models::auth::StaticToken;
use pushkind_listview::models::config::CreatePolicy;
use pushkind_listview::repository::errors::{RepositoryError, RepositoryResult};
use pushkind_listview::repository::{ResourceReader, ResourceWriter};
use pushkind_listview::services::controller::{ControllerSettings, ListController};
use serde_json::{Value, json};
use tokio::sync::oneshot;

pub const DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Default)]
struct FakeState {
    rows: Vec<Record>,
    per_page: usize,
    next_id: i64,
    list_calls: Vec<QueryState>,
    hold_lists: bool,
    gates: HashMap<usize, oneshot::Sender<()>>,
    list_error: Option<RepositoryError>,
    create_error: Option<RepositoryError>,
    delete_error: Option<RepositoryError>,
    delete_calls: Vec<EntityId>,
    delete_gate: Option<oneshot::Receiver<()>>,
    create_gate: Option<oneshot::Receiver<()>>,
    update_gate: Option<oneshot::Receiver<()>>,
}

/// In-memory resource behaving like the paginated REST API.
///
/// With [`FakeRepository::hold_lists`] enabled every list call computes its
/// response immediately but waits for [`FakeRepository::release`] before
/// returning it, so tests decide the order responses arrive in.
pub struct FakeRepository {
    state: Mutex<FakeState>,
}

pub fn record(id: i64, name: &str, status: &str) -> Record {
    serde_json::from_value(json!({"id": id, "name": name, "status": status}))
        .expect("valid record")
}

impl FakeRepository {
    pub fn with_rows(count: usize) -> Self {
        let rows = (1..=count as i64)
            .map(|id| record(id, &format!("Row {id:03}"), "active"))
            .collect();
        Self::with_records(rows)
    }

    pub fn with_records(rows: Vec<Record>) -> Self {
        let next_id = rows.iter().map(|row| row.id.get()).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(FakeState {
                rows,
                per_page: 25,
                next_id,
                ..FakeState::default()
            }),
        }
    }

    pub fn hold_lists(&self, hold: bool) {
        self.state.lock().hold_lists = hold;
    }

    /// Lets the `call`-th list request (0-based) return its response.
    pub fn release(&self, call: usize) {
        if let Some(gate) = self.state.lock().gates.remove(&call) {
            let _ = gate.send(());
        }
    }

    pub fn list_calls(&self) -> Vec<QueryState> {
        self.state.lock().list_calls.clone()
    }

    pub fn list_call_count(&self) -> usize {
        self.state.lock().list_calls.len()
    }

    pub fn delete_calls(&self) -> Vec<EntityId> {
        self.state.lock().delete_calls.clone()
    }

    pub fn remove_row(&self, id: i64) {
        self.state.lock().rows.retain(|row| row.id.get() != id);
    }

    pub fn fail_next_list(&self, err: RepositoryError) {
        self.state.lock().list_error = Some(err);
    }

    pub fn fail_next_create(&self, err: RepositoryError) {
        self.state.lock().create_error = Some(err);
    }

    pub fn fail_next_delete(&self, err: RepositoryError) {
        self.state.lock().delete_error = Some(err);
    }

    /// Makes the next delete wait until the returned sender fires.
    pub fn hold_next_delete(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().delete_gate = Some(rx);
        tx
    }

    /// Makes the next create wait until the returned sender fires.
    pub fn hold_next_create(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().create_gate = Some(rx);
        tx
    }

    /// Makes the next update wait until the returned sender fires.
    pub fn hold_next_update(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().update_gate = Some(rx);
        tx
    }

    fn render_page(state: &FakeState, query: &QueryState) -> PageResult<Record> {
        let mut rows: Vec<Record> = state
            .rows
            .iter()
            .filter(|row| {
                query.search_terms().all(|(field, term)| {
                    let column = if field.as_str() == "search" { "name" } else { field.as_str() };
                    row.fields
                        .get(column)
                        .and_then(Value::as_str)
                        .is_some_and(|value| value.to_lowercase().contains(&term.to_lowercase()))
                })
            })
            .filter(|row| {
                query.status_filter().is_none_or(|status| {
                    row.fields.get("status").and_then(Value::as_str) == Some(status.as_str())
                })
            })
            .cloned()
            .collect();

        if let Some(key) = query.sort_key() {
            rows.sort_by(|a, b| {
                let left = a.fields.get(key.as_str()).and_then(Value::as_str);
                let right = b.fields.get(key.as_str()).and_then(Value::as_str);
                left.cmp(&right)
            });
            if query.sort_direction() == SortDirection::Descending {
                rows.reverse();
            }
        }

        let total = rows.len();
        let per_page = state.per_page;
        let last_page = total.div_ceil(per_page).max(1);
        let page = query.page();
        let items: Vec<Record> = rows.into_iter().skip((page - 1) * per_page).take(per_page).collect();
        let (from, to) = if items.is_empty() {
            (None, None)
        } else {
            let from = (page - 1) * per_page + 1;
            (Some(from), Some(from + items.len() - 1))
        };
        let link = |page: usize| format!("https://shop.example.com/api/items?page={page}");

        PageResult {
            items,
            meta: PageMeta {
                current_page: page,
                last_page,
                per_page,
                total,
                from,
                to,
            },
            prev_link: (page > 1).then(|| link(page - 1)),
            next_link: (page < last_page).then(|| link(page + 1)),
        }
    }
}

#[async_trait]
impl ResourceReader for FakeRepository {
    type Item = Record;

    async fn list_page(
        &self,
        _token: &str,
        query: &QueryState,
    ) -> RepositoryResult<PageResult<Record>> {
        let (response, gate) = {
            let mut state = self.state.lock();
            state.list_calls.push(query.clone());
            let call = state.list_calls.len() - 1;
            let response = match state.list_error.take() {
                Some(err) => Err(err),
                None => Ok(Self::render_page(&state, query)),
            };
            let gate = state.hold_lists.then(|| {
                let (tx, rx) = oneshot::channel();
                state.gates.insert(call, tx);
                rx
            });
            (response, gate)
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        response
    }
}

#[async_trait]
impl ResourceWriter for FakeRepository {
    async fn create_entity(&self, _token: &str, payload: &Value) -> RepositoryResult<Record> {
        let gate = self.state.lock().create_gate.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let mut state = self.state.lock();
        if let Some(err) = state.create_error.take() {
            return Err(err);
        }
        let id = state.next_id;
        state.next_id += 1;
        let mut body = payload.clone();
        body["id"] = json!(id);
        let row: Record = serde_json::from_value(body)?;
        state.rows.push(row.clone());
        Ok(row)
    }

    async fn update_entity(
        &self,
        _token: &str,
        id: EntityId,
        payload: &Value,
    ) -> RepositoryResult<Record> {
        let gate = self.state.lock().update_gate.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let mut state = self.state.lock();
        let row = state
            .rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if let Some(fields) = payload.as_object() {
            for (key, value) in fields {
                row.fields.insert(key.clone(), value.clone());
            }
        }
        Ok(row.clone())
    }

    async fn delete_entity(&self, _token: &str, id: EntityId) -> RepositoryResult<()> {
        let gate = self.state.lock().delete_gate.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let mut state = self.state.lock();
        state.delete_calls.push(id);
        if let Some(err) = state.delete_error.take() {
            return Err(err);
        }
        let before = state.rows.len();
        state.rows.retain(|row| row.id != id);
        if state.rows.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

pub fn items_resource() -> ResourceDescriptor {
    ResourceDescriptor::new("items", "items")
        .search_fields(&["search", "email"])
        .sort_keys(&["name"])
        .statuses(&["active", "archived"])
}

pub fn controller(repo: &Arc<FakeRepository>) -> ListController<FakeRepository> {
    controller_with(repo, StaticToken::new("secret"), CreatePolicy::StayOnPage)
}

pub fn controller_with(
    repo: &Arc<FakeRepository>,
    token: StaticToken,
    create_policy: CreatePolicy,
) -> ListController<FakeRepository> {
    ListController::new(
        Arc::clone(repo),
        Arc::new(token),
        items_resource(),
        ControllerSettings {
            debounce: DEBOUNCE,
            create_policy,
        },
    )
}

/// Lets spawned fetch tasks run to completion under paused time.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

pub fn id(value: i64) -> EntityId {
    EntityId::new(value).expect("valid id")
}
