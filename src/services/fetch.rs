//! One list fetch per committed query, last-dispatched-wins.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::domain::page::PageResult;
use crate::domain::query::QueryState;
use crate::models::auth::TokenSource;
use crate::repository::ResourceReader;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::services::view::ListView;

/// Stamp of one dispatched fetch. Only the latest issued token may write
/// into the view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// What happened to a fetch once its response arrived.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchSettlement {
    /// Page accepted into the view.
    Applied,
    /// Error accepted into the view; previous items stay visible.
    Failed,
    /// A newer fetch was dispatched meanwhile; nothing changed.
    Discarded,
    /// Empty page past the end of the list. Not applied; the view stays
    /// loading so the caller can move to `last_page`.
    BeyondLastPage { last_page: usize },
}

pub struct FetchCoordinator<R: ResourceReader> {
    repo: Arc<R>,
    tokens: Arc<dyn TokenSource>,
    latest: Mutex<RequestToken>,
    view: watch::Sender<ListView<R::Item>>,
}

impl<R> FetchCoordinator<R>
where
    R: ResourceReader + 'static,
{
    pub fn new(repo: Arc<R>, tokens: Arc<dyn TokenSource>) -> Self {
        let (view, _) = watch::channel(ListView::default());
        Self {
            repo,
            tokens,
            latest: Mutex::new(RequestToken(0)),
            view,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ListView<R::Item>> {
        self.view.subscribe()
    }

    pub fn snapshot(&self) -> ListView<R::Item> {
        self.view.borrow().clone()
    }

    pub fn latest_token(&self) -> RequestToken {
        *self.latest.lock()
    }

    /// Issues a fresh token and marks the view loading before returning; the
    /// returned future performs the request and settles it.
    pub fn fetch(
        self: &Arc<Self>,
        query: QueryState,
    ) -> impl Future<Output = FetchSettlement> + Send + use<R> {
        let token = {
            let mut latest = self.latest.lock();
            *latest = RequestToken(latest.0 + 1);
            self.view.send_modify(ListView::start_loading);
            *latest
        };
        log::debug!("Dispatching fetch {} for page {}", token.0, query.page());

        let this = Arc::clone(self);
        async move {
            let result = match this.tokens.bearer_token() {
                Some(bearer) => this.repo.list_page(&bearer, &query).await,
                None => Err(RepositoryError::Unauthenticated),
            };
            this.settle(token, result)
        }
    }

    fn settle(
        &self,
        token: RequestToken,
        result: RepositoryResult<PageResult<R::Item>>,
    ) -> FetchSettlement {
        let latest = self.latest.lock();
        if token != *latest {
            log::debug!(
                "Discarding stale fetch {} (latest is {})",
                token.0,
                latest.0
            );
            return FetchSettlement::Discarded;
        }

        match result {
            Ok(page) if page.is_beyond_last_page() => {
                log::info!(
                    "Page {} is past the last page {}",
                    page.meta.current_page,
                    page.meta.last_page
                );
                FetchSettlement::BeyondLastPage {
                    last_page: page.meta.last_page.max(1),
                }
            }
            Ok(page) => {
                self.view.send_modify(|view| view.apply_page(page));
                FetchSettlement::Applied
            }
            Err(err) => {
                log::error!("Failed to fetch list: {err}");
                self.view.send_modify(|view| view.apply_error(&err));
                FetchSettlement::Failed
            }
        }
    }

    /// Invalidates every outstanding fetch and returns the view to Idle.
    pub fn reset(&self) {
        let mut latest = self.latest.lock();
        *latest = RequestToken(latest.0 + 1);
        self.view.send_replace(ListView::default());
    }
}
