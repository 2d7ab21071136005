//! Live search session: latest query wins.
//!
//! `LiveSearch` owns the [`SearchController`] and is the only writer of its
//! response. Each ticket the controller issues runs as its own task under a
//! fresh `CancellationToken`; issuing the next ticket cancels the previous
//! token. Finished fetches come back over a channel and are applied one at a
//! time in `next_update`, where the controller's generation check drops
//! anything that was superseded, whether or not the abort took effect in
//! time.

use std::sync::Arc;

use movie_search_core::{
    ApiError, MovieItem, PaginatedResponse, Resolution, SearchController, SearchState, Ticket,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::fetch::{fetch_movies, MovieSource};

struct Completion {
    ticket: Ticket,
    result: Result<PaginatedResponse<MovieItem>, ApiError>,
}

/// One finished fetch and what the controller did with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub generation: u64,
    pub query: String,
    pub page: u32,
    pub resolution: Resolution,
}

pub struct LiveSearch<S> {
    source: Arc<S>,
    controller: SearchController,
    current: Option<(Ticket, CancellationToken)>,
    outstanding: usize,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl<S: MovieSource> LiveSearch<S> {
    /// A session that has not fetched anything yet.
    pub fn new(source: Arc<S>, controller: SearchController) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            source,
            controller,
            current: None,
            outstanding: 0,
            tx,
            rx,
        }
    }

    /// Create a session and immediately fetch the current (empty) query.
    /// Must be called inside a tokio runtime.
    pub fn mount(source: Arc<S>, controller: SearchController) -> Self {
        let mut session = Self::new(source, controller);
        let ticket = session.controller.mount();
        session.dispatch(ticket);
        session
    }

    /// Returns `false` when the query did not change and nothing was fetched.
    pub fn set_query(&mut self, query: impl Into<String>) -> bool {
        match self.controller.set_query(query) {
            Some(ticket) => {
                self.dispatch(ticket);
                true
            }
            None => false,
        }
    }

    pub fn next_page(&mut self) -> bool {
        match self.controller.next_page() {
            Some(ticket) => {
                self.dispatch(ticket);
                true
            }
            None => false,
        }
    }

    pub fn previous_page(&mut self) -> bool {
        match self.controller.previous_page() {
            Some(ticket) => {
                self.dispatch(ticket);
                true
            }
            None => false,
        }
    }

    pub fn query(&self) -> &str {
        self.controller.query()
    }

    pub fn page(&self) -> u32 {
        self.controller.page()
    }

    pub fn state(&self) -> SearchState {
        self.controller.state()
    }

    pub fn response(&self) -> Option<&PaginatedResponse<MovieItem>> {
        self.controller.response()
    }

    /// Whether the fetch for the current query is still unresolved.
    pub fn is_loading(&self) -> bool {
        self.current.is_some()
    }

    /// Whether any spawned fetch, current or superseded, has yet to report.
    pub fn has_outstanding(&self) -> bool {
        self.outstanding > 0
    }

    /// Wait for the next fetch to finish and apply it. `None` when nothing
    /// is outstanding.
    pub async fn next_update(&mut self) -> Option<Update> {
        if self.outstanding == 0 {
            return None;
        }
        let completion = self.rx.recv().await?;
        self.outstanding -= 1;
        Some(self.apply(completion))
    }

    /// Apply finished fetches until the current one is resolved, and return
    /// what happened to it. `None` when no fetch is current.
    pub async fn settle(&mut self) -> Option<Resolution> {
        let target = self.current.as_ref()?.0.generation();
        loop {
            let update = self.next_update().await?;
            if update.generation == target {
                return Some(update.resolution);
            }
        }
    }

    fn dispatch(&mut self, ticket: Ticket) {
        if let Some((previous, token)) = self.current.take() {
            debug!(generation = previous.generation(), "cancelling superseded fetch");
            token.cancel();
        }

        let token = CancellationToken::new();
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let task_ticket = ticket.clone();
        let task_token = token.clone();
        tokio::spawn(async move {
            let result =
                fetch_movies(source.as_ref(), task_ticket.params().clone(), &task_token).await;
            // The receiver is gone once the session is dropped.
            let _ = tx.send(Completion {
                ticket: task_ticket,
                result,
            });
        });

        self.outstanding += 1;
        self.current = Some((ticket, token));
    }

    fn apply(&mut self, completion: Completion) -> Update {
        let Completion { ticket, result } = completion;
        let resolution = self.controller.resolve(&ticket, result);
        let is_current = self
            .current
            .as_ref()
            .is_some_and(|(current, _)| current.generation() == ticket.generation());
        if is_current {
            self.current = None;
        }
        Update {
            generation: ticket.generation(),
            query: ticket.params().query().to_string(),
            page: ticket.params().page(),
            resolution,
        }
    }
}

impl<S> Drop for LiveSearch<S> {
    fn drop(&mut self) {
        if let Some((_, token)) = self.current.take() {
            token.cancel();
        }
        self.controller.teardown();
    }
}
