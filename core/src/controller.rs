//! Query/response state machine with latest-query-wins commits.
//!
//! Every fetch the controller asks for is described by a [`Ticket`] stamped
//! with a generation number. Changing the query (or the page) bumps the
//! generation, so a ticket issued earlier can never commit once a newer one
//! exists, no matter in which order the fetches finish. Cancelling the
//! transport is the host's job; this check is what keeps stale results out.

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::types::{MovieItem, PaginatedResponse, SearchParams, DEFAULT_PAGE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// Nothing issued yet, or the only fetches so far failed.
    Idle,
    /// A fetch for the current query is in flight.
    Loading,
    /// `response` holds the result of the last committed fetch.
    Loaded,
}

/// A fetch the host should perform on behalf of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    params: SearchParams,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }
}

/// What happened to a finished fetch handed back through
/// [`SearchController::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The result became the displayed response.
    Committed,
    /// A newer ticket exists; the result was dropped.
    Superseded,
    /// The fetch was aborted before it finished.
    Cancelled,
    /// The fetch failed; the previous response is still displayed.
    Failed(ApiError),
}

#[derive(Debug)]
pub struct SearchController {
    query: String,
    page: u32,
    committed_page: u32,
    committed_query: String,
    page_size: u32,
    generation: u64,
    issued: bool,
    state: SearchState,
    response: Option<PaginatedResponse<MovieItem>>,
}

impl Default for SearchController {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: 1,
            committed_page: 1,
            committed_query: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
            generation: 0,
            issued: false,
            state: SearchState::Idle,
            response: None,
        }
    }
}

impl SearchController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: u32) -> Result<Self, ApiError> {
        SearchParams::new("", 1, page_size)?;
        Ok(Self {
            page_size,
            ..Self::default()
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Page number of the displayed response.
    pub fn page(&self) -> u32 {
        self.committed_page
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn response(&self) -> Option<&PaginatedResponse<MovieItem>> {
        self.response.as_ref()
    }

    /// Issue the initial fetch for whatever query is current (empty at
    /// start-up, which matches the whole catalog).
    pub fn mount(&mut self) -> Ticket {
        self.issue()
    }

    /// Record new input. Returns a ticket only when the query actually
    /// changed; the new query always starts again at page 1.
    pub fn set_query(&mut self, query: impl Into<String>) -> Option<Ticket> {
        let query = query.into();
        if self.issued && query == self.query {
            return None;
        }
        self.query = query;
        self.page = 1;
        Some(self.issue())
    }

    /// Fetch the page after the displayed one, if the server advertised it.
    /// Nothing is issued while the display still belongs to another query.
    pub fn next_page(&mut self) -> Option<Ticket> {
        let has_next = self
            .displayed_response()
            .is_some_and(|r| r.next.is_some());
        if !has_next {
            return None;
        }
        self.page = self.committed_page + 1;
        Some(self.issue())
    }

    /// Fetch the page before the displayed one, if the server advertised it.
    pub fn previous_page(&mut self) -> Option<Ticket> {
        let has_previous = self
            .displayed_response()
            .is_some_and(|r| r.previous.is_some());
        if !has_previous || self.committed_page <= 1 {
            return None;
        }
        self.page = self.committed_page - 1;
        Some(self.issue())
    }

    /// Hand back the outcome of a fetch. Only the ticket from the most recent
    /// `mount`/`set_query`/`*_page` call can change `response`.
    pub fn resolve(
        &mut self,
        ticket: &Ticket,
        result: Result<PaginatedResponse<MovieItem>, ApiError>,
    ) -> Resolution {
        if ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                current = self.generation,
                "dropping superseded result"
            );
            return Resolution::Superseded;
        }
        match result {
            Ok(response) => {
                self.response = Some(response);
                self.committed_page = ticket.params.page();
                self.committed_query = ticket.params.query().to_string();
                self.state = SearchState::Loaded;
                Resolution::Committed
            }
            Err(ApiError::Cancelled) => {
                debug!(generation = ticket.generation, "fetch cancelled");
                self.state = self.settled_state();
                Resolution::Cancelled
            }
            Err(err) => {
                warn!(query = %ticket.params.query(), error = %err, "search failed");
                self.state = self.settled_state();
                Resolution::Failed(err)
            }
        }
    }

    /// Invalidate every outstanding ticket. Used when the view goes away.
    pub fn teardown(&mut self) {
        self.generation += 1;
        self.state = self.settled_state();
    }

    fn issue(&mut self) -> Ticket {
        self.generation += 1;
        self.issued = true;
        self.state = SearchState::Loading;
        Ticket {
            generation: self.generation,
            params: SearchParams::unchecked(self.query.clone(), self.page, self.page_size),
        }
    }

    /// The response on display, if it answers the current query.
    fn displayed_response(&self) -> Option<&PaginatedResponse<MovieItem>> {
        self.response
            .as_ref()
            .filter(|_| self.committed_query == self.query)
    }

    fn settled_state(&self) -> SearchState {
        if self.response.is_some() {
            SearchState::Loaded
        } else {
            SearchState::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_of(titles: &[&str], next: bool, previous: bool) -> PaginatedResponse<MovieItem> {
        PaginatedResponse {
            count: titles.len() as u64,
            next: next.then(|| "http://api/next".to_string()),
            previous: previous.then(|| "http://api/previous".to_string()),
            results: titles
                .iter()
                .enumerate()
                .map(|(i, title)| MovieItem {
                    id: i as i64 + 1,
                    title: title.to_string(),
                    year: Some(2000),
                    genres: Vec::new(),
                    avg_rating: None,
                    num_ratings: 0,
                    imdb_url: format!("http://imdb/{i}"),
                    tmdb_url: format!("http://tmdb/{i}"),
                })
                .collect(),
        }
    }

    fn titles(controller: &SearchController) -> Vec<String> {
        controller
            .response()
            .map(|r| r.results.iter().map(|m| m.title.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn starts_idle_without_response() {
        let controller = SearchController::new();
        assert_eq!(controller.state(), SearchState::Idle);
        assert!(controller.response().is_none());
        assert_eq!(controller.query(), "");
    }

    #[test]
    fn mount_requests_whole_catalog() {
        let mut controller = SearchController::new();
        let ticket = controller.mount();
        assert_eq!(ticket.params(), &SearchParams::default());
        assert_eq!(controller.state(), SearchState::Loading);
    }

    #[test]
    fn current_ticket_commits() {
        let mut controller = SearchController::new();
        let ticket = controller.set_query("matrix").unwrap();
        let outcome = controller.resolve(&ticket, Ok(page_of(&["The Matrix"], false, false)));
        assert_eq!(outcome, Resolution::Committed);
        assert_eq!(controller.state(), SearchState::Loaded);
        assert_eq!(titles(&controller), vec!["The Matrix"]);
    }

    #[test]
    fn unchanged_query_issues_nothing() {
        let mut controller = SearchController::new();
        controller.mount();
        assert!(controller.set_query("").is_none());
        assert!(controller.set_query("a").is_some());
        assert!(controller.set_query("a").is_none());
    }

    #[test]
    fn late_result_of_older_query_is_dropped() {
        let mut controller = SearchController::new();
        let first = controller.set_query("m").unwrap();
        let second = controller.set_query("ma").unwrap();

        assert_eq!(
            controller.resolve(&second, Ok(page_of(&["Mad Max"], false, false))),
            Resolution::Committed
        );
        assert_eq!(
            controller.resolve(&first, Ok(page_of(&["Memento"], false, false))),
            Resolution::Superseded
        );
        assert_eq!(titles(&controller), vec!["Mad Max"]);
    }

    #[test]
    fn early_result_of_older_query_is_dropped_while_loading() {
        let mut controller = SearchController::new();
        let first = controller.set_query("m").unwrap();
        let second = controller.set_query("ma").unwrap();

        assert_eq!(
            controller.resolve(&first, Ok(page_of(&["Memento"], false, false))),
            Resolution::Superseded
        );
        assert_eq!(controller.state(), SearchState::Loading);
        assert!(controller.response().is_none());

        controller.resolve(&second, Ok(page_of(&["Mad Max"], false, false)));
        assert_eq!(titles(&controller), vec!["Mad Max"]);
    }

    #[test]
    fn only_last_of_many_queries_commits_in_any_order() {
        let mut controller = SearchController::new();
        let tickets: Vec<Ticket> = ["t", "te", "ter", "term"]
            .iter()
            .map(|q| controller.set_query(*q).unwrap())
            .collect();

        for index in [3, 0, 2, 1] {
            let title = tickets[index].params().query().to_string();
            controller.resolve(&tickets[index], Ok(page_of(&[&title], false, false)));
        }
        assert_eq!(titles(&controller), vec!["term"]);
    }

    #[test]
    fn failure_keeps_previous_response() {
        let mut controller = SearchController::new();
        let ticket = controller.set_query("a").unwrap();
        controller.resolve(&ticket, Ok(page_of(&["Alien"], false, false)));

        let ticket = controller.set_query("ab").unwrap();
        let outcome = controller.resolve(&ticket, Err(ApiError::Parse("eof".to_string())));
        assert_eq!(outcome, Resolution::Failed(ApiError::Parse("eof".to_string())));
        assert_eq!(controller.state(), SearchState::Loaded);
        assert_eq!(titles(&controller), vec!["Alien"]);
    }

    #[test]
    fn failure_before_any_response_returns_to_idle() {
        let mut controller = SearchController::new();
        let ticket = controller.mount();
        controller.resolve(&ticket, Err(ApiError::Network("refused".to_string())));
        assert_eq!(controller.state(), SearchState::Idle);
        assert!(controller.response().is_none());
    }

    #[test]
    fn cancelled_fetch_keeps_response_and_settles() {
        let mut controller = SearchController::new();
        let ticket = controller.set_query("a").unwrap();
        assert_eq!(
            controller.resolve(&ticket, Err(ApiError::Cancelled)),
            Resolution::Cancelled
        );
        assert!(controller.response().is_none());
        assert_eq!(controller.state(), SearchState::Idle);
    }

    #[test]
    fn cancelled_current_fetch_settles_back_to_loaded() {
        let mut controller = SearchController::new();
        let ticket = controller.set_query("a").unwrap();
        controller.resolve(&ticket, Ok(page_of(&["Alien"], true, false)));

        let ticket = controller.next_page().unwrap();
        assert_eq!(controller.state(), SearchState::Loading);
        controller.resolve(&ticket, Err(ApiError::Cancelled));
        assert_eq!(controller.state(), SearchState::Loaded);
        assert_eq!(controller.page(), 1);
    }

    #[test]
    fn teardown_supersedes_outstanding_ticket() {
        let mut controller = SearchController::new();
        let ticket = controller.set_query("a").unwrap();
        controller.teardown();
        assert_eq!(
            controller.resolve(&ticket, Ok(page_of(&["Alien"], false, false))),
            Resolution::Superseded
        );
        assert!(controller.response().is_none());
        assert_eq!(controller.state(), SearchState::Idle);
    }

    #[test]
    fn paging_follows_advertised_links() {
        let mut controller = SearchController::with_page_size(1).unwrap();
        assert!(controller.next_page().is_none());

        let ticket = controller.set_query("a").unwrap();
        assert_eq!(ticket.params().page_size(), 1);
        controller.resolve(&ticket, Ok(page_of(&["Alien"], true, false)));
        assert!(controller.previous_page().is_none());

        let ticket = controller.next_page().unwrap();
        assert_eq!(ticket.params().page(), 2);
        assert_eq!(ticket.params().query(), "a");
        controller.resolve(&ticket, Ok(page_of(&["Aliens"], false, true)));
        assert!(controller.next_page().is_none());

        assert_eq!(controller.page(), 2);

        let ticket = controller.previous_page().unwrap();
        assert_eq!(ticket.params().page(), 1);
    }

    #[test]
    fn failed_page_fetch_keeps_displayed_page() {
        let mut controller = SearchController::new();
        let ticket = controller.set_query("a").unwrap();
        controller.resolve(&ticket, Ok(page_of(&["Alien"], true, false)));

        let ticket = controller.next_page().unwrap();
        controller.resolve(&ticket, Err(ApiError::Network("reset".to_string())));
        assert_eq!(controller.page(), 1);
        assert_eq!(controller.next_page().unwrap().params().page(), 2);
    }

    #[test]
    fn no_paging_while_another_query_is_loading() {
        let mut controller = SearchController::new();
        let ticket = controller.set_query("a").unwrap();
        controller.resolve(&ticket, Ok(page_of(&["Alien"], true, true)));

        let pending = controller.set_query("b").unwrap();
        assert!(controller.next_page().is_none());
        assert!(controller.previous_page().is_none());

        // The first page of "b" is still the fetch that commits.
        assert_eq!(
            controller.resolve(&pending, Ok(page_of(&["Brazil"], true, false))),
            Resolution::Committed
        );
        assert_eq!(controller.page(), 1);
        let ticket = controller.next_page().unwrap();
        assert_eq!(ticket.params().query(), "b");
        assert_eq!(ticket.params().page(), 2);
    }

    #[test]
    fn paging_resumes_after_returning_to_displayed_query() {
        let mut controller = SearchController::new();
        let ticket = controller.set_query("a").unwrap();
        controller.resolve(&ticket, Ok(page_of(&["Alien"], true, false)));

        controller.set_query("ab").unwrap();
        assert!(controller.next_page().is_none());
        controller.set_query("a").unwrap();
        assert_eq!(controller.next_page().unwrap().params().page(), 2);
    }

    #[test]
    fn new_query_resets_page() {
        let mut controller = SearchController::new();
        let ticket = controller.set_query("a").unwrap();
        controller.resolve(&ticket, Ok(page_of(&["Alien"], true, false)));
        controller.next_page().unwrap();
        let ticket = controller.set_query("b").unwrap();
        assert_eq!(ticket.params().page(), 1);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert!(SearchController::with_page_size(0).is_err());
    }
}
