//! Search pipeline: raw query text in, display-ready user list out.
//!
//! # Architecture
//!
//! ```text
//! SearchPipeline (handle) ── Command ──▶ actor task ── watch ──▶ SearchSnapshot
//!                                         │    ▲
//!                                 spawn   ▼    │ FetchCompleted { seq, .. }
//!                                       fetch task (GitHubClient)
//! ```
//!
//! The actor task is the only writer of search state. Keystrokes, favorite
//! toggles and fetch completions all arrive as commands on one channel, so
//! every mutation is serialized. Fetches run as independent tasks and post
//! their outcome back to the actor. Each fetch carries a sequence number and
//! only the most recently issued one may commit, so a slow response for an
//! older query never overwrites a newer one.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;

use crate::github::{GitHubClient, NetworkError, UserSummary};

use super::debounce::{DEFAULT_DEBOUNCE, Debouncer};
use super::display::{DisplayState, project};
use super::favorites::Favorites;

/// Tunables for [`SearchPipeline`].
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Quiet period before a query is fetched.
    pub debounce: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Complete search state as published to readers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSnapshot {
    raw_query: String,
    stable_query: Option<String>,
    all_users: Vec<UserSummary>,
    favorites: Favorites,
    favorites_only: bool,
    displayed_users: Vec<UserSummary>,
    is_loading: bool,
    error_message: Option<String>,
    has_searched: bool,
}

impl SearchSnapshot {
    /// Text currently in the search box.
    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    /// Query of the most recently issued fetch.
    pub fn stable_query(&self) -> Option<&str> {
        self.stable_query.as_deref()
    }

    /// Users returned by the latest committed fetch.
    pub fn all_users(&self) -> &[UserSummary] {
        &self.all_users
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn is_favorites_only(&self) -> bool {
        self.favorites_only
    }

    /// `all_users`, filtered by favorites when favorites-only is on.
    pub fn displayed_users(&self) -> &[UserSummary] {
        &self.displayed_users
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn has_searched(&self) -> bool {
        self.has_searched
    }

    pub fn display_state(&self) -> DisplayState {
        DisplayState::evaluate(
            self.has_searched,
            self.is_loading,
            self.error_message.is_some(),
            self.displayed_users.is_empty(),
        )
    }

    fn recompute(&mut self) {
        self.displayed_users = project(&self.all_users, &self.favorites, self.favorites_only);
    }

    fn begin_fetch(&mut self, query: &str) {
        self.stable_query = Some(query.to_string());
        self.is_loading = true;
        self.error_message = None;
        self.has_searched = true;
    }

    fn finish_fetch(&mut self, result: Result<Vec<UserSummary>, NetworkError>) {
        match result {
            Ok(users) => {
                self.all_users = users;
            }
            Err(e) => {
                self.all_users = Vec::new();
                self.error_message = Some(format!("Error: {e}"));
            }
        }
        self.is_loading = false;
        self.recompute();
    }

    fn toggle_favorite(&mut self, user: &UserSummary) {
        self.favorites.toggle(user);
        self.recompute();
    }

    fn set_favorites_only(&mut self, enabled: bool) {
        self.favorites_only = enabled;
        self.recompute();
    }
}

enum Command {
    SetQuery(String),
    SearchNow(String),
    Retry,
    ToggleFavorite(UserSummary),
    SetFavoritesOnly(bool),
    FetchCompleted {
        seq: u64,
        query: String,
        result: Result<Vec<UserSummary>, NetworkError>,
    },
    Snapshot(oneshot::Sender<SearchSnapshot>),
}

/// Handle to a running search pipeline.
///
/// Cloning the handle shares the same pipeline. The actor task stops once
/// every handle is dropped and no fetch is in flight.
///
/// # Example
///
/// ```ignore
/// let pipeline = SearchPipeline::spawn(client);
/// let mut updates = pipeline.subscribe();
///
/// pipeline.set_query("octo");
/// updates.changed().await?;
/// println!("{:?}", updates.borrow().display_state());
/// ```
#[derive(Clone)]
pub struct SearchPipeline {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<SearchSnapshot>,
}

impl SearchPipeline {
    /// Spawn a pipeline with default options. Must be called within a tokio runtime.
    pub fn spawn(client: GitHubClient) -> Self {
        Self::spawn_with(client, SearchOptions::default())
    }

    pub fn spawn_with(client: GitHubClient, options: SearchOptions) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (publisher, state) = watch::channel(SearchSnapshot::default());

        let actor = PipelineActor {
            client,
            debouncer: Debouncer::new(options.debounce),
            state: SearchSnapshot::default(),
            issued: 0,
            publisher,
            commands: tx.downgrade(),
        };
        tokio::spawn(actor.run(rx));

        Self {
            commands: tx,
            state,
        }
    }

    /// Replace the search box text. Called on every keystroke.
    pub fn set_query(&self, text: impl Into<String>) {
        self.send(Command::SetQuery(text.into()));
    }

    /// Empty the search box. Existing results stay on screen.
    pub fn clear_query(&self) {
        self.set_query(String::new());
    }

    /// Fetch `query` right away, bypassing the debouncer. Empty queries are ignored.
    pub fn search_now(&self, query: impl Into<String>) {
        self.send(Command::SearchNow(query.into()));
    }

    /// Re-issue the most recent query. Does nothing before the first search.
    pub fn retry(&self) {
        self.send(Command::Retry);
    }

    pub fn toggle_favorite(&self, user: &UserSummary) {
        self.send(Command::ToggleFavorite(user.clone()));
    }

    pub fn set_favorites_only(&self, enabled: bool) {
        self.send(Command::SetFavoritesOnly(enabled));
    }

    /// Last published state. May lag commands that were just sent.
    pub fn snapshot(&self) -> SearchSnapshot {
        self.state.borrow().clone()
    }

    /// State after every command sent so far from this handle has been applied.
    pub async fn current(&self) -> SearchSnapshot {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx));
        match rx.await {
            Ok(snapshot) => snapshot,
            Err(_) => self.snapshot(),
        }
    }

    /// Receiver notified on every published change.
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.state.clone()
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::warn!("Search pipeline is not running; command dropped");
        }
    }
}

struct PipelineActor {
    client: GitHubClient,
    debouncer: Debouncer,
    state: SearchSnapshot,
    /// Sequence number of the most recently issued fetch.
    issued: u64,
    publisher: watch::Sender<SearchSnapshot>,
    commands: mpsc::WeakUnboundedSender<Command>,
}

impl PipelineActor {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        tracing::debug!(
            debounce_ms = self.debouncer.quiet_period().as_millis(),
            "Search pipeline started"
        );

        loop {
            let deadline = self.debouncer.deadline();

            tokio::select! {
                biased;

                command = rx.recv() => {
                    match command {
                        Some(command) => self.handle(command),
                        None => break,
                    }
                }

                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some(query) = self.debouncer.fire(Instant::now()) {
                        self.start_fetch(query);
                    }
                }
            }

            self.publish();
        }

        tracing::debug!(issued = self.issued, "Search pipeline stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::SetQuery(text) => {
                self.debouncer.input(text.clone(), Instant::now());
                self.state.raw_query = text;
            }
            Command::SearchNow(query) => {
                if !query.is_empty() {
                    self.start_fetch(query);
                }
            }
            Command::Retry => match self.state.stable_query.clone() {
                Some(query) => self.start_fetch(query),
                None => tracing::debug!("Retry requested before any search"),
            },
            Command::ToggleFavorite(user) => {
                self.state.toggle_favorite(&user);
            }
            Command::SetFavoritesOnly(enabled) => {
                self.state.set_favorites_only(enabled);
            }
            Command::FetchCompleted { seq, query, result } => {
                if seq != self.issued {
                    tracing::debug!(
                        seq,
                        latest = self.issued,
                        query = %query,
                        "Discarding stale search response"
                    );
                    return;
                }
                match &result {
                    Ok(users) => tracing::info!(seq, query = %query, count = users.len(), "Search results"),
                    Err(e) => tracing::info!(seq, query = %query, error = %e, "Search failed"),
                }
                self.state.finish_fetch(result);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.state.clone());
            }
        }
    }

    fn start_fetch(&mut self, query: String) {
        let Some(commands) = self.commands.upgrade() else {
            return;
        };

        self.issued += 1;
        let seq = self.issued;
        self.debouncer.record(&query);
        self.state.begin_fetch(&query);
        tracing::debug!(seq, query = %query, "Issuing search");

        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client.search_users(&query).await;
            let _ = commands.send(Command::FetchCompleted { seq, query, result });
        });
    }

    fn publish(&self) {
        self.publisher.send_if_modified(|current| {
            if *current == self.state {
                false
            } else {
                *current = self.state.clone();
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::http::{MockTransport, json_response};

    const HOST: &str = "https://api.test";

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn search_url(q: &str) -> String {
        format!("{HOST}/search/users?q={q}")
    }

    fn user(id: u64, login: &str) -> UserSummary {
        UserSummary {
            id,
            login: login.to_string(),
            avatar_url: format!("https://avatars.test/u/{id}"),
            html_url: format!("https://github.com/{login}"),
        }
    }

    fn results(users: &[UserSummary]) -> crate::http::HttpResponse {
        json_response(
            200,
            &json!({
                "total_count": users.len(),
                "items": users,
            }),
        )
    }

    fn pipeline(transport: &MockTransport) -> SearchPipeline {
        let client =
            GitHubClient::new_with_transport(HOST, "ghsearch-tests", Arc::new(transport.clone()));
        SearchPipeline::spawn(client)
    }

    async fn wait_until(
        pipeline: &SearchPipeline,
        pred: impl FnMut(&SearchSnapshot) -> bool,
    ) -> SearchSnapshot {
        let mut rx = pipeline.subscribe();
        let snapshot = tokio::time::timeout(Duration::from_secs(60), rx.wait_for(pred))
            .await
            .expect("pipeline did not reach expected state")
            .expect("pipeline stopped")
            .clone();
        snapshot
    }

    fn assert_projection_consistent(s: &SearchSnapshot) {
        assert_eq!(
            s.displayed_users(),
            project(s.all_users(), s.favorites(), s.is_favorites_only()).as_slice()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_query_fetches_once_and_shows_results() {
        let transport = MockTransport::new();
        transport.push_response(search_url("octo"), results(&[user(1, "octocat")]));
        let p = pipeline(&transport);

        p.set_query("octo");
        tokio::time::sleep(ms(499)).await;
        let early = p.current().await;
        assert_eq!(early.display_state(), DisplayState::NotYetSearched);
        assert_eq!(early.raw_query(), "octo");
        assert!(transport.requests().is_empty());

        let s = wait_until(&p, |s| s.display_state() == DisplayState::Results).await;
        assert_eq!(s.displayed_users().len(), 1);
        assert_eq!(s.displayed_users()[0].login, "octocat");
        assert_eq!(s.stable_query(), Some("octo"));
        assert!(!s.is_loading());
        assert_eq!(transport.requested_urls(), vec![search_url("octo")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_query_never_fetches() {
        let transport = MockTransport::new();
        let p = pipeline(&transport);

        p.set_query("");
        tokio::time::sleep(Duration::from_secs(5)).await;

        let s = p.current().await;
        assert_eq!(s.display_state(), DisplayState::NotYetSearched);
        assert!(!s.has_searched());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_burst_resets_debounce_and_fetches_final_value() {
        let transport = MockTransport::new();
        transport.push_response(search_url("octo"), results(&[user(1, "octocat")]));
        let p = pipeline(&transport);

        for prefix in ["o", "oc", "oct", "octo"] {
            p.set_query(prefix);
            tokio::time::sleep(ms(200)).await;
        }
        tokio::time::sleep(Duration::from_secs(2)).await;

        let s = p.current().await;
        assert_eq!(s.display_state(), DisplayState::Results);
        assert_eq!(transport.requested_urls(), vec![search_url("octo")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_state_while_fetch_in_flight() {
        let transport = MockTransport::new();
        transport.push_delayed_response(
            search_url("slow"),
            results(&[user(1, "slowpoke")]),
            Duration::from_secs(2),
        );
        let p = pipeline(&transport);

        p.set_query("slow");
        tokio::time::sleep(ms(600)).await;

        let s = p.current().await;
        assert!(s.is_loading());
        assert!(s.has_searched());
        assert_eq!(s.error_message(), None);
        assert_eq!(s.display_state(), DisplayState::Loading);

        let s = wait_until(&p, |s| !s.is_loading()).await;
        assert_eq!(s.display_state(), DisplayState::Results);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_search_fails_with_message_and_clears_users() {
        let transport = MockTransport::new();
        transport.push_response(search_url("octo"), results(&[user(1, "octocat")]));
        transport.push_response(
            search_url("hub"),
            json_response(403, &json!({"message": "API rate limit exceeded"})),
        );
        let p = pipeline(&transport);

        p.set_query("octo");
        wait_until(&p, |s| s.display_state() == DisplayState::Results).await;

        p.set_query("hub");
        let s = wait_until(&p, |s| s.display_state() == DisplayState::Failed).await;
        assert_eq!(
            s.error_message(),
            Some("Error: GitHub API rate limit exceeded. Please try again later.")
        );
        assert!(s.all_users().is_empty());
        assert!(s.displayed_users().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_result_state() {
        let transport = MockTransport::new();
        transport.push_response(search_url("zzzz"), results(&[]));
        let p = pipeline(&transport);

        p.set_query("zzzz");
        let s = wait_until(&p, |s| s.has_searched() && !s.is_loading()).await;
        assert_eq!(s.display_state(), DisplayState::EmptyResult);
    }

    #[tokio::test(start_paused = true)]
    async fn test_favorites_only_view_filters_without_refetching() {
        let transport = MockTransport::new();
        let all = vec![user(1, "a"), user(2, "b"), user(3, "c")];
        transport.push_response(search_url("x"), results(&all));
        let p = pipeline(&transport);

        p.set_query("x");
        wait_until(&p, |s| s.display_state() == DisplayState::Results).await;

        p.toggle_favorite(&all[1]);
        p.set_favorites_only(true);
        let s = p.current().await;
        assert_eq!(s.displayed_users(), &all[1..2]);
        assert_eq!(s.display_state(), DisplayState::Results);

        p.set_favorites_only(false);
        let s = p.current().await;
        assert_eq!(s.displayed_users(), all.as_slice());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_favorites_only_with_no_favorites_is_empty_result() {
        let transport = MockTransport::new();
        transport.push_response(search_url("x"), results(&[user(1, "a")]));
        let p = pipeline(&transport);

        p.set_query("x");
        wait_until(&p, |s| s.display_state() == DisplayState::Results).await;
        p.set_favorites_only(true);

        let s = p.current().await;
        assert_eq!(s.display_state(), DisplayState::EmptyResult);
        assert_eq!(s.all_users().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_favorites_survive_new_searches() {
        let transport = MockTransport::new();
        transport.push_response(search_url("first"), results(&[user(1, "a"), user(2, "b")]));
        transport.push_response(search_url("second"), results(&[user(2, "b"), user(4, "d")]));
        let p = pipeline(&transport);

        p.set_query("first");
        wait_until(&p, |s| s.display_state() == DisplayState::Results).await;
        p.toggle_favorite(&user(2, "b"));
        p.set_favorites_only(true);

        p.set_query("second");
        let s = wait_until(&p, |s| s.stable_query() == Some("second") && !s.is_loading()).await;
        let ids: Vec<u64> = s.displayed_users().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![2]);
        assert!(s.favorites().contains_id(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_from_older_query_is_discarded() {
        let transport = MockTransport::new();
        let r1 = vec![user(1, "a-user")];
        let r2 = vec![user(2, "ab-user")];
        transport.push_delayed_response(search_url("a"), results(&r1), Duration::from_secs(3));
        transport.push_delayed_response(search_url("ab"), results(&r2), ms(10));
        let p = pipeline(&transport);

        p.set_query("a");
        tokio::time::sleep(ms(600)).await;
        p.set_query("ab");

        // "ab" settles at ~1100ms and resolves at ~1110ms.
        let s = wait_until(&p, |s| s.stable_query() == Some("ab") && !s.is_loading()).await;
        assert_eq!(s.all_users(), r2.as_slice());

        // "a" resolves at ~3500ms and must not win.
        tokio::time::sleep(Duration::from_secs(5)).await;
        let s = p.current().await;
        assert_eq!(s.all_users(), r2.as_slice());
        assert_eq!(s.display_state(), DisplayState::Results);
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_failure_from_older_query_is_discarded() {
        let transport = MockTransport::new();
        transport.push_delayed_response(
            search_url("a"),
            json_response(500, &json!({})),
            Duration::from_secs(3),
        );
        transport.push_response(search_url("ab"), results(&[user(2, "ab-user")]));
        let p = pipeline(&transport);

        p.set_query("a");
        tokio::time::sleep(ms(600)).await;
        p.set_query("ab");
        tokio::time::sleep(Duration::from_secs(5)).await;

        let s = p.current().await;
        assert_eq!(s.error_message(), None);
        assert_eq!(s.display_state(), DisplayState::Results);
    }

    #[tokio::test(start_paused = true)]
    async fn test_older_response_arriving_first_keeps_loading() {
        let transport = MockTransport::new();
        transport.push_response(search_url("a"), results(&[user(1, "a")]));
        transport.push_delayed_response(
            search_url("ab"),
            results(&[user(2, "b")]),
            Duration::from_secs(1),
        );
        let p = pipeline(&transport);

        p.search_now("a");
        p.search_now("ab");
        tokio::time::sleep(ms(500)).await;

        let s = p.current().await;
        assert!(s.is_loading());
        assert!(s.all_users().is_empty());
        assert_eq!(s.display_state(), DisplayState::Loading);

        let s = wait_until(&p, |s| !s.is_loading()).await;
        let ids: Vec<u64> = s.all_users().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_settled_query_does_not_refetch() {
        let transport = MockTransport::new();
        transport.push_response(search_url("octo"), results(&[user(1, "octocat")]));
        let p = pipeline(&transport);

        p.set_query("octo");
        wait_until(&p, |s| s.display_state() == DisplayState::Results).await;

        p.set_query("octox");
        tokio::time::sleep(ms(200)).await;
        p.set_query("octo");
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_query_keeps_results_and_does_not_fetch() {
        let transport = MockTransport::new();
        transport.push_response(search_url("octo"), results(&[user(1, "octocat")]));
        let p = pipeline(&transport);

        p.set_query("octo");
        wait_until(&p, |s| s.display_state() == DisplayState::Results).await;

        p.clear_query();
        tokio::time::sleep(Duration::from_secs(2)).await;

        let s = p.current().await;
        assert_eq!(s.raw_query(), "");
        assert_eq!(s.display_state(), DisplayState::Results);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_now_skips_debounce_and_ignores_empty() {
        let transport = MockTransport::new();
        transport.push_response(search_url("octo"), results(&[user(1, "octocat")]));
        let p = pipeline(&transport);

        p.search_now("");
        let s = p.current().await;
        assert!(!s.has_searched());

        p.search_now("octo");
        let s = p.current().await;
        assert!(s.is_loading());
        let s = wait_until(&p, |s| !s.is_loading()).await;
        assert_eq!(s.display_state(), DisplayState::Results);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typed_query_after_search_now_is_compared_with_issued_query() {
        let transport = MockTransport::new();
        transport.push_response(search_url("octo"), results(&[user(1, "octocat")]));
        transport.push_response(search_url("rust"), results(&[user(2, "rustacean")]));
        transport.push_response(search_url("octo"), results(&[user(3, "octodog")]));
        let p = pipeline(&transport);

        p.set_query("octo");
        wait_until(&p, |s| s.display_state() == DisplayState::Results).await;

        p.search_now("rust");
        wait_until(&p, |s| {
            s.stable_query() == Some("rust") && s.display_state() == DisplayState::Results
        })
        .await;

        p.set_query("rust");
        tokio::time::sleep(ms(200)).await;
        p.set_query("octo");
        tokio::time::sleep(Duration::from_secs(3)).await;

        let s = wait_until(&p, |s| !s.is_loading()).await;
        assert_eq!(s.raw_query(), "octo");
        assert_eq!(s.stable_query(), Some("octo"));
        let ids: Vec<u64> = s.all_users().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![3]);
        assert_eq!(
            transport.requested_urls(),
            vec![search_url("octo"), search_url("rust"), search_url("octo")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_reissues_last_query() {
        let transport = MockTransport::new();
        transport.push_response(search_url("octo"), json_response(500, &json!({})));
        transport.push_response(search_url("octo"), results(&[user(1, "octocat")]));
        let p = pipeline(&transport);

        p.set_query("octo");
        let s = wait_until(&p, |s| s.display_state() == DisplayState::Failed).await;
        assert_eq!(s.error_message(), Some("Error: HTTP error: 500"));

        p.retry();
        let s = wait_until(&p, |s| s.display_state() == DisplayState::Results).await;
        assert_eq!(s.displayed_users().len(), 1);
        assert_eq!(
            transport.requested_urls(),
            vec![search_url("octo"), search_url("octo")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_before_first_search_is_noop() {
        let transport = MockTransport::new();
        let p = pipeline(&transport);

        p.retry();
        let s = p.current().await;
        assert_eq!(s.display_state(), DisplayState::NotYetSearched);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_projection_matches_sources_after_every_operation() {
        let transport = MockTransport::new();
        let first = vec![user(1, "a"), user(2, "b"), user(3, "c")];
        let second = vec![user(3, "c"), user(1, "a")];
        transport.push_response(search_url("one"), results(&first));
        transport.push_response(search_url("two"), results(&second));
        let p = pipeline(&transport);

        p.set_query("one");
        let s = wait_until(&p, |s| s.display_state() == DisplayState::Results).await;
        assert_projection_consistent(&s);

        let ops: Vec<Box<dyn Fn(&SearchPipeline)>> = vec![
            Box::new(|p: &SearchPipeline| p.toggle_favorite(&user(3, "c"))),
            Box::new(|p: &SearchPipeline| p.set_favorites_only(true)),
            Box::new(|p: &SearchPipeline| p.toggle_favorite(&user(1, "a"))),
            Box::new(|p: &SearchPipeline| p.toggle_favorite(&user(3, "c"))),
            Box::new(|p: &SearchPipeline| p.set_favorites_only(false)),
            Box::new(|p: &SearchPipeline| p.set_favorites_only(true)),
            Box::new(|p: &SearchPipeline| p.toggle_favorite(&user(2, "b"))),
        ];
        for op in &ops {
            op(&p);
            let s = p.current().await;
            assert_projection_consistent(&s);
        }

        p.set_query("two");
        let s = wait_until(&p, |s| s.stable_query() == Some("two") && !s.is_loading()).await;
        assert_projection_consistent(&s);
        let ids: Vec<u64> = s.displayed_users().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_never_observe_stale_projection() {
        let transport = MockTransport::new();
        let all = vec![user(1, "a"), user(2, "b")];
        transport.push_response(search_url("x"), results(&all));
        let p = pipeline(&transport);
        let mut rx = p.subscribe();

        p.set_query("x");
        p.toggle_favorite(&all[0]);
        p.set_favorites_only(true);
        p.toggle_favorite(&all[1]);

        let checker = tokio::spawn(async move {
            let mut seen = 0;
            while rx.changed().await.is_ok() {
                let s = rx.borrow_and_update().clone();
                assert_projection_consistent(&s);
                seen += 1;
                if s.display_state() == DisplayState::Results && s.displayed_users().len() == 2 {
                    break;
                }
            }
            seen
        });

        let seen = tokio::time::timeout(Duration::from_secs(30), checker)
            .await
            .expect("checker timed out")
            .expect("checker panicked");
        assert!(seen > 0);
    }
}
