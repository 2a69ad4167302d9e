//! Profile loader: a user's detail and repositories, loaded independently.
//!
//! The two fields have separate loading/error state and separate retries.
//! Detail failures report the specific [`NetworkError`](crate::NetworkError) message; repository
//! failures always report [`REPOSITORIES_ERROR_MESSAGE`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::github::{GitHubClient, Repository, UserDetail};

/// Message shown for any repository-list failure, whatever the cause.
pub const REPOSITORIES_ERROR_MESSAGE: &str = "Failed to load repositories";

/// Loading/error/data triple for one independently fetched field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadState<T> {
    pub is_loading: bool,
    pub error: Option<String>,
    pub data: T,
}

/// Everything the profile screen renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSnapshot {
    pub username: String,
    pub detail: LoadState<Option<UserDetail>>,
    pub repositories: LoadState<Vec<Repository>>,
}

/// Loads one user's profile.
///
/// State lives behind a `watch` channel; every write goes through
/// `send_modify`/`send_if_modified`, which serializes them. Each field keeps
/// its own request counter so only its latest load can commit.
#[derive(Clone)]
pub struct ProfileLoader {
    client: GitHubClient,
    username: Arc<str>,
    state: Arc<watch::Sender<ProfileSnapshot>>,
    detail_seq: Arc<AtomicU64>,
    repos_seq: Arc<AtomicU64>,
}

impl ProfileLoader {
    pub fn new(client: GitHubClient, username: impl Into<String>) -> Self {
        let username: String = username.into();
        let (state, _) = watch::channel(ProfileSnapshot {
            username: username.clone(),
            ..ProfileSnapshot::default()
        });
        Self {
            client,
            username: username.into(),
            state: Arc::new(state),
            detail_seq: Arc::new(AtomicU64::new(0)),
            repos_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Start both loads. They do not wait for each other.
    pub fn load_all(&self) -> (JoinHandle<()>, JoinHandle<()>) {
        (self.load_detail(), self.load_repositories())
    }

    /// Load (or retry) the user detail. Must be called within a tokio runtime.
    pub fn load_detail(&self) -> JoinHandle<()> {
        let seq = self.begin(&self.detail_seq, |s| {
            s.detail.is_loading = true;
            s.detail.error = None;
        });

        let this = self.clone();
        tokio::spawn(async move {
            let result = this.client.get_user_detail(&this.username).await;
            if let Err(e) = &result {
                tracing::info!(username = %this.username, error = %e, "Failed to load user detail");
            }
            this.commit(&this.detail_seq, seq, "detail", |s| {
                match result {
                    Ok(detail) => s.detail.data = Some(detail),
                    Err(e) => s.detail.error = Some(e.to_string()),
                }
                s.detail.is_loading = false;
            });
        })
    }

    /// Load (or retry) the repository list. Must be called within a tokio runtime.
    pub fn load_repositories(&self) -> JoinHandle<()> {
        let seq = self.begin(&self.repos_seq, |s| {
            s.repositories.is_loading = true;
            s.repositories.error = None;
        });

        let this = self.clone();
        tokio::spawn(async move {
            let result = this.client.get_user_repositories(&this.username).await;
            if let Err(e) = &result {
                tracing::info!(username = %this.username, error = %e, "Failed to load repositories");
            }
            this.commit(&this.repos_seq, seq, "repositories", |s| {
                match result {
                    Ok(repos) => s.repositories.data = repos,
                    Err(_) => s.repositories.error = Some(REPOSITORIES_ERROR_MESSAGE.to_string()),
                }
                s.repositories.is_loading = false;
            });
        })
    }

    pub fn snapshot(&self) -> ProfileSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProfileSnapshot> {
        self.state.subscribe()
    }

    fn begin(&self, counter: &AtomicU64, mark: impl FnOnce(&mut ProfileSnapshot)) -> u64 {
        let mut seq = 0;
        self.state.send_modify(|s| {
            seq = counter.fetch_add(1, Ordering::SeqCst) + 1;
            mark(s);
        });
        seq
    }

    fn commit(
        &self,
        counter: &AtomicU64,
        seq: u64,
        field: &'static str,
        apply: impl FnOnce(&mut ProfileSnapshot),
    ) {
        self.state.send_if_modified(|s| {
            let latest = counter.load(Ordering::SeqCst);
            if latest != seq {
                tracing::debug!(
                    username = %self.username,
                    field,
                    seq,
                    latest,
                    "Discarding stale profile response"
                );
                return false;
            }
            apply(s);
            true
        });
    }
}
