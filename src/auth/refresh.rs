//! Single-flight token refresh.
//!
//! Any number of tasks may ask for a fresh access token at once. The first
//! one to arrive (the driver) makes the remote call; everyone who shows up
//! while it is running is queued and receives the driver's outcome, so one
//! expiry costs exactly one `/auth/refresh` request.
//!
//! The state lock is only ever held between suspension points, never across
//! an `.await`.
//!
//! Logging in and logging out go through [`RefreshCoordinator::supersede`],
//! which bumps a session generation. A refresh that started under an older
//! generation throws its tokens away instead of writing them over the
//! newer session.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::api::AuthApi;
use super::credentials::Credentials;
use crate::error::{AuthError, AuthResult};
use crate::traits::{CredentialStore, HttpError};

type Waiter = oneshot::Sender<AuthResult<String>>;

/// Invariant: `waiters` is empty whenever `in_flight` is false.
#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    waiters: VecDeque<Waiter>,
}

enum Role {
    Driver,
    Waiter(oneshot::Receiver<AuthResult<String>>),
}

/// Collapses concurrent refresh demand into one remote call.
///
/// # Example
///
/// ```ignore
/// let coordinator = RefreshCoordinator::new(store, api, None);
///
/// // Both calls share one POST /auth/refresh and get the same token.
/// let (a, b) = tokio::join!(coordinator.refresh(), coordinator.refresh());
/// assert_eq!(a?, b?);
/// ```
pub struct RefreshCoordinator {
    store: Arc<dyn CredentialStore>,
    api: AuthApi,
    refresh_timeout: Option<Duration>,
    state: Mutex<RefreshState>,
    /// Bumped every time the stored session is ended or replaced.
    generation: Mutex<u64>,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refresh_timeout", &self.refresh_timeout)
            .field("in_flight", &self.in_flight())
            .field("waiters", &self.waiter_count())
            .finish_non_exhaustive()
    }
}

impl RefreshCoordinator {
    /// Create a coordinator.
    ///
    /// `refresh_timeout` bounds the remote call; `None` lets it run as long
    /// as the transport allows.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        api: AuthApi,
        refresh_timeout: Option<Duration>,
    ) -> Self {
        Self {
            store,
            api,
            refresh_timeout,
            state: Mutex::new(RefreshState::default()),
            generation: Mutex::new(0),
        }
    }

    /// Whether a refresh is currently running.
    pub fn in_flight(&self) -> bool {
        self.lock_state().in_flight
    }

    /// Number of callers queued behind the running refresh.
    pub fn waiter_count(&self) -> usize {
        self.lock_state().waiters.len()
    }

    /// Obtain a new access token, sharing any refresh already in flight.
    ///
    /// On success the new token pair has been written to the store before
    /// this returns. Every caller that joined the same cycle gets the same
    /// result, success or error.
    pub async fn refresh(&self) -> AuthResult<String> {
        let role = {
            let mut state = self.lock_state();
            if state.in_flight {
                let (tx, rx) = oneshot::channel();
                state.waiters.push_back(tx);
                Role::Waiter(rx)
            } else {
                state.in_flight = true;
                Role::Driver
            }
        };

        match role {
            Role::Waiter(rx) => {
                debug!("Refresh already in flight, waiting for its outcome");
                rx.await.unwrap_or(Err(AuthError::RefreshInterrupted))
            }
            Role::Driver => {
                let mut guard = InFlightGuard {
                    coordinator: self,
                    settled: false,
                };
                let outcome = self.run().await;
                guard.settle(outcome.clone());
                outcome
            }
        }
    }

    /// Run `write`, which ends or replaces the stored session, and make any
    /// refresh already in flight discard its result.
    ///
    /// A refresh that settles afterwards fails with
    /// [`AuthError::SessionSuperseded`] and leaves the store alone.
    pub fn supersede<T>(&self, write: impl FnOnce() -> T) -> T {
        let mut generation = self.lock_generation();
        *generation += 1;
        write()
    }

    /// The driver's half: read the refresh token, call the server, persist.
    async fn run(&self) -> AuthResult<String> {
        let started_in = *self.lock_generation();
        let refresh_token = self
            .store
            .refresh_token()?
            .ok_or(AuthError::NoRefreshToken)?;

        debug!("Refreshing access token");
        let call = self.api.refresh(&refresh_token);
        let pair = match self.refresh_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                AuthError::Transport(HttpError::Timeout(format!(
                    "token refresh did not complete within {:?}",
                    limit
                )))
            })??,
            None => call.await?,
        };

        let credentials = Credentials::from(pair);
        {
            let generation = self.lock_generation();
            if *generation != started_in {
                info!("Session changed during refresh, discarding renewed tokens");
                return Err(AuthError::SessionSuperseded);
            }
            self.store.save(&credentials)?;
        }
        Ok(credentials.access_token)
    }

    /// End the cycle and hand `outcome` to every waiter, oldest first.
    fn finish(&self, outcome: AuthResult<String>) {
        let waiters = {
            let mut state = self.lock_state();
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };

        match &outcome {
            Ok(_) => info!(waiters = waiters.len(), "Token refresh succeeded"),
            Err(AuthError::RefreshInterrupted) => {
                warn!(waiters = waiters.len(), "Token refresh abandoned")
            }
            Err(e) => warn!(waiters = waiters.len(), error = %e, "Token refresh failed"),
        }

        for waiter in waiters {
            // a waiter that gave up has dropped its receiver
            let _ = waiter.send(outcome.clone());
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_generation(&self) -> MutexGuard<'_, u64> {
        self.generation.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Clears the in-flight state even if the driver future is dropped.
struct InFlightGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl InFlightGuard<'_> {
    fn settle(&mut self, outcome: AuthResult<String>) {
        self.settled = true;
        self.coordinator.finish(outcome);
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.coordinator.finish(Err(AuthError::RefreshInterrupted));
        }
    }
}
