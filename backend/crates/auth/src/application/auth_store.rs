//! Client Auth Store
//!
//! Single owned source of truth for "who is the current user" inside one
//! mounted client. Guards and display code read snapshots from it; only
//! [`AuthStore::init`], [`AuthStore::login`], [`AuthStore::logout`] and
//! [`AuthStore::dispose`] change it.
//!
//! Every transition bumps a generation counter. The identity check spawned
//! by `init` applies its answer only if the generation it started under is
//! still current, so an answer arriving after `dispose`, `login` or
//! `logout` is dropped instead of overwriting newer state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::entity::auth_state::{AuthPhase, AuthState};
use crate::domain::entity::user::UserSummary;
use crate::domain::repository::IdentityCheck;

#[derive(Default)]
struct Lifecycle {
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

impl Lifecycle {
    /// Invalidate whatever is in flight.
    fn advance(&mut self) -> u64 {
        self.generation += 1;
        if let Some(task) = self.pending.take() {
            task.abort();
        }
        self.generation
    }
}

pub struct AuthStore<C>
where
    C: IdentityCheck + Send + Sync + 'static,
{
    identity: Arc<C>,
    phase: watch::Sender<AuthPhase>,
    lifecycle: Mutex<Lifecycle>,
}

impl<C> AuthStore<C>
where
    C: IdentityCheck + Send + Sync + 'static,
{
    pub fn new(identity: Arc<C>) -> Arc<Self> {
        let (phase, _) = watch::channel(AuthPhase::Uninitialized);
        Arc::new(Self {
            identity,
            phase,
            lifecycle: Mutex::new(Lifecycle::default()),
        })
    }

    /// Start the identity check. Must run inside a Tokio runtime.
    ///
    /// Only an `Uninitialized` store starts a check; calls in any other
    /// phase are no-ops and return `false`.
    pub fn init(self: &Arc<Self>) -> bool {
        let mut lifecycle = self.lock();

        if *self.phase.borrow() != AuthPhase::Uninitialized {
            tracing::trace!("Auth store already initialized, ignoring init");
            return false;
        }

        let generation = lifecycle.advance();
        self.phase.send_replace(AuthPhase::Loading);

        let store = Arc::downgrade(self);
        let identity = self.identity.clone();
        lifecycle.pending = Some(tokio::spawn(async move {
            let phase = match identity.current_user().await {
                Ok(Some(user)) => AuthPhase::Authenticated(user),
                Ok(None) => AuthPhase::Anonymous,
                Err(e) => {
                    tracing::debug!(error = %e, "Identity check failed, treating as anonymous");
                    AuthPhase::Anonymous
                }
            };
            Self::settle(&store, generation, phase);
        }));

        true
    }

    fn settle(store: &Weak<Self>, generation: u64, phase: AuthPhase) {
        let Some(store) = store.upgrade() else {
            return;
        };
        let mut lifecycle = store.lock();

        if lifecycle.generation != generation {
            tracing::debug!("Discarding stale identity check result");
            return;
        }

        lifecycle.pending = None;
        store.phase.send_replace(phase);
    }

    /// Record a successful login.
    pub fn login(&self, user: UserSummary) {
        let mut lifecycle = self.lock();
        lifecycle.advance();
        tracing::debug!(user_id = %user.id, role = %user.role, "Auth store: signed in");
        self.phase.send_replace(AuthPhase::Authenticated(user));
    }

    /// Record a logout.
    pub fn logout(&self) {
        let mut lifecycle = self.lock();
        lifecycle.advance();
        self.phase.send_replace(AuthPhase::Anonymous);
    }

    /// Tear down on unmount: cancel any check in flight and return to
    /// `Uninitialized`, so a later mount can `init` again.
    pub fn dispose(&self) {
        let mut lifecycle = self.lock();
        lifecycle.advance();
        self.phase.send_replace(AuthPhase::Uninitialized);
    }

    pub fn phase(&self) -> AuthPhase {
        self.phase.borrow().clone()
    }

    pub fn state(&self) -> AuthState {
        AuthState::from(&*self.phase.borrow())
    }

    /// Watch phase changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthPhase> {
        self.phase.subscribe()
    }

    /// Wait until the phase is neither `Uninitialized` nor `Loading`.
    ///
    /// Never returns if nobody calls `init`, `login` or `logout`.
    pub async fn settled(&self) -> AuthState {
        let mut rx = self.phase.subscribe();
        match rx.wait_for(|phase| !phase.is_pending()).await {
            Ok(phase) => AuthState::from(&*phase),
            // The sender lives in `self`, so this only happens mid-drop.
            Err(_) => self.state(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C> Drop for AuthStore<C>
where
    C: IdentityCheck + Send + Sync + 'static,
{
    fn drop(&mut self) {
        let lifecycle = self
            .lifecycle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = lifecycle.pending.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_role::UserRole;
    use crate::error::IdentityError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[derive(Clone, Copy)]
    enum Answer {
        User(UserRole),
        Nobody,
        Fail,
    }

    struct ScriptedIdentity {
        answer: Answer,
        release: Notify,
        calls: AtomicUsize,
    }

    impl ScriptedIdentity {
        fn new(answer: Answer) -> Arc<Self> {
            Arc::new(Self {
                answer,
                release: Notify::new(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl IdentityCheck for ScriptedIdentity {
        async fn current_user(&self) -> Result<Option<UserSummary>, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            match self.answer {
                Answer::User(role) => Ok(Some(user(role))),
                Answer::Nobody => Ok(None),
                Answer::Fail => Err(IdentityError::Status(503)),
            }
        }
    }

    fn user(role: UserRole) -> UserSummary {
        UserSummary {
            id: "u-1".to_string(),
            email: "ana@example.com".to_string(),
            display_name: Some("Ana".to_string()),
            role,
        }
    }

    async fn let_tasks_run() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_init_loads_then_authenticates() {
        let identity = ScriptedIdentity::new(Answer::User(UserRole::Admin));
        let store = AuthStore::new(identity.clone());

        assert!(store.state().is_loading);
        assert!(store.init());
        assert_eq!(store.phase(), AuthPhase::Loading);
        assert_eq!(store.state(), AuthState::loading());

        identity.release.notify_one();
        let state = store.settled().await;

        assert_eq!(state, AuthState::authenticated(user(UserRole::Admin)));
    }

    #[tokio::test]
    async fn test_init_is_idempotent_while_loading() {
        let identity = ScriptedIdentity::new(Answer::Nobody);
        let store = AuthStore::new(identity.clone());

        assert!(store.init());
        assert!(!store.init());
        assert!(!store.init());
        let_tasks_run().await;

        identity.release.notify_one();
        assert_eq!(store.settled().await, AuthState::anonymous());
        assert!(!store.init());
        assert_eq!(identity.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_identity_failure_settles_anonymous() {
        let identity = ScriptedIdentity::new(Answer::Fail);
        let store = AuthStore::new(identity.clone());

        store.init();
        identity.release.notify_one();

        let state = store.settled().await;
        assert_eq!(state.user, None);
        assert!(!state.is_authenticated);
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_dispose_discards_in_flight_result() {
        let identity = ScriptedIdentity::new(Answer::User(UserRole::User));
        let store = AuthStore::new(identity.clone());

        store.init();
        let_tasks_run().await;
        store.dispose();

        identity.release.notify_one();
        let_tasks_run().await;

        assert_eq!(store.phase(), AuthPhase::Uninitialized);
    }

    #[tokio::test]
    async fn test_remount_runs_a_fresh_check() {
        let identity = ScriptedIdentity::new(Answer::User(UserRole::User));
        let store = AuthStore::new(identity.clone());

        store.init();
        let_tasks_run().await;
        store.dispose();

        assert!(store.init());
        let_tasks_run().await;
        identity.release.notify_one();

        assert!(store.settled().await.is_authenticated);
        assert_eq!(identity.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_logout_wins_over_late_identity_answer() {
        let identity = ScriptedIdentity::new(Answer::User(UserRole::Admin));
        let store = AuthStore::new(identity.clone());

        store.init();
        let_tasks_run().await;
        store.logout();

        identity.release.notify_one();
        let_tasks_run().await;

        assert_eq!(store.state(), AuthState::anonymous());
    }

    #[tokio::test]
    async fn test_login_and_subscribe() {
        let identity = ScriptedIdentity::new(Answer::Nobody);
        let store = AuthStore::new(identity);
        let mut rx = store.subscribe();

        store.login(user(UserRole::User));

        assert!(rx.has_changed().unwrap());
        let phase = rx.borrow_and_update().clone();
        assert_eq!(phase, AuthPhase::Authenticated(user(UserRole::User)));
        assert_eq!(store.state().role(), Some(UserRole::User));
    }
}
