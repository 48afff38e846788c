//! Session state machine
//!
//! States move `Unknown -> Loading -> {Authenticated, Anonymous}` through
//! [`SessionStore::restore`], then between `Anonymous` and `Authenticated`
//! through [`SessionStore::login`] and [`SessionStore::logout`]. Every
//! transition is published as one [`SessionSnapshot`] replacement, so readers
//! never see an identity without its state or the other way round.

use crate::credentials::{CredentialVerifier, StaticCredentials};
use crate::error::{SessionError, SessionResult};
use crate::storage::KeyValueStore;
use closepulse_core::{
    ActionOutcome, Config, Session, SessionSnapshot, SessionState, config::SessionConfig,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Message returned by a successful login
pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful";

/// Message returned by every accepted password reset request
pub const PASSWORD_RESET_MESSAGE: &str =
    "If an account exists with this email, you will receive password reset instructions.";

/// Shared handle passed to every consumer of the session
pub type SessionHandle = Arc<SessionStore>;

/// Tunables of the session store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Key of the persisted-session slot
    pub storage_key: String,
    /// Simulated login latency
    pub login_delay: Duration,
    /// Simulated password reset latency
    pub forgot_password_delay: Duration,
}

impl SessionSettings {
    /// Settings from configuration
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            storage_key: config.storage_key.clone(),
            login_delay: Duration::from_millis(config.login_delay_ms),
            forgot_password_delay: Duration::from_millis(config.forgot_password_delay_ms),
        }
    }

    /// Default key with no simulated latency
    pub fn immediate() -> Self {
        Self {
            login_delay: Duration::ZERO,
            forgot_password_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

/// Clears the in-flight flag when a login finishes or its future is dropped
struct LoginFlight<'a>(&'a AtomicBool);

impl<'a> LoginFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for LoginFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owner of the current session and its persisted copy
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    verifier: Arc<dyn CredentialVerifier>,
    settings: SessionSettings,
    state: watch::Sender<SessionSnapshot>,
    restore_lock: Mutex<()>,
    login_in_flight: AtomicBool,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("storage", &self.storage.name())
            .field("settings", &self.settings)
            .field("state", &*self.state.borrow())
            .field("login_in_flight", &self.is_pending())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create a store in the `Unknown` state
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        verifier: Arc<dyn CredentialVerifier>,
        settings: SessionSettings,
    ) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            storage,
            verifier,
            settings,
            state,
            restore_lock: Mutex::new(()),
            login_in_flight: AtomicBool::new(false),
        }
    }

    /// Store using the configured demo credential and latencies
    pub fn from_config(config: &Config, storage: Arc<dyn KeyValueStore>) -> Self {
        Self::new(
            storage,
            Arc::new(StaticCredentials::from_config(&config.auth)),
            SessionSettings::from_config(&config.session),
        )
    }

    /// Wrap in a shareable handle
    pub fn into_handle(self) -> SessionHandle {
        Arc::new(self)
    }

    /// Current identity and state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state.borrow().state
    }

    /// Current identity
    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session.clone()
    }

    /// Whether a session is established
    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    /// Whether a login is running; the UI disables its submit control meanwhile
    pub fn is_pending(&self) -> bool {
        self.login_in_flight.load(Ordering::Acquire)
    }

    /// Watch every published transition
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Key of the persisted-session slot
    pub fn storage_key(&self) -> &str {
        &self.settings.storage_key
    }

    fn publish(&self, next: SessionSnapshot) -> SessionSnapshot {
        debug!(state = %next.state, "Session transition");
        self.state.send_replace(next)
    }

    /// Rehydrate the session from the persisted slot
    ///
    /// Only acts from `Unknown`; once settled it returns the current snapshot
    /// without touching storage. A slot that cannot be read or parsed is
    /// removed and the session settles as anonymous.
    #[instrument(skip(self), fields(storage = self.storage.name()))]
    pub async fn restore(&self) -> SessionSnapshot {
        let _restoring = self.restore_lock.lock().await;
        if self.state() != SessionState::Unknown {
            return self.snapshot();
        }

        self.publish(SessionSnapshot {
            session: None,
            state: SessionState::Loading,
        });

        let restored = match self.read_persisted().await {
            Ok(Some(session)) => {
                info!(user_id = %session.id, "Restored persisted session");
                SessionSnapshot::authenticated(session)
            }
            Ok(None) => SessionSnapshot::anonymous(),
            Err(err) => {
                warn!(error = %err, "Discarding unreadable persisted session");
                self.clear_persisted().await;
                SessionSnapshot::anonymous()
            }
        };

        self.publish(restored.clone());
        restored
    }

    async fn read_persisted(&self) -> SessionResult<Option<Session>> {
        let key = self.storage_key();
        let Some(raw) = self.storage.get(key).await? else {
            return Ok(None);
        };
        let session: Session =
            serde_json::from_str(&raw).map_err(|e| SessionError::corrupt(key, e))?;
        session
            .validate()
            .map_err(|e| SessionError::corrupt(key, e))?;
        Ok(Some(session))
    }

    async fn clear_persisted(&self) {
        if let Err(err) = self.storage.remove(self.storage_key()).await {
            warn!(error = %err, "Failed to clear persisted session");
        }
    }

    /// Authenticate and, when `remember` is set, persist the session
    ///
    /// Fails fast with [`SessionError::LoginInProgress`] while another login
    /// runs and with [`SessionError::RestoreInProgress`] while restore runs.
    /// Any failure leaves the previous session untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingCredentials`] for an empty field,
    /// [`SessionError::InvalidCredentials`] on mismatch and
    /// [`SessionError::Unexpected`] when the session cannot be persisted.
    #[instrument(skip(self, email, password))]
    pub async fn try_login(
        &self,
        email: &str,
        password: &str,
        remember: bool,
    ) -> SessionResult<Session> {
        let _flight =
            LoginFlight::acquire(&self.login_in_flight).ok_or(SessionError::LoginInProgress)?;
        let _restoring = self
            .restore_lock
            .try_lock()
            .map_err(|_| SessionError::RestoreInProgress)?;

        simulate_latency(self.settings.login_delay).await;

        if email.is_empty() || password.is_empty() {
            return Err(SessionError::MissingCredentials);
        }
        if !self.verifier.verify(email, password) {
            info!("Login rejected");
            return Err(SessionError::InvalidCredentials);
        }

        let session = self.verifier.session_for(email);
        if remember {
            let serialized = serde_json::to_string(&session)?;
            self.storage
                .set(self.storage_key(), &serialized)
                .await
                .map_err(SessionError::unexpected)?;
        }

        // Last suspension point is behind us; publishing is a single step
        self.publish(SessionSnapshot::authenticated(session.clone()));
        info!(user_id = %session.id, remember, "User logged in");
        Ok(session)
    }

    /// [`SessionStore::try_login`] as a result descriptor for the UI
    pub async fn login(&self, email: &str, password: &str, remember: bool) -> ActionOutcome {
        match self.try_login(email, password, remember).await {
            Ok(_) => ActionOutcome::succeeded(LOGIN_SUCCESS_MESSAGE),
            Err(err) => ActionOutcome::failed(err.user_message()),
        }
    }

    /// Drop the session and its persisted copy
    ///
    /// Waits for a running restore or login to finish, so `Loading` is only
    /// ever left by restore and a finishing login cannot republish a session.
    /// Never fails; a storage error is logged and the session is still cleared.
    pub async fn logout(&self) {
        let _restoring = self.restore_lock.lock().await;
        self.clear_persisted().await;
        let previous = self.publish(SessionSnapshot::anonymous());
        info!(previous = %previous.state, "User logged out");
    }

    /// Request password reset instructions
    ///
    /// Reports the same success for every non-empty address so the response
    /// does not reveal which accounts exist.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingEmail`] for an empty address.
    pub async fn try_forgot_password(&self, email: &str) -> SessionResult<&'static str> {
        simulate_latency(self.settings.forgot_password_delay).await;

        if email.is_empty() {
            return Err(SessionError::MissingEmail);
        }
        info!("Password reset requested");
        Ok(PASSWORD_RESET_MESSAGE)
    }

    /// [`SessionStore::try_forgot_password`] as a result descriptor for the UI
    pub async fn forgot_password(&self, email: &str) -> ActionOutcome {
        match self.try_forgot_password(email).await {
            Ok(message) => ActionOutcome::succeeded(message),
            Err(err) => ActionOutcome::failed(err.user_message()),
        }
    }
}

async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
