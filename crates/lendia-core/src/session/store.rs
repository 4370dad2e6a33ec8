//! In-memory registry of active application sessions.
//!
//! The store owns every [`ApplicationSession`]; callers get an
//! `Arc<Mutex<_>>` handle and hold it only for the duration of one request.
//! The DashMap gives lock-per-bucket concurrent create/get/sweep; the
//! per-session mutex serializes submits on one conversation.
//!
//! Expiry is explicit, not garbage collection: an idle session is marked
//! `failed` and evicted either lazily on access or by the periodic sweep.
//! Both paths make an expired session surface as `SessionError::NotFound`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use lendia_types::config::SessionConfig;
use lendia_types::error::SessionError;

use super::ApplicationSession;

/// Counts from one expiry sweep.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Idle, non-terminal sessions failed and evicted.
    pub expired: usize,
    /// Terminal sessions evicted after the audit retention window.
    pub retired: usize,
}

/// Process-wide registry of active sessions.
pub struct SessionStore {
    sessions: DashMap<Uuid, Arc<Mutex<ApplicationSession>>>,
    config: SessionConfig,
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            config,
        }
    }

    /// Register a new session and return its identifier.
    pub fn insert(&self, session: ApplicationSession) -> Uuid {
        let id = session.id();
        self.sessions.insert(id, Arc::new(Mutex::new(session)));
        debug!(session_id = %id, active = self.sessions.len(), "Session created");
        id
    }

    /// Look up a session, lazily expiring it when idle past the window.
    ///
    /// An expired session is marked `failed`, evicted, and reported as
    /// `NotFound` -- the one deterministic outcome regardless of whether
    /// the periodic sweep or this lookup noticed the expiry first.
    pub fn get(&self, id: &Uuid) -> Result<Arc<Mutex<ApplicationSession>>, SessionError> {
        let handle = self
            .sessions
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(SessionError::NotFound)?;

        if self.expire_if_idle(&handle, Utc::now()) {
            self.sessions.remove(id);
            return Err(SessionError::NotFound);
        }
        Ok(handle)
    }

    /// Number of sessions currently held (all states).
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Evict idle and retired sessions as of `now`.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> SweepStats {
        let mut stats = SweepStats::default();

        self.sessions.retain(|id, handle| {
            // A session locked by an in-flight request is active by
            // definition; skip it and let the next sweep look again.
            let Ok(mut session) = handle.try_lock() else {
                return true;
            };

            if session.status().is_terminal() {
                if session.idle_since(now, self.config.audit_retention()) {
                    debug!(session_id = %id, "Retiring finalized session after audit window");
                    stats.retired += 1;
                    return false;
                }
                return true;
            }

            if session.idle_since(now, self.config.idle_timeout()) {
                session.mark_failed();
                info!(session_id = %id, "Session expired after inactivity");
                stats.expired += 1;
                return false;
            }
            true
        });

        stats
    }

    /// Run `sweep_expired` on an interval until the token is cancelled.
    pub fn spawn_sweeper(
        self: Arc<Self>,
        token: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let interval = self.config.sweep_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let stats = self.sweep_expired(Utc::now());
                        if stats.expired > 0 || stats.retired > 0 {
                            info!(
                                expired = stats.expired,
                                retired = stats.retired,
                                active = self.len(),
                                "Session sweep"
                            );
                        }
                    }
                }
            }
        })
    }

    /// Mark-and-report for the lazy path in `get`. Returns true when the
    /// session was expired here.
    fn expire_if_idle(&self, handle: &Arc<Mutex<ApplicationSession>>, now: DateTime<Utc>) -> bool {
        // Locked means in use; in-flight requests count as activity.
        let Ok(mut session) = handle.try_lock() else {
            return false;
        };
        if session.status().is_terminal() {
            return session.idle_since(now, self.config.audit_retention());
        }
        if session.idle_since(now, self.config.idle_timeout()) {
            session.mark_failed();
            info!(session_id = %session.id(), "Session expired after inactivity");
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendia_types::application::ApplicationStatus;
    use lendia_types::loan::LoanType;

    fn store_with(idle_minutes: i64, retention_hours: i64) -> SessionStore {
        SessionStore::new(SessionConfig {
            idle_timeout_minutes: idle_minutes,
            audit_retention_hours: retention_hours,
            sweep_interval_secs: 60,
        })
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = store_with(30, 24);
        let id = store.insert(ApplicationSession::new(LoanType::Car));

        let handle = store.get(&id).unwrap();
        assert_eq!(handle.lock().await.status(), ApplicationStatus::Collecting);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_unknown_session() {
        let store = store_with(30, 24);
        let err = store.get(&Uuid::now_v7()).unwrap_err();
        assert_eq!(err, SessionError::NotFound);
    }

    #[tokio::test]
    async fn test_idle_session_expires_lazily_on_get() {
        let store = store_with(30, 24);
        let mut session = ApplicationSession::new(LoanType::Car);
        session.set_last_activity(Utc::now() - chrono::Duration::hours(1));
        let id = store.insert(session);

        let err = store.get(&id).unwrap_err();
        assert_eq!(err, SessionError::NotFound);
        // Evicted, not just hidden.
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_sweep_fails_and_evicts_idle_sessions() {
        let store = store_with(30, 24);
        let mut stale = ApplicationSession::new(LoanType::Gold);
        stale.set_last_activity(Utc::now() - chrono::Duration::hours(1));
        let stale_id = store.insert(stale);
        let fresh_id = store.insert(ApplicationSession::new(LoanType::Gold));

        let stats = store.sweep_expired(Utc::now());
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.retired, 0);

        assert!(store.get(&stale_id).is_err());
        assert!(store.get(&fresh_id).is_ok());
    }

    #[tokio::test]
    async fn test_terminal_sessions_survive_idle_window_until_retention() {
        let store = store_with(30, 24);
        let mut done = ApplicationSession::new(LoanType::Home);
        done.mark_failed();
        done.set_last_activity(Utc::now() - chrono::Duration::hours(2));
        let id = store.insert(done);

        // Past the idle window but inside the audit window: retained.
        let stats = store.sweep_expired(Utc::now());
        assert_eq!(stats, SweepStats { expired: 0, retired: 0 });
        assert_eq!(store.len(), 1);

        // Past the audit window: retired.
        let handle = store.get(&id).unwrap();
        handle
            .lock()
            .await
            .set_last_activity(Utc::now() - chrono::Duration::hours(25));
        drop(handle);

        let stats = store.sweep_expired(Utc::now());
        assert_eq!(stats, SweepStats { expired: 0, retired: 1 });
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_locked_session_is_skipped_by_sweep() {
        let store = store_with(30, 24);
        let mut session = ApplicationSession::new(LoanType::Personal);
        session.set_last_activity(Utc::now() - chrono::Duration::hours(1));
        let id = store.insert(session);

        let handle = store.sessions.get(&id).map(|e| Arc::clone(e.value())).unwrap();
        let guard = handle.lock().await;

        let stats = store.sweep_expired(Utc::now());
        assert_eq!(stats.expired, 0);
        assert_eq!(store.len(), 1);
        drop(guard);

        let stats = store.sweep_expired(Utc::now());
        assert_eq!(stats.expired, 1);
    }

    #[tokio::test]
    async fn test_sweeper_task_runs_and_stops() {
        let store = Arc::new(SessionStore::new(SessionConfig {
            idle_timeout_minutes: 0,
            audit_retention_hours: 24,
            sweep_interval_secs: 1,
        }));
        let mut stale = ApplicationSession::new(LoanType::Business);
        stale.set_last_activity(Utc::now() - chrono::Duration::minutes(5));
        store.insert(stale);

        let token = CancellationToken::new();
        let handle = Arc::clone(&store).spawn_sweeper(token.clone());

        // First tick fires immediately.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert_eq!(store.len(), 0);

        token.cancel();
        handle.await.unwrap();
    }
}
