use std::collections::HashMap;

use chrono::Duration;
use tokio::sync::Mutex;

use exam_core::Clock;
use exam_core::model::{ExamSession, SessionId};

use crate::error::SessionError;

/// Sessions idle longer than this are evicted.
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 60;

/// Owns all live exam sessions, keyed by token.
///
/// Sessions are created at login and destroyed at logout or after the idle
/// TTL. All access goes through the registry's mutex, so two requests under
/// the same identity cannot mutate a session concurrently.
pub struct SessionRegistry {
    clock: Clock,
    ttl: Duration,
    sessions: Mutex<HashMap<SessionId, ExamSession>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            ttl: Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Establish identity and create an empty session for it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::BlankIdentity` if the name is empty.
    pub async fn login(&self, identity: &str) -> Result<SessionId, SessionError> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(SessionError::BlankIdentity);
        }

        let now = self.clock.now();
        let id = SessionId::generate();
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, s| !s.is_expired(now, self.ttl));
        sessions.insert(id, ExamSession::new(id, identity, now));
        Ok(id)
    }

    /// Tear down a session explicitly. Returns whether it existed.
    pub async fn logout(&self, id: SessionId) -> bool {
        self.sessions.lock().await.remove(&id).is_some()
    }

    /// Run `f` against the live session for `id`, marking it active.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownSession` when the token is unknown or
    /// the session has expired.
    pub async fn with_session<R>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut ExamSession) -> R,
    ) -> Result<R, SessionError> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, s| !s.is_expired(now, self.ttl));

        let session = sessions.get_mut(&id).ok_or(SessionError::UnknownSession)?;
        session.touch(now);
        Ok(f(session))
    }

    /// Remove the session for exclusive use; pair with `restore`.
    ///
    /// While checked out the token resolves to `UnknownSession`, which
    /// serializes multi-step flows like finalize against other requests.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownSession` when the token is unknown or
    /// the session has expired.
    pub async fn take(&self, id: SessionId) -> Result<ExamSession, SessionError> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, s| !s.is_expired(now, self.ttl));

        let mut session = sessions.remove(&id).ok_or(SessionError::UnknownSession)?;
        session.touch(now);
        Ok(session)
    }

    /// Put a checked-out session back.
    pub async fn restore(&self, session: ExamSession) {
        self.sessions.lock().await.insert(session.id(), session);
    }

    /// Number of live (non-expired) sessions.
    pub async fn active_count(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, s| !s.is_expired(now, self.ttl));
        sessions.len()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::time::fixed_now;

    #[tokio::test]
    async fn login_creates_an_empty_session() {
        let registry = SessionRegistry::new(Clock::fixed(fixed_now()));
        let id = registry.login("Ada").await.unwrap();

        let (identity, results) = registry
            .with_session(id, |s| (s.identity().to_string(), s.results().len()))
            .await
            .unwrap();
        assert_eq!(identity, "Ada");
        assert_eq!(results, 0);
    }

    #[tokio::test]
    async fn blank_identity_is_rejected() {
        let registry = SessionRegistry::new(Clock::fixed(fixed_now()));
        let err = registry.login("   ").await.unwrap_err();
        assert!(matches!(err, SessionError::BlankIdentity));
    }

    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let registry = SessionRegistry::new(Clock::fixed(fixed_now()));
        let err = registry
            .with_session(SessionId::generate(), |_| ())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::UnknownSession));
    }

    #[tokio::test]
    async fn logout_destroys_the_session() {
        let registry = SessionRegistry::new(Clock::fixed(fixed_now()));
        let id = registry.login("Ada").await.unwrap();

        assert!(registry.logout(id).await);
        assert!(!registry.logout(id).await);
        assert!(registry.with_session(id, |_| ()).await.is_err());
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let registry =
            SessionRegistry::new(Clock::fixed(fixed_now())).with_ttl(Duration::minutes(30));
        let id = registry.login("Ada").await.unwrap();
        assert_eq!(registry.active_count().await, 1);

        // Rebuild the registry's view of time past the TTL.
        let late = Clock::fixed(fixed_now() + Duration::minutes(31));
        let registry = SessionRegistry {
            clock: late,
            ttl: Duration::minutes(30),
            sessions: Mutex::new(std::mem::take(
                &mut *registry.sessions.lock().await,
            )),
        };

        let err = registry.with_session(id, |_| ()).await.unwrap_err();
        assert!(matches!(err, SessionError::UnknownSession));
        assert_eq!(registry.active_count().await, 0);
    }

    #[tokio::test]
    async fn take_hides_the_session_until_restored() {
        let registry = SessionRegistry::new(Clock::fixed(fixed_now()));
        let id = registry.login("Ada").await.unwrap();

        let session = registry.take(id).await.unwrap();
        assert!(matches!(
            registry.with_session(id, |_| ()).await,
            Err(SessionError::UnknownSession)
        ));

        registry.restore(session).await;
        assert!(registry.with_session(id, |_| ()).await.is_ok());
    }
}
