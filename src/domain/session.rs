//! Admin session value
//!
//! Passed explicitly into every mutating call. Expiry is a pure function of
//! the current time, so nothing here reads a clock.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub authenticated: bool,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// A caller that never logged in
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            expires_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    pub fn admin_until(expires_at: DateTime<Utc>) -> Self {
        Self {
            authenticated: true,
            expires_at,
        }
    }

    /// Session opened at `now` lasting `ttl`
    pub fn start(now: DateTime<Utc>, ttl: Duration) -> Self {
        Self::admin_until(now + ttl)
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.authenticated && now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expires_at_deadline() {
        let now = Utc::now();
        let session = Session::start(now, Duration::minutes(30));
        assert!(session.is_active(now));
        assert!(session.is_active(now + Duration::minutes(29)));
        assert!(!session.is_active(now + Duration::minutes(30)));
    }

    #[test]
    fn test_anonymous_is_never_active() {
        assert!(!Session::anonymous().is_active(DateTime::<Utc>::MIN_UTC));
        assert!(!Session::anonymous().is_active(Utc::now()));
    }

    #[test]
    fn test_unauthenticated_with_future_expiry_is_inactive() {
        let session = Session {
            authenticated: false,
            expires_at: Utc::now() + Duration::hours(1),
        };
        assert!(!session.is_active(Utc::now()));
    }
}
