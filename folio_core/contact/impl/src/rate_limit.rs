use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use folio_models::contact::RetryAfter;

/// Time of the last submission that was accepted for delivery.
///
/// Lives as long as the contact form it belongs to. A fresh state has never
/// accepted a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitState {
    last_accepted: Option<DateTime<Utc>>,
}

impl RateLimitState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_accepted(&self) -> Option<DateTime<Utc>> {
        self.last_accepted
    }

    /// Starts a new cooldown window at `now`.
    pub fn record(&mut self, now: DateTime<Utc>) {
        self.last_accepted = Some(now);
    }

    pub fn check(&self, now: DateTime<Utc>, cooldown: Duration) -> RateLimitDecision {
        check(now, self.last_accepted, cooldown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub retry_after: RetryAfter,
}

/// Decides whether a submission at `now` is outside the cooldown window that
/// started at `last_accepted`.
///
/// A clock that went backwards counts as no time having passed.
pub fn check(
    now: DateTime<Utc>,
    last_accepted: Option<DateTime<Utc>>,
    cooldown: Duration,
) -> RateLimitDecision {
    let Some(last_accepted) = last_accepted else {
        return RateLimitDecision {
            allowed: true,
            retry_after: RetryAfter(Duration::ZERO),
        };
    };

    let elapsed = (now - last_accepted).max(TimeDelta::zero());
    let cooldown = TimeDelta::from_std(cooldown).unwrap_or(TimeDelta::MAX);
    let remaining = (cooldown - elapsed).max(TimeDelta::zero());

    RateLimitDecision {
        allowed: remaining.is_zero(),
        retry_after: RetryAfter(remaining.to_std().unwrap_or_default()),
    }
}
