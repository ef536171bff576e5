//! Retry policy for contended transactions.

use std::time::Duration;

/// Backoff strategy between retry attempts.
#[derive(Debug, Clone)]
pub enum BackoffStrategy {
    /// No delay between retries.
    None,
    /// Fixed delay between retries.
    Fixed(Duration),
    /// Exponential backoff with base and max.
    Exponential {
        /// Initial delay.
        base: Duration,
        /// Maximum delay.
        max: Duration,
    },
}

impl BackoffStrategy {
    /// Calculate delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Fixed(d) => *d,
            Self::Exponential { base, max } => {
                let multiplier = 2u64.saturating_pow(attempt);
                let delay = Duration::from_millis(base.as_millis() as u64 * multiplier);
                std::cmp::min(delay, *max)
            }
        }
    }
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(20),
            max: Duration::from_millis(200),
        }
    }
}

/// Bounded retry for optimistic-commit conflicts.
///
/// Only store contention is retried; business-rule failures are final on
/// the first attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Backoff strategy between attempts.
    pub backoff: BackoffStrategy,
}

impl RetryPolicy {
    /// Create a policy with the given attempt budget.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: BackoffStrategy::default(),
        }
    }

    /// Create a policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: BackoffStrategy::None,
        }
    }

    /// Set the backoff strategy.
    pub fn with_backoff(mut self, strategy: BackoffStrategy) -> Self {
        self.backoff = strategy;
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff_grows_and_caps() {
        let strategy = BackoffStrategy::Exponential {
            base: Duration::from_millis(10),
            max: Duration::from_millis(50),
        };
        assert_eq!(strategy.delay_for_attempt(0), Duration::from_millis(10));
        assert_eq!(strategy.delay_for_attempt(1), Duration::from_millis(20));
        assert_eq!(strategy.delay_for_attempt(2), Duration::from_millis(40));
        assert_eq!(strategy.delay_for_attempt(3), Duration::from_millis(50));
    }

    #[test]
    fn test_policy_always_allows_one_attempt() {
        assert_eq!(RetryPolicy::new(0).max_attempts, 1);
    }
}
