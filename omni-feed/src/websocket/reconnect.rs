use std::time::Duration;

/// Close code sent and expected for an intentional shutdown
pub const NORMAL_CLOSE: u16 = 1000;

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(3000);
const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(10000);

/// Bounded, linearly increasing reconnect backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before retry number `attempt` (1-based), or `None` once the
    /// retry budget is spent.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_retries {
            return None;
        }
        Some(self.base_delay.saturating_mul(attempt).min(self.max_delay))
    }

    /// Anything other than a normal close frame warrants a retry.
    pub fn should_reconnect(close_code: Option<u16>) -> bool {
        close_code != Some(NORMAL_CLOSE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delays_grow_linearly_and_cap() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(1), Some(Duration::from_millis(3000)));
        assert_eq!(policy.delay_for(2), Some(Duration::from_millis(6000)));
        assert_eq!(policy.delay_for(3), Some(Duration::from_millis(9000)));
        assert_eq!(policy.delay_for(4), None);
    }

    #[test]
    fn test_cap_applies() {
        let policy = ReconnectPolicy {
            max_retries: 5,
            ..Default::default()
        };
        assert_eq!(policy.delay_for(4), Some(Duration::from_millis(10000)));
        assert_eq!(policy.delay_for(5), Some(Duration::from_millis(10000)));
    }

    #[test]
    fn test_exactly_max_retries_are_granted() {
        let policy = ReconnectPolicy::default();
        let granted = (1..=10).filter_map(|n| policy.delay_for(n)).count();
        assert_eq!(granted, 3);
        assert_eq!(policy.delay_for(0), None);
    }

    #[test]
    fn test_only_normal_close_stops_reconnect() {
        assert!(!ReconnectPolicy::should_reconnect(Some(1000)));
        assert!(ReconnectPolicy::should_reconnect(Some(1001)));
        assert!(ReconnectPolicy::should_reconnect(Some(1011)));
        assert!(ReconnectPolicy::should_reconnect(None));
    }
}
