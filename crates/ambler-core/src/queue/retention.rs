//! Retention policy: bounds how many terminal task records are kept.

/// How many terminal records the queue keeps around for observability.
///
/// Once a cap is exceeded the oldest records (and their attempt history)
/// are dropped. Failed tasks get a much larger window than succeeded ones,
/// since they are the records an operator actually goes looking for.
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    /// Succeeded task records to keep.
    pub max_completed: usize,

    /// Failed task records to keep.
    pub max_failed: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_completed: 100,
            max_failed: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_keeps_more_failures_than_successes() {
        let policy = RetentionPolicy::default();
        assert_eq!(policy.max_completed, 100);
        assert_eq!(policy.max_failed, 1000);
        assert!(policy.max_failed > policy.max_completed);
    }
}
