//! Re-authentication budget for `DoService` exchanges.

/// How many times a single `DoService` call may renew its session.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of session renewals per call.
    pub max_reauthentications: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_reauthentications: 1,
        }
    }
}

impl RetryConfig {
    /// Set the maximum number of renewals.
    pub fn with_max_reauthentications(mut self, renewals: u32) -> Self {
        self.max_reauthentications = renewals;
        self
    }

    /// Never renew; the first exception report fails the call.
    pub fn no_retry() -> Self {
        Self {
            max_reauthentications: 0,
        }
    }
}

/// Per-call counter created fresh for every `DoService` invocation.
///
/// Keeping the counter on the stack of the call means concurrent callers
/// never consume each other's budget.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    attempt: u32,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Renewals performed so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Returns true if another renewal is allowed.
    pub fn should_retry(&self) -> bool {
        self.attempt < self.config.max_reauthentications
    }

    /// Record a renewal. Returns false once the budget is spent.
    pub fn record_attempt(&mut self) -> bool {
        if !self.should_retry() {
            return false;
        }
        self.attempt += 1;
        true
    }
}
