/// Lifecycle of one fan-out batch.
///
/// There is no cancelled state: once work has been submitted to a pool the
/// batch runs until the pool drains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchState {
    #[default]
    Idle,
    FanOutInFlight,
    AllSucceeded,
    PartiallyFailed,
    Done,
}

impl BatchState {
    /// `Idle -> FanOutInFlight`. Illegal transitions leave the state unchanged.
    #[must_use]
    pub fn submit(self) -> Self {
        match self {
            BatchState::Idle => BatchState::FanOutInFlight,
            other => other,
        }
    }

    /// `FanOutInFlight -> {AllSucceeded | PartiallyFailed}` once every
    /// submitted item has reported back.
    #[must_use]
    pub fn settle(self, failure_count: usize) -> Self {
        match self {
            BatchState::FanOutInFlight => {
                if failure_count == 0 {
                    BatchState::AllSucceeded
                } else {
                    BatchState::PartiallyFailed
                }
            }
            other => other,
        }
    }

    /// `{AllSucceeded | PartiallyFailed} -> Done` after the caller has
    /// consumed the outcome.
    #[must_use]
    pub fn finish(self) -> Self {
        match self {
            BatchState::AllSucceeded | BatchState::PartiallyFailed => BatchState::Done,
            other => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        *self == BatchState::Done
    }
}

/// The failure of a single work item, kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub key: String,
    pub reason: String,
}

/// Per-batch success/failure accounting.
///
/// Producer stages record one signal per submitted item so that individual
/// failures are observable instead of being lost when a pool drains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    submitted: usize,
    succeeded: usize,
    failures: Vec<ItemFailure>,
    state: BatchState,
}

impl BatchOutcome {
    pub fn new(submitted: usize) -> Self {
        Self {
            submitted,
            succeeded: 0,
            failures: Vec::new(),
            state: BatchState::Idle.submit(),
        }
    }

    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, key: impl Into<String>, reason: impl Into<String>) {
        self.failures.push(ItemFailure {
            key: key.into(),
            reason: reason.into(),
        });
    }

    /// Move out of `FanOutInFlight` once the pool has drained.
    pub fn settle(&mut self) {
        self.state = self.state.settle(self.failures.len());
    }

    /// Mark the outcome consumed.
    pub fn finish(&mut self) {
        self.state = self.state.finish();
    }

    pub fn submitted(&self) -> usize {
        self.submitted
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failures(&self) -> &[ItemFailure] {
        &self.failures
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}
