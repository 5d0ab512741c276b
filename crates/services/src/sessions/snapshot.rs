/// Observable session state for the presenter, rebuilt after every mutating
/// operation.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub current_index: usize,
    pub total: usize,
    pub revealed: bool,
    pub score: usize,
    pub finished: bool,
    pub progress: f32,
}

/// Final result of one attempt, judged against the quiz's passing threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptOutcome {
    pub score: usize,
    pub total: usize,
    /// Whole-number percentage, rounded down.
    pub percentage: u8,
    pub passed: bool,
}
