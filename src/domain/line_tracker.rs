/// Logical line counter.
///
/// Derived from tree structure alone; source positions are never consulted.
/// Starts at 0 so the first top-level statement, which advances before it is
/// visited, lands on line 1.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LineTracker {
    current: usize,
}

impl LineTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn advance(&mut self) {
        self.current += 1;
    }
}
