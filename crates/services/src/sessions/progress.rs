/// Where the user stands within a round, for headers like "Question 3 of 10".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

impl RoundProgress {
    /// 1-based number of the item on screen; equals `total` once complete.
    #[must_use]
    pub fn question_number(&self) -> usize {
        (self.answered + 1).min(self.total)
    }
}
