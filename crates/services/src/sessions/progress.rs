/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    /// `(current + 1) / total * 100`, as shown on a progress bar.
    pub percent: f64,
    pub is_complete: bool,
}
