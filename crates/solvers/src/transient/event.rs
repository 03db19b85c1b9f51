use crate::history::History;

/// Event emitted by a controller after each committed step.
///
/// Step 0 is the initial configuration, emitted by `solve` before the first
/// step. Steps 1..N follow each committed step.
///
/// `first` holds the first-order configuration and `second` the
/// second-order one; a single-configuration controller only sets its own.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    /// The step number (0 for the initial configuration).
    pub step: usize,

    /// Time of the step.
    pub time: f64,

    /// Newton updates spent on the step (`None` for explicit schemes and the
    /// initial configuration).
    pub iterations: Option<usize>,

    /// History of the first-order configuration.
    pub first: Option<&'a History>,

    /// History of the second-order configuration.
    pub second: Option<&'a History>,
}
