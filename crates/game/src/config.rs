use core::{
    num::{NonZeroU32, NonZeroUsize},
    time::Duration,
};

/// Tunables of a trivia session.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of correctly answered rounds between automatic standings.
    pub show_score_interval: NonZeroU32,
    /// How long to wait before posting the next question.
    pub next_question_gap: Duration,
    /// Number of distinct votes needed to abandon a round.
    pub skip_count: NonZeroUsize,
    /// Minimum time between two hints of the same round.
    pub hint_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            show_score_interval: NonZeroU32::MIN.saturating_add(9),
            next_question_gap: Duration::from_secs(5),
            skip_count: NonZeroUsize::MIN.saturating_add(1),
            hint_delay: Duration::from_secs(10),
        }
    }
}
