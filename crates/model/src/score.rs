use alloc::{collections::BTreeMap, string::String, vec::Vec};
use serde::{Deserialize, Serialize};

/// Cumulative scores of a channel, keyed by display name.
pub type ScoreBoard = BTreeMap<String, u64>;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Standing {
    pub user: String,
    pub score: u64,
}

/// Ranks the board from the highest score downwards. Ties are ordered by name.
pub fn standings(board: &ScoreBoard) -> Vec<Standing> {
    let mut ranked: Vec<_> =
        board.iter().map(|(user, &score)| Standing { user: user.clone(), score }).collect();
    // The map already yields names in ascending order, so a stable sort keeps ties alphabetical.
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}
